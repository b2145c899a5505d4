use serde::{Deserialize, Serialize};
use shared::github::PrMetadata;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::error;

use crate::approval::ApprovalStatus;

const DEFAULT_MESSAGES: &str = include_str!("../../Messages.toml");

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, strum::Display)]
pub enum Category {
    Active,
    Drafts,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Messages {
    message: String,
    variables: HashSet<String>,
}

impl Messages {
    pub fn new(message: impl Into<String>, variables: HashSet<String>) -> Self {
        Self {
            message: message.into(),
            variables,
        }
    }

    /// Substitutes `{variable}` placeholders in a single pass, so values
    /// containing braces are inserted verbatim.
    pub fn format(&self, values: HashMap<&'static str, String>) -> String {
        let mut formatted_message = String::with_capacity(self.message.len());
        let mut rest = self.message.as_str();

        while let Some(start) = rest.find('{') {
            formatted_message.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}').filter(|end| is_placeholder(&after[..*end])) else {
                formatted_message.push('{');
                rest = after;
                continue;
            };

            let key = &after[..end];
            match values.get(key) {
                Some(value) if self.variables.contains(key) => formatted_message.push_str(value),
                _ => {
                    if self.variables.contains(key) {
                        error!(
                            "The message expects a variable: {}, but it wasn't provided",
                            key
                        );
                    }
                    formatted_message.push_str(&rest[start..start + end + 2]);
                }
            }
            rest = &after[end + 1..];
        }

        formatted_message.push_str(rest);
        formatted_message
    }

    fn undeclared_placeholders(&self) -> Vec<&str> {
        let mut result = Vec::new();
        let mut rest = self.message.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) if is_placeholder(&after[..end]) => {
                    let key = &after[..end];
                    if !self.variables.contains(key) {
                        result.push(key);
                    }
                    rest = &after[end + 1..];
                }
                _ => rest = after,
            }
        }
        result
    }
}

fn is_placeholder(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Slack treats `&`, `<` and `>` as control characters in message text.
pub fn escape_slack(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// One rendered report line keyed by the age of its PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub age_in_days: i64,
    pub line: String,
}

impl ReportEntry {
    pub fn new(age_in_days: i64, line: String) -> Self {
        Self { age_in_days, line }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageLoader {
    pub section_separator: String,

    pub report_header: Messages,
    pub report_line: Messages,
    pub no_stale_prs: Messages,
}

impl MessageLoader {
    pub fn load_default() -> anyhow::Result<Self> {
        Self::from_toml(DEFAULT_MESSAGES)
    }

    pub fn load_from_file(file_path: &Path) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(file_path)?;
        let result = Self::from_toml(&file_content)?;
        tracing::trace!("Loaded messages from {}: {:#?}", file_path.display(), result);
        Ok(result)
    }

    fn from_toml(content: &str) -> anyhow::Result<Self> {
        let result: Self = toml::from_str(content)?;
        result.validate()?;
        Ok(result)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for (name, message) in [
            ("report_header", &self.report_header),
            ("report_line", &self.report_line),
            ("no_stale_prs", &self.no_stale_prs),
        ] {
            let undeclared = message.undeclared_placeholders();
            if !undeclared.is_empty() {
                anyhow::bail!(
                    "Message {name} uses undeclared variables: {}",
                    undeclared.join(", ")
                );
            }
        }
        Ok(())
    }

    pub fn report_line(
        &self,
        pr: &PrMetadata,
        age_in_days: i64,
        mention: &str,
        approval: ApprovalStatus,
    ) -> String {
        self.report_line.format(
            [
                ("number", pr.repo_info.number.to_string()),
                ("title", escape_slack(&pr.title)),
                ("days", age_in_days.to_string()),
                ("mention", mention.to_string()),
                ("link", pr.link()),
                ("approval", approval.to_string()),
            ]
            .into_iter()
            .collect(),
        )
    }

    /// Header followed by the entries, oldest first. Entries of equal age
    /// keep their relative order.
    pub fn report(
        &self,
        repository: &str,
        category: Category,
        threshold_days: u32,
        mut entries: Vec<ReportEntry>,
    ) -> String {
        entries.sort_by(|a, b| b.age_in_days.cmp(&a.age_in_days));

        let header = self.report_header.format(
            [
                ("repository", repository.to_string()),
                ("category", category.to_string()),
                ("days", threshold_days.to_string()),
            ]
            .into_iter()
            .collect(),
        );

        entries
            .into_iter()
            .fold(header, |message, entry| message + &entry.line)
    }

    pub fn no_stale_prs(&self, repository: &str, threshold_days: u32) -> String {
        self.no_stale_prs.format(
            [
                ("repository", repository.to_string()),
                ("days", threshold_days.to_string()),
            ]
            .into_iter()
            .collect(),
        )
    }

    pub fn combine_sections(&self, sections: Vec<String>) -> String {
        sections.join(&self.section_separator)
    }
}
