use std::collections::HashMap;

use tracing::debug;

use crate::{GithubHandle, SlackId};

/// Static table translating GitHub logins into Slack mentions.
///
/// Built once per run from a newline separated list of `login:slackId` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    entries: HashMap<GithubHandle, SlackId>,
}

impl IdentityMap {
    pub fn parse(source: Option<&str>) -> Self {
        let mut entries = HashMap::new();
        let Some(source) = source else {
            return Self { entries };
        };

        for line in source.lines() {
            let mut parts = line.split(':').map(str::trim);
            match (parts.next(), parts.next()) {
                (Some(login), Some(slack_id)) if !login.is_empty() && !slack_id.is_empty() => {
                    entries.insert(login.to_string(), slack_id.to_string());
                }
                _ if line.trim().is_empty() => {}
                _ => debug!("Skipping malformed identity mapping line: {line}"),
            }
        }

        Self { entries }
    }

    /// Returns `<@slackId>` for a known login, or the login itself.
    pub fn resolve_mention(&self, login: &str) -> String {
        match self.entries.get(login) {
            Some(slack_id) => format!("<@{slack_id}>"),
            None => login.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
