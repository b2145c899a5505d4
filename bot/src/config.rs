use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use shared::IdentityMap;

use crate::messages::MessageLoader;

pub const DEFAULT_THRESHOLD_DAYS: u32 = 2;

/// Raw process environment. Required values default to empty so that
/// validation can name the missing variable.
#[derive(Deserialize, Default)]
pub struct Env {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub slack_webhook_url: String,
    #[serde(default)]
    pub gh_token: String,
    pub days: Option<String>,
    pub github_to_slack_map: Option<String>,
    pub message_file: Option<PathBuf>,
    pub interval_minutes: Option<String>,
}

pub struct Settings {
    pub owner: String,
    pub repositories: Vec<String>,
    pub slack_webhook_url: String,
    pub github_token: String,
    pub threshold_days: u32,
    pub identities: IdentityMap,
    pub messages: MessageLoader,
    pub interval: Option<Duration>,
}

impl Env {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(envy::from_env::<Env>()?)
    }

    pub fn validate(self) -> anyhow::Result<Settings> {
        let owner = required("OWNER", self.owner)?;
        let github_token = required("GH_TOKEN", self.gh_token)?;
        let repo = required("REPO", self.repo)?;
        let slack_webhook_url = required("SLACK_WEBHOOK_URL", self.slack_webhook_url)?;

        let repositories = parse_repositories(&repo)?;
        let threshold_days = match optional(self.days) {
            Some(days) => days
                .parse()
                .map_err(|e| anyhow::anyhow!("DAYS must be a non-negative integer: {e}"))?,
            None => DEFAULT_THRESHOLD_DAYS,
        };
        let interval = match optional(self.interval_minutes) {
            Some(minutes) => {
                let minutes: u64 = minutes
                    .parse()
                    .map_err(|e| anyhow::anyhow!("INTERVAL_MINUTES must be an integer: {e}"))?;
                if minutes == 0 {
                    anyhow::bail!("INTERVAL_MINUTES must be greater than zero");
                }
                Some(Duration::from_secs(minutes * 60))
            }
            None => None,
        };

        let messages = match &self.message_file {
            Some(path) => MessageLoader::load_from_file(path)?,
            None => MessageLoader::load_default()?,
        };

        Ok(Settings {
            owner,
            repositories,
            slack_webhook_url,
            github_token,
            threshold_days,
            identities: IdentityMap::parse(self.github_to_slack_map.as_deref()),
            messages,
            interval,
        })
    }
}

fn required(name: &str, value: String) -> anyhow::Result<String> {
    let value = value.trim();
    if value.is_empty() {
        anyhow::bail!("Required inputs ({name}) are not provided.");
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Accepts either a bare repository name or a JSON array of names.
pub fn parse_repositories(value: &str) -> anyhow::Result<Vec<String>> {
    let value = value.trim();
    let repositories = if value.starts_with('[') {
        serde_json::from_str::<Vec<String>>(value)
            .map_err(|e| anyhow::anyhow!("REPO is not a valid JSON array of names: {e}"))?
            .into_iter()
            .map(|repo| repo.trim().to_string())
            .collect::<Vec<_>>()
    } else {
        vec![value.to_string()]
    };

    if repositories.is_empty() || repositories.iter().any(String::is_empty) {
        anyhow::bail!("Required inputs (REPO) are not provided.");
    }

    Ok(repositories)
}
