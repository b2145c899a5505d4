use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::github::{PrMetadata, RepoInfo, ReviewRecord};

use crate::api::{Notifier, PullRequestSource};

pub fn pull_request(repo: &str, number: u64, created: DateTime<Utc>, draft: bool) -> PrMetadata {
    PrMetadata {
        repo_info: RepoInfo::new("near", repo, number),
        title: format!("PR {number}"),
        author: format!("author{number}"),
        created,
        draft,
        html_url: None,
    }
}

#[derive(Default)]
pub struct MockGithub {
    pull_requests: HashMap<String, Vec<PrMetadata>>,
    reviews: HashMap<String, Vec<ReviewRecord>>,
    failing_repos: HashSet<String>,
    failing_reviews: HashSet<String>,
    fetched: Mutex<Vec<String>>,
}

impl MockGithub {
    pub fn with_pull_requests(mut self, repo: &str, prs: Vec<PrMetadata>) -> Self {
        self.pull_requests.insert(repo.to_string(), prs);
        self
    }

    pub fn with_reviews(mut self, pr: &RepoInfo, reviews: Vec<ReviewRecord>) -> Self {
        self.reviews.insert(pr.full_id.clone(), reviews);
        self
    }

    pub fn with_failing_reviews(mut self, pr: &RepoInfo) -> Self {
        self.failing_reviews.insert(pr.full_id.clone());
        self
    }

    pub fn with_failing_repo(mut self, repo: &str) -> Self {
        self.failing_repos.insert(repo.to_string());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PullRequestSource for MockGithub {
    async fn open_pull_requests(
        &self,
        _owner: &str,
        repo: &str,
    ) -> anyhow::Result<Vec<PrMetadata>> {
        self.fetched.lock().unwrap().push(repo.to_string());
        if self.failing_repos.contains(repo) {
            anyhow::bail!("HTTP 404 for {repo}");
        }
        Ok(self.pull_requests.get(repo).cloned().unwrap_or_default())
    }

    async fn reviews(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> anyhow::Result<Vec<ReviewRecord>> {
        let full_id = RepoInfo::new(owner, repo, number).full_id;
        if self.failing_reviews.contains(&full_id) {
            anyhow::bail!("HTTP 502 while listing reviews");
        }
        Ok(self.reviews.get(&full_id).cloned().unwrap_or_default())
    }
}

/// Records every delivery attempt; fails the attempts whose text mentions a
/// repository listed in `failing`.
#[derive(Default)]
pub struct RecordingNotifier {
    failing: HashSet<String>,
    attempts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn failing_for(repo: &str) -> Self {
        Self {
            failing: [repo.to_string()].into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, text: &str) -> anyhow::Result<()> {
        self.attempts.lock().unwrap().push(text.to_string());
        if self
            .failing
            .iter()
            .any(|repo| text.contains(&format!("*[{repo}]*")))
        {
            anyhow::bail!("Failed to send message: Received HTTP 500");
        }
        Ok(())
    }
}
