use chrono::{DateTime, Utc};
use octocrab::models::pulls::{PullRequest, Review, ReviewState};

use crate::GithubHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub full_id: String,
}

impl RepoInfo {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        let owner = owner.into();
        let repo = repo.into();
        let full_id = format!("{}/{}/{}", owner, repo, number);
        Self {
            owner,
            repo,
            number,
            full_id,
        }
    }

    pub fn pull_url(&self) -> String {
        format!(
            "https://github.com/{}/{}/pull/{}",
            self.owner, self.repo, self.number
        )
    }
}

/// Open pull request as seen by the watchdog. Never written back.
#[derive(Debug, Clone)]
pub struct PrMetadata {
    pub repo_info: RepoInfo,
    pub title: String,
    pub author: GithubHandle,
    pub created: DateTime<Utc>,
    pub draft: bool,
    pub html_url: Option<String>,
}

impl PrMetadata {
    /// Whole days elapsed since the PR was opened, truncated towards zero.
    pub fn age_in_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created).num_days()
    }

    pub fn link(&self) -> String {
        self.html_url
            .clone()
            .unwrap_or_else(|| self.repo_info.pull_url())
    }
}

impl TryFrom<PullRequest> for PrMetadata {
    type Error = anyhow::Error;

    fn try_from(pr: PullRequest) -> anyhow::Result<Self> {
        let repo = pr.base.repo.map(|repo| (repo.owner, repo.name));

        if let (Some((Some(owner), repo)), Some(user), Some(created_at)) =
            (repo, pr.user, pr.created_at)
        {
            Ok(Self {
                repo_info: RepoInfo::new(owner.login, repo, pr.number),
                title: pr.title.unwrap_or_default(),
                author: user.login,
                created: created_at,
                draft: pr.draft.unwrap_or_default(),
                html_url: pr.html_url.map(|url| url.to_string()),
            })
        } else {
            Err(anyhow::anyhow!(
                "Missing required fields for PR #{}",
                pr.number
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub reviewer: Option<GithubHandle>,
    pub state: Option<ReviewState>,
}

impl ReviewRecord {
    pub fn new(reviewer: impl Into<GithubHandle>, state: ReviewState) -> Self {
        Self {
            reviewer: Some(reviewer.into()),
            state: Some(state),
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self.state, Some(ReviewState::Approved))
    }
}

impl From<Review> for ReviewRecord {
    fn from(review: Review) -> Self {
        Self {
            reviewer: review.user.map(|user| user.login),
            state: review.state,
        }
    }
}
