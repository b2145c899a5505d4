use async_trait::async_trait;
use octocrab::params;
use shared::slack::SlackWebhook;
use tracing::{error, instrument};

pub use shared::github::*;

/// Read access to a repository's pull requests.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn open_pull_requests(&self, owner: &str, repo: &str)
        -> anyhow::Result<Vec<PrMetadata>>;

    async fn reviews(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> anyhow::Result<Vec<ReviewRecord>>;
}

/// Chat channel receiving the report.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, text: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct GithubClient {
    octocrab: octocrab::Octocrab,
}

impl GithubClient {
    pub fn new(github_token: String) -> anyhow::Result<Self> {
        let octocrab = octocrab::Octocrab::builder()
            .personal_token(github_token)
            .build()?;

        Ok(Self { octocrab })
    }
}

#[async_trait]
impl PullRequestSource for GithubClient {
    #[instrument(skip(self))]
    async fn open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> anyhow::Result<Vec<PrMetadata>> {
        let page = self
            .octocrab
            .pulls(owner, repo)
            .list()
            .state(params::State::Open)
            .per_page(100)
            .send()
            .await?;

        let pull_requests = self.octocrab.all_pages(page).await?;

        Ok(pull_requests
            .into_iter()
            .filter_map(|pr| {
                let number = pr.number;
                match PrMetadata::try_from(pr) {
                    Ok(pr) => Some(pr),
                    Err(e) => {
                        error!("Failed to convert PR #{number} of {owner}/{repo}: {e}");
                        None
                    }
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn reviews(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> anyhow::Result<Vec<ReviewRecord>> {
        let page = self
            .octocrab
            .pulls(owner, repo)
            .list_reviews(number)
            .per_page(100)
            .send()
            .await?;

        let reviews = self.octocrab.all_pages(page).await?;

        Ok(reviews.into_iter().map(ReviewRecord::from).collect())
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    async fn deliver(&self, text: &str) -> anyhow::Result<()> {
        self.send_message(text).await
    }
}
