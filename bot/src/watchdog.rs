use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use shared::{github::PrMetadata, IdentityMap};
use tracing::{debug, error, info, instrument};

use crate::{
    api::{Notifier, PullRequestSource},
    approval::resolve_approval,
    classify::classify,
    messages::{Category, MessageLoader, ReportEntry},
};

/// Steps of a single repository run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Stage {
    Validating,
    Fetching,
    Classifying,
    Enriching,
    Formatting,
    Delivering,
}

#[derive(Clone)]
pub struct Context {
    pub github: Arc<dyn PullRequestSource>,
    pub notifier: Arc<dyn Notifier>,
    pub messages: Arc<MessageLoader>,
    pub identities: Arc<IdentityMap>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub repository: String,
    pub active: usize,
    pub drafts: usize,
}

pub struct WatchDog {
    context: Context,
    owner: String,
    threshold_days: u32,
}

impl WatchDog {
    pub fn new(context: Context, owner: String, threshold_days: u32) -> Self {
        Self {
            context,
            owner,
            threshold_days,
        }
    }

    /// Runs every repository in turn. A failed repository is logged and the
    /// remaining ones are still processed.
    pub async fn run_all(&self, repositories: &[String]) -> Vec<anyhow::Result<RunSummary>> {
        let mut results = Vec::with_capacity(repositories.len());
        for repo in repositories {
            let result = self.run(repo).await;
            if let Err(e) = &result {
                error!("Watchdog run failed for {}/{repo}: {e:#}", self.owner);
            }
            results.push(result);
        }
        results
    }

    pub async fn run(&self, repo: &str) -> anyhow::Result<RunSummary> {
        self.run_at(repo, Utc::now()).await
    }

    #[instrument(skip(self, now), fields(owner = %self.owner))]
    pub async fn run_at(&self, repo: &str, now: DateTime<Utc>) -> anyhow::Result<RunSummary> {
        self.enter(Stage::Validating, repo);
        if self.owner.trim().is_empty() || repo.trim().is_empty() {
            anyhow::bail!("{}: owner and repository must be provided", Stage::Validating);
        }

        self.enter(Stage::Fetching, repo);
        let pull_requests = self
            .context
            .github
            .open_pull_requests(&self.owner, repo)
            .await
            .with_context(|| format!("{} open PRs of {}/{repo}", Stage::Fetching, self.owner))?;
        info!(
            "Received {} open PRs for {}/{repo}",
            pull_requests.len(),
            self.owner
        );

        self.enter(Stage::Classifying, repo);
        let stale = classify(pull_requests, self.threshold_days, now);
        let summary = RunSummary {
            repository: repo.to_string(),
            active: stale.active.len(),
            drafts: stale.drafts.len(),
        };

        let message = if stale.is_empty() {
            self.enter(Stage::Formatting, repo);
            let text = self
                .context
                .messages
                .no_stale_prs(repo, self.threshold_days);
            info!("{}", text);
            text
        } else {
            let mut sections = Vec::with_capacity(2);
            for (category, prs) in [
                (Category::Active, stale.active),
                (Category::Drafts, stale.drafts),
            ] {
                if prs.is_empty() {
                    continue;
                }
                sections.push(self.report_section(repo, category, prs, now).await);
            }
            self.context.messages.combine_sections(sections)
        };
        debug!("Slack message to be sent: {}", message);

        self.enter(Stage::Delivering, repo);
        self.context
            .notifier
            .deliver(&message)
            .await
            .with_context(|| format!("{} report for {}/{repo}", Stage::Delivering, self.owner))?;
        info!("Slack notification sent for {}/{repo}", self.owner);

        Ok(summary)
    }

    async fn report_section(
        &self,
        repo: &str,
        category: Category,
        prs: Vec<PrMetadata>,
        now: DateTime<Utc>,
    ) -> String {
        info!(
            "Found {} {} PRs open for more than {} days.",
            prs.len(),
            category,
            self.threshold_days
        );

        self.enter(Stage::Enriching, repo);
        let entries = join_all(prs.iter().map(|pr| async move {
            let approval = resolve_approval(self.context.github.as_ref(), &pr.repo_info).await;
            let mention = self.context.identities.resolve_mention(&pr.author);
            let age = pr.age_in_days(now);
            ReportEntry::new(
                age,
                self.context
                    .messages
                    .report_line(pr, age, &mention, approval),
            )
        }))
        .await;

        self.enter(Stage::Formatting, repo);
        self.context
            .messages
            .report(repo, category, self.threshold_days, entries)
    }

    fn enter(&self, stage: Stage, repo: &str) {
        debug!(%stage, "{}/{repo}", self.owner);
    }
}
