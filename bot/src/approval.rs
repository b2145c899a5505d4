use shared::github::{RepoInfo, ReviewRecord};
use tracing::error;

use crate::api::PullRequestSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ApprovalStatus {
    #[strum(to_string = "[Approved]")]
    Approved,
    #[strum(to_string = "[Not Approved]")]
    NotApproved,
    #[strum(to_string = "[Approval Status Unknown]")]
    Unknown,
}

impl ApprovalStatus {
    /// Approved as soon as a single review approves, whatever the others say.
    pub fn from_reviews(reviews: &[ReviewRecord]) -> Self {
        if reviews.iter().any(ReviewRecord::is_approved) {
            Self::Approved
        } else {
            Self::NotApproved
        }
    }

    /// Never fails: a review lookup error degrades to [`ApprovalStatus::Unknown`].
    pub fn resolve(pr: &RepoInfo, reviews: anyhow::Result<Vec<ReviewRecord>>) -> Self {
        match reviews {
            Ok(reviews) => Self::from_reviews(&reviews),
            Err(e) => {
                error!("Error fetching reviews for PR #{} ({}): {e:?}", pr.number, pr.full_id);
                Self::Unknown
            }
        }
    }
}

pub async fn resolve_approval(github: &dyn PullRequestSource, pr: &RepoInfo) -> ApprovalStatus {
    let reviews = github.reviews(&pr.owner, &pr.repo, pr.number).await;
    ApprovalStatus::resolve(pr, reviews)
}
