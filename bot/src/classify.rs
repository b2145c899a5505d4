use chrono::{DateTime, Utc};
use shared::github::PrMetadata;

#[derive(Debug, Default)]
pub struct StalePullRequests {
    pub active: Vec<PrMetadata>,
    pub drafts: Vec<PrMetadata>,
}

impl StalePullRequests {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.drafts.is_empty()
    }
}

/// A PR is stale once it has been open for strictly more than `threshold_days`.
pub fn is_stale(pr: &PrMetadata, threshold_days: u32, now: DateTime<Utc>) -> bool {
    pr.age_in_days(now) > i64::from(threshold_days)
}

/// Splits the stale PRs into ready-for-review and draft ones. Input order is kept.
pub fn classify(
    pull_requests: Vec<PrMetadata>,
    threshold_days: u32,
    now: DateTime<Utc>,
) -> StalePullRequests {
    let (drafts, active) = pull_requests
        .into_iter()
        .filter(|pr| is_stale(pr, threshold_days, now))
        .partition(|pr| pr.draft);

    StalePullRequests { active, drafts }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashSet;

    use super::classify;
    use crate::mock::pull_request;

    #[test]
    fn exactly_threshold_days_is_excluded() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let prs = vec![
            pull_request("api", 1, now - Duration::days(2), false),
            pull_request("api", 2, now - Duration::days(2), true),
            pull_request("api", 3, now - Duration::days(3), false),
            pull_request("api", 4, now - Duration::days(2) - Duration::hours(23), false),
        ];

        let stale = classify(prs, 2, now);
        let active: Vec<_> = stale.active.iter().map(|pr| pr.repo_info.number).collect();
        assert_eq!(active, vec![3]);
        assert!(stale.drafts.is_empty());
    }

    #[test]
    fn drafts_and_active_are_split() {
        let now = Utc::now();
        let prs = vec![
            pull_request("api", 1, now - Duration::days(1), false),
            pull_request("api", 2, now - Duration::days(4), false),
            pull_request("api", 3, now - Duration::days(6), true),
        ];

        let stale = classify(prs, 2, now);
        assert_eq!(stale.active.len(), 1);
        assert_eq!(stale.active[0].repo_info.number, 2);
        assert_eq!(stale.drafts.len(), 1);
        assert_eq!(stale.drafts[0].repo_info.number, 3);
    }

    #[test]
    fn partitions_are_disjoint_and_cover_stale_set() {
        let now = Utc::now();
        let prs: Vec<_> = (0..40)
            .map(|i| pull_request("api", i, now - Duration::days((i % 9) as i64), i % 3 == 0))
            .collect();
        let expected: HashSet<u64> = prs
            .iter()
            .filter(|pr| pr.age_in_days(now) > 4)
            .map(|pr| pr.repo_info.number)
            .collect();

        let stale = classify(prs, 4, now);
        let active: HashSet<u64> = stale.active.iter().map(|pr| pr.repo_info.number).collect();
        let drafts: HashSet<u64> = stale.drafts.iter().map(|pr| pr.repo_info.number).collect();

        assert!(active.is_disjoint(&drafts));
        assert_eq!(&active | &drafts, expected);
        assert!(stale.active.iter().all(|pr| !pr.draft));
        assert!(stale.drafts.iter().all(|pr| pr.draft));
    }

    #[test]
    fn zero_threshold_needs_a_full_day() {
        let now = Utc::now();
        let prs = vec![
            pull_request("api", 1, now - Duration::hours(5), false),
            pull_request("api", 2, now - Duration::hours(25), false),
        ];

        let stale = classify(prs, 0, now);
        assert_eq!(stale.active.len(), 1);
        assert_eq!(stale.active[0].repo_info.number, 2);
    }

    #[test]
    fn empty_input() {
        assert!(classify(vec![], 2, Utc::now()).is_empty());
    }
}
