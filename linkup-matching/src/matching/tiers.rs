use linkup_shared::types::goal::Goal;

/// Candidate pools for a viewer, highest priority first.
///
/// Every goal lands in exactly one tier so the feed eventually covers all
/// onboarded members.
pub fn priority_tiers(viewer: Option<Goal>) -> Vec<Vec<Goal>> {
    use Goal::*;

    match viewer {
        Some(Searching) => vec![vec![Recruiting], vec![Investing, Other], vec![Searching]],
        Some(Recruiting) => vec![vec![Searching], vec![Other], vec![Recruiting, Investing]],
        Some(Investing) => vec![vec![Searching, Other], vec![Recruiting], vec![Investing]],
        Some(Other) => vec![vec![Other], vec![Searching, Recruiting], vec![Investing]],
        None => vec![Goal::ALL.to_vec()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_goal_appears_exactly_once() {
        for viewer in Goal::ALL.iter().copied().map(Some).chain([None]) {
            let flat: Vec<Goal> = priority_tiers(viewer).into_iter().flatten().collect();
            let unique: HashSet<Goal> = flat.iter().copied().collect();
            assert_eq!(flat.len(), Goal::ALL.len(), "{viewer:?}");
            assert_eq!(unique.len(), Goal::ALL.len(), "{viewer:?}");
        }
    }

    #[test]
    fn job_seekers_see_recruiters_first() {
        assert_eq!(priority_tiers(Some(Goal::Searching))[0], vec![Goal::Recruiting]);
    }

    #[test]
    fn recruiters_see_job_seekers_first() {
        assert_eq!(priority_tiers(Some(Goal::Recruiting))[0], vec![Goal::Searching]);
    }

    #[test]
    fn no_goal_means_one_flat_tier() {
        assert_eq!(priority_tiers(None).len(), 1);
    }
}
