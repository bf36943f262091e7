use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

use linkup_shared::types::pagination::Paginated;

use crate::models::ProfileSummary;

/// Seeds stay below 2^53 so they survive a round trip through JavaScript clients.
const SEED_SPACE: u64 = 1 << 53;

#[derive(Debug, Serialize, Clone)]
pub struct FeedCandidate {
    #[serde(flatten)]
    pub profile: ProfileSummary,
    /// Index of the priority tier the candidate came from (0 = highest).
    pub tier: usize,
    /// The candidate already liked the viewer; a like back is an instant match.
    pub liked_you: bool,
}

/// A position in the feed before its profile is loaded.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct FeedSlot {
    pub user_id: Uuid,
    pub tier: usize,
    pub liked_you: bool,
}

impl FeedSlot {
    pub fn with_profile(self, profile: ProfileSummary) -> FeedCandidate {
        FeedCandidate {
            profile,
            tier: self.tier,
            liked_you: self.liked_you,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    #[serde(flatten)]
    pub page: Paginated<FeedCandidate>,
    pub seed: u64,
}

pub fn fresh_seed() -> u64 {
    rand::thread_rng().gen_range(0..SEED_SPACE)
}

fn mix_seed(seed: u64, viewer: Uuid) -> u64 {
    let v = viewer.as_u128();
    seed ^ (v as u64) ^ ((v >> 64) as u64)
}

/// Orders the whole swipe feed out of per-tier candidate ids.
///
/// Tier order is preserved. Within a tier candidates are shuffled with an RNG
/// derived from `(seed, viewer)`, so the same seed always yields the same feed
/// for the same pools regardless of the order rows came back from the store.
/// A candidate present in several tiers is kept in the first one only.
pub fn assemble_feed(
    viewer: Uuid,
    tiers: Vec<Vec<Uuid>>,
    excluded: &HashSet<Uuid>,
    liked_you: &HashSet<Uuid>,
    seed: u64,
) -> Vec<FeedSlot> {
    let base = mix_seed(seed, viewer);
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut feed = Vec::new();

    for (tier, pool) in tiers.into_iter().enumerate() {
        let mut bucket: Vec<Uuid> = pool
            .into_iter()
            .filter(|id| *id != viewer && !excluded.contains(id))
            .filter(|id| seen.insert(*id))
            .collect();

        bucket.sort_unstable();
        let mut rng = StdRng::seed_from_u64(base.wrapping_add(tier as u64));
        bucket.shuffle(&mut rng);

        feed.extend(bucket.into_iter().map(|user_id| FeedSlot {
            user_id,
            tier,
            liked_you: liked_you.contains(&user_id),
        }));
    }

    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkup_shared::types::pagination::PaginationParams;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn users(feed: &[FeedSlot]) -> Vec<Uuid> {
        feed.iter().map(|s| s.user_id).collect()
    }

    #[test]
    fn tiers_keep_their_priority_order() {
        let recruiters = ids(5);
        let others = ids(5);

        let feed = assemble_feed(
            Uuid::new_v4(),
            vec![recruiters.clone(), others],
            &HashSet::new(),
            &HashSet::new(),
            7,
        );

        assert_eq!(feed.len(), 10);
        assert!(feed[..5].iter().all(|s| s.tier == 0 && recruiters.contains(&s.user_id)));
        assert!(feed[5..].iter().all(|s| s.tier == 1));
    }

    #[test]
    fn excluded_users_and_viewer_are_dropped() {
        let viewer = Uuid::new_v4();
        let swiped = Uuid::new_v4();
        let fresh = Uuid::new_v4();
        let excluded: HashSet<Uuid> = [swiped].into_iter().collect();

        let feed = assemble_feed(
            viewer,
            vec![vec![viewer, swiped, fresh]],
            &excluded,
            &HashSet::new(),
            1,
        );

        assert_eq!(users(&feed), vec![fresh]);
    }

    #[test]
    fn duplicates_keep_the_highest_tier() {
        let dup = Uuid::new_v4();
        let feed = assemble_feed(
            Uuid::new_v4(),
            vec![vec![dup], vec![dup, Uuid::new_v4()]],
            &HashSet::new(),
            &HashSet::new(),
            3,
        );

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].user_id, dup);
        assert_eq!(feed[0].tier, 0);
    }

    #[test]
    fn same_seed_same_order_regardless_of_input_order() {
        let viewer = Uuid::new_v4();
        let pool = ids(20);
        let mut reversed = pool.clone();
        reversed.reverse();

        let a = assemble_feed(viewer, vec![pool.clone()], &HashSet::new(), &HashSet::new(), 42);
        let b = assemble_feed(viewer, vec![reversed], &HashSet::new(), &HashSet::new(), 42);
        assert_eq!(users(&a), users(&b));

        let c = assemble_feed(viewer, vec![pool], &HashSet::new(), &HashSet::new(), 43);
        assert_ne!(users(&a), users(&c));
    }

    #[test]
    fn large_tiers_are_counted_and_shuffled_in_full() {
        let viewer = Uuid::new_v4();
        let mut pool = ids(2000);
        let feed = assemble_feed(viewer, vec![pool.clone()], &HashSet::new(), &HashSet::new(), 5);

        let page = Paginated::from_vec(feed.clone(), &PaginationParams::new(1, 20));
        assert_eq!(page.total, 2000);
        assert_eq!(page.total_pages, 100);

        // The first page is drawn from the whole tier, not its lowest ids.
        pool.sort_unstable();
        let lowest: HashSet<Uuid> = pool[..500].iter().copied().collect();
        assert!(page.items.iter().any(|s| !lowest.contains(&s.user_id)));

        let last = Paginated::from_vec(feed, &PaginationParams::new(100, 20));
        assert_eq!(last.items.len(), 20);
    }

    #[test]
    fn liked_you_is_flagged() {
        let admirer = Uuid::new_v4();
        let liked_you: HashSet<Uuid> = [admirer].into_iter().collect();
        let feed = assemble_feed(
            Uuid::new_v4(),
            vec![vec![admirer, Uuid::new_v4()]],
            &HashSet::new(),
            &liked_you,
            9,
        );
        let flagged: Vec<_> = feed.iter().filter(|s| s.liked_you).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].user_id, admirer);
    }

    #[test]
    fn slot_keeps_tier_and_flag_when_hydrated() {
        let user_id = Uuid::new_v4();
        let slot = FeedSlot { user_id, tier: 2, liked_you: true };
        let candidate = slot.with_profile(ProfileSummary::unknown(user_id));
        assert_eq!(candidate.tier, 2);
        assert!(candidate.liked_you);
        assert_eq!(candidate.profile.user_id, user_id);
    }

    #[test]
    fn empty_pools_give_an_empty_feed() {
        let feed = assemble_feed(Uuid::new_v4(), vec![vec![], vec![]], &HashSet::new(), &HashSet::new(), 0);
        assert!(feed.is_empty());
    }

    #[test]
    fn fresh_seed_fits_in_a_js_number() {
        for _ in 0..100 {
            assert!(fresh_seed() < SEED_SPACE);
        }
    }
}
