use std::collections::HashSet;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use linkup_shared::errors::AppResult;
use linkup_shared::types::goal::Goal;
use linkup_shared::types::pagination::{Paginated, PaginationParams};

use crate::matching::feed::{assemble_feed, FeedCandidate};
use crate::matching::reconcile::ActionKind;
use crate::matching::tiers::priority_tiers;
use crate::models::{Match, ProfileSummary};
use crate::schema::{matches, profiles, user_actions};
use crate::services::profiles::{load_summaries, require_profile};

/// Everyone the viewer must not see again: swiped targets and any past or
/// present match partner.
fn excluded_users(conn: &mut PgConnection, viewer: Uuid) -> AppResult<HashSet<Uuid>> {
    let mut excluded: HashSet<Uuid> = user_actions::table
        .filter(user_actions::user_id.eq(viewer))
        .select(user_actions::target_user_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();

    let pairs = matches::table
        .filter(matches::user_id_1.eq(viewer).or(matches::user_id_2.eq(viewer)))
        .load::<Match>(conn)?;
    excluded.extend(pairs.iter().filter_map(|m| m.partner_of(viewer)));

    excluded.insert(viewer);
    Ok(excluded)
}

fn admirers(conn: &mut PgConnection, viewer: Uuid) -> AppResult<HashSet<Uuid>> {
    Ok(user_actions::table
        .filter(user_actions::target_user_id.eq(viewer))
        .filter(user_actions::action_type.eq(ActionKind::Like.as_str()))
        .select(user_actions::user_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect())
}

/// Ids of every onboarded member whose goal is in `goals` (or who has no goal).
fn load_pool(
    conn: &mut PgConnection,
    goals: Option<&[Goal]>,
    excluded: &[Uuid],
) -> AppResult<Vec<Uuid>> {
    let mut query = profiles::table
        .filter(profiles::onboarding_complete.eq(true))
        .filter(profiles::user_id.ne_all(excluded))
        .select(profiles::user_id)
        .into_boxed();

    query = match goals {
        Some(goals) => {
            let names: Vec<&'static str> = goals.iter().map(Goal::as_str).collect();
            query.filter(profiles::goal.eq_any(names))
        }
        None => query.filter(profiles::goal.is_null()),
    };

    Ok(query.load::<Uuid>(conn)?)
}

/// Orders the full candidate pool and loads profiles for the requested page only.
pub fn load_feed(
    conn: &mut PgConnection,
    viewer: Uuid,
    seed: u64,
    params: &PaginationParams,
) -> AppResult<Paginated<FeedCandidate>> {
    let me = require_profile(conn, viewer)?;
    let viewer_goal = me.goal.as_deref().and_then(|g| g.parse::<Goal>().ok());

    let excluded = excluded_users(conn, viewer)?;
    let liked_you = admirers(conn, viewer)?;
    let excluded_list: Vec<Uuid> = excluded.iter().copied().collect();

    let mut pools = Vec::new();
    for tier in priority_tiers(viewer_goal) {
        pools.push(load_pool(conn, Some(&tier), &excluded_list)?);
    }
    // Members without a goal trail behind every tier.
    pools.push(load_pool(conn, None, &excluded_list)?);

    let feed = assemble_feed(viewer, pools, &excluded, &liked_you, seed);
    let feed_size = feed.len();
    let page = Paginated::from_vec(feed, params);

    let page_ids: Vec<Uuid> = page.items.iter().map(|s| s.user_id).collect();
    let mut summaries = load_summaries(conn, &page_ids)?;

    tracing::debug!(
        user_id = %viewer,
        goal = ?viewer_goal,
        excluded = excluded.len(),
        feed_size,
        "feed assembled"
    );

    Ok(page.map(|slot| {
        let profile = summaries
            .remove(&slot.user_id)
            .unwrap_or_else(|| ProfileSummary::unknown(slot.user_id));
        slot.with_profile(profile)
    }))
}
