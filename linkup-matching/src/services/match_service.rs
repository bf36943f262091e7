use std::collections::HashSet;

use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use linkup_shared::errors::{AppError, AppResult, ErrorCode};
use linkup_shared::types::pagination::{Paginated, PaginationParams};

use crate::matching::pair::CanonicalPair;
use crate::matching::reconcile::{
    is_pending_like, plan_swipe, plan_unmatch, relationship_state, ActionKind, ActionState,
    ActionWrite, MatchWrite, RelationshipState, UnmatchPlan,
};
use crate::models::{Match, NewMatch, NewUserAction, ProfileSummary, UserAction};
use crate::schema::{matches, user_actions};
use crate::services::profiles::{load_summaries, require_profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    Created,
    Reactivated,
}

#[derive(Debug, Serialize)]
pub struct SwipeOutcome {
    pub action: UserAction,
    pub matched: bool,
    #[serde(rename = "match")]
    pub match_row: Option<Match>,
    /// The action row was inserted or changed; false for idempotent repeats.
    #[serde(skip)]
    pub recorded: bool,
    #[serde(skip)]
    pub like_sent: bool,
    #[serde(skip)]
    pub match_event: Option<MatchEvent>,
}

#[derive(Debug, Serialize)]
pub struct IncomingLike {
    pub from: ProfileSummary,
    pub message: Option<String>,
    pub liked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub match_row: Match,
    pub partner: Option<ProfileSummary>,
}

#[derive(Debug, Serialize)]
pub struct RelationshipView {
    pub user_id: Uuid,
    pub state: RelationshipState,
    pub my_action: Option<ActionKind>,
    pub their_action: Option<ActionKind>,
    pub liked_you: bool,
    #[serde(rename = "match")]
    pub match_row: Option<Match>,
}

// --- Row helpers ---

/// Serializes every swipe touching this pair until the transaction ends.
fn lock_pair(conn: &mut PgConnection, pair: &CanonicalPair) -> AppResult<()> {
    diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
        .bind::<diesel::sql_types::BigInt, _>(pair.lock_key())
        .execute(conn)?;
    Ok(())
}

fn find_action(conn: &mut PgConnection, from: Uuid, to: Uuid) -> AppResult<Option<UserAction>> {
    Ok(user_actions::table
        .filter(user_actions::user_id.eq(from))
        .filter(user_actions::target_user_id.eq(to))
        .first::<UserAction>(conn)
        .optional()?)
}

fn find_match(conn: &mut PgConnection, pair: &CanonicalPair) -> AppResult<Option<Match>> {
    Ok(matches::table
        .filter(matches::user_id_1.eq(pair.user_id_1()))
        .filter(matches::user_id_2.eq(pair.user_id_2()))
        .first::<Match>(conn)
        .optional()?)
}

fn state_of(row: Option<&UserAction>) -> AppResult<Option<ActionState>> {
    row.map(ActionState::try_from).transpose()
}

fn write_pass(conn: &mut PgConnection, from: Uuid, to: Uuid) -> AppResult<UserAction> {
    match find_action(conn, from, to)? {
        Some(row) if row.action_type == ActionKind::Pass.as_str() => Ok(row),
        Some(row) => Ok(diesel::update(user_actions::table.find(row.id))
            .set((
                user_actions::action_type.eq(ActionKind::Pass.as_str()),
                user_actions::message.eq(None::<String>),
                user_actions::updated_at.eq(Utc::now()),
            ))
            .get_result::<UserAction>(conn)?),
        None => Ok(diesel::insert_into(user_actions::table)
            .values(&NewUserAction {
                user_id: from,
                target_user_id: to,
                action_type: ActionKind::Pass.as_str().to_string(),
                message: None,
            })
            .get_result::<UserAction>(conn)?),
    }
}

// --- Swipes ---

/// Applies one swipe. Must run inside a transaction.
fn swipe_in_tx(
    conn: &mut PgConnection,
    actor: Uuid,
    target: Uuid,
    kind: ActionKind,
    message: Option<&str>,
) -> AppResult<SwipeOutcome> {
    let pair = CanonicalPair::new(actor, target)?;
    require_profile(conn, target)?;
    lock_pair(conn, &pair)?;

    let mine_row = find_action(conn, actor, target)?;
    let theirs_row = find_action(conn, target, actor)?;
    let match_row = find_match(conn, &pair)?;

    let plan = plan_swipe(
        state_of(mine_row.as_ref())?.as_ref(),
        state_of(theirs_row.as_ref())?.as_ref(),
        match_row.as_ref().map(|m| m.is_active),
        kind,
        message,
    )?;

    let action = match (plan.action_write, mine_row) {
        (ActionWrite::Insert, _) => diesel::insert_into(user_actions::table)
            .values(&NewUserAction {
                user_id: actor,
                target_user_id: target,
                action_type: plan.kind.as_str().to_string(),
                message: plan.message.clone(),
            })
            .get_result::<UserAction>(conn)?,
        (ActionWrite::Update, Some(row)) => diesel::update(user_actions::table.find(row.id))
            .set((
                user_actions::action_type.eq(plan.kind.as_str()),
                user_actions::message.eq(plan.message.clone()),
                user_actions::updated_at.eq(Utc::now()),
            ))
            .get_result::<UserAction>(conn)?,
        (ActionWrite::Unchanged, Some(row)) => row,
        (_, None) => return Err(AppError::internal("swipe plan refers to a missing action row")),
    };

    let (match_row, match_event) = match (plan.match_write, match_row) {
        (MatchWrite::Create, _) => {
            let created = diesel::insert_into(matches::table)
                .values(&NewMatch {
                    user_id_1: pair.user_id_1(),
                    user_id_2: pair.user_id_2(),
                })
                .get_result::<Match>(conn)?;
            (Some(created), Some(MatchEvent::Created))
        }
        (MatchWrite::Reactivate, Some(existing)) => {
            let revived = diesel::update(matches::table.find(existing.id))
                .set((
                    matches::is_active.eq(true),
                    matches::ended_at.eq(None::<DateTime<Utc>>),
                    matches::ended_by.eq(None::<Uuid>),
                ))
                .get_result::<Match>(conn)?;
            (Some(revived), Some(MatchEvent::Reactivated))
        }
        (MatchWrite::Reactivate, None) => {
            return Err(AppError::internal("swipe plan reactivates a missing match"))
        }
        (MatchWrite::Leave, existing) => (existing, None),
    };

    tracing::info!(
        actor = %actor,
        target = %target,
        action = %plan.kind,
        write = ?plan.action_write,
        matched = plan.matched,
        "swipe recorded"
    );

    Ok(SwipeOutcome {
        action,
        matched: plan.matched,
        match_row,
        recorded: plan.action_write != ActionWrite::Unchanged,
        like_sent: plan.like_sent,
        match_event,
    })
}

pub fn swipe(
    conn: &mut PgConnection,
    actor: Uuid,
    target: Uuid,
    kind: ActionKind,
    message: Option<&str>,
) -> AppResult<SwipeOutcome> {
    conn.transaction(|conn| swipe_in_tx(conn, actor, target, kind, message))
}

// --- Likes inbox ---

fn active_partners(conn: &mut PgConnection, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
    Ok(matches::table
        .filter(matches::is_active.eq(true))
        .filter(matches::user_id_1.eq(user_id).or(matches::user_id_2.eq(user_id)))
        .load::<Match>(conn)?
        .iter()
        .filter_map(|m| m.partner_of(user_id))
        .collect())
}

/// Likes received that the caller has not reacted to yet, newest first.
pub fn incoming_likes(
    conn: &mut PgConnection,
    me: Uuid,
    params: &PaginationParams,
) -> AppResult<Paginated<IncomingLike>> {
    let incoming = user_actions::table
        .filter(user_actions::target_user_id.eq(me))
        .filter(user_actions::action_type.eq(ActionKind::Like.as_str()))
        .order(user_actions::updated_at.desc())
        .load::<UserAction>(conn)?;

    let acted: HashSet<Uuid> = user_actions::table
        .filter(user_actions::user_id.eq(me))
        .select(user_actions::target_user_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();
    let partners = active_partners(conn, me)?;

    let pending: Vec<UserAction> = incoming
        .into_iter()
        .filter(|a| is_pending_like(a, acted.contains(&a.user_id), partners.contains(&a.user_id)))
        .collect();

    let page = Paginated::from_vec(pending, params);
    let liker_ids: Vec<Uuid> = page.items.iter().map(|a| a.user_id).collect();
    let mut summaries = load_summaries(conn, &liker_ids)?;

    Ok(page.map(|a| IncomingLike {
        from: summaries.remove(&a.user_id).unwrap_or_else(|| ProfileSummary::unknown(a.user_id)),
        message: a.message,
        liked_at: a.updated_at,
    }))
}

fn require_pending_like(conn: &mut PgConnection, me: Uuid, liker: Uuid) -> AppResult<UserAction> {
    let pair = CanonicalPair::new(me, liker)?;
    lock_pair(conn, &pair)?;

    let incoming = find_action(conn, liker, me)?;
    let answered = find_action(conn, me, liker)?.is_some();
    let matched = find_match(conn, &pair)?.map_or(false, |m| m.is_active);

    match incoming {
        Some(row) if is_pending_like(&row, answered, matched) => Ok(row),
        _ => Err(AppError::new(ErrorCode::LikeRequestNotFound, "no pending like from this user")),
    }
}

/// Likes back a pending like, which always produces a match.
pub fn accept_like(
    conn: &mut PgConnection,
    me: Uuid,
    liker: Uuid,
    message: Option<&str>,
) -> AppResult<SwipeOutcome> {
    conn.transaction(|conn| {
        require_pending_like(conn, me, liker)?;
        swipe_in_tx(conn, me, liker, ActionKind::Like, message)
    })
}

/// Passes on a pending like; it leaves the inbox.
pub fn ignore_like(conn: &mut PgConnection, me: Uuid, liker: Uuid) -> AppResult<SwipeOutcome> {
    conn.transaction(|conn| {
        require_pending_like(conn, me, liker)?;
        swipe_in_tx(conn, me, liker, ActionKind::Pass, None)
    })
}

// --- Matches ---

pub fn list_matches(
    conn: &mut PgConnection,
    me: Uuid,
    params: &PaginationParams,
) -> AppResult<Paginated<MatchView>> {
    let total: i64 = matches::table
        .filter(matches::is_active.eq(true))
        .filter(matches::user_id_1.eq(me).or(matches::user_id_2.eq(me)))
        .count()
        .get_result(conn)?;

    let rows = matches::table
        .filter(matches::is_active.eq(true))
        .filter(matches::user_id_1.eq(me).or(matches::user_id_2.eq(me)))
        .order(matches::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Match>(conn)?;

    let partner_ids: Vec<Uuid> = rows.iter().filter_map(|m| m.partner_of(me)).collect();
    let mut summaries = load_summaries(conn, &partner_ids)?;

    let items = rows
        .into_iter()
        .map(|m| {
            let partner = m.partner_of(me).and_then(|p| summaries.remove(&p));
            MatchView { match_row: m, partner }
        })
        .collect();

    Ok(Paginated::new(items, total as u64, params))
}

fn load_match_for(conn: &mut PgConnection, me: Uuid, match_id: Uuid) -> AppResult<Match> {
    let m = matches::table
        .find(match_id)
        .first::<Match>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

    if !m.involves(me) {
        return Err(AppError::new(ErrorCode::NotInMatch, "you are not part of this match"));
    }
    Ok(m)
}

pub fn get_match(conn: &mut PgConnection, me: Uuid, match_id: Uuid) -> AppResult<MatchView> {
    let m = load_match_for(conn, me, match_id)?;
    let partner = match m.partner_of(me) {
        Some(p) => load_summaries(conn, &[p])?.remove(&p),
        None => None,
    };
    Ok(MatchView { match_row: m, partner })
}

/// Ends a match. Returns the row and whether this call ended it.
pub fn unmatch(conn: &mut PgConnection, me: Uuid, match_id: Uuid) -> AppResult<(Match, bool)> {
    conn.transaction(|conn| {
        let m = load_match_for(conn, me, match_id)?;
        let pair = CanonicalPair::new(m.user_id_1, m.user_id_2)?;
        lock_pair(conn, &pair)?;

        let m = matches::table
            .find(match_id)
            .for_update()
            .first::<Match>(conn)?;

        match plan_unmatch(&m, me)? {
            UnmatchPlan::AlreadyEnded => Ok((m, false)),
            UnmatchPlan::Deactivate { partner } => {
                let ended = diesel::update(matches::table.find(m.id))
                    .set((
                        matches::is_active.eq(false),
                        matches::ended_at.eq(Some(Utc::now())),
                        matches::ended_by.eq(Some(me)),
                    ))
                    .get_result::<Match>(conn)?;

                write_pass(conn, me, partner)?;
                write_pass(conn, partner, me)?;

                tracing::info!(match_id = %ended.id, ended_by = %me, "match ended");
                Ok((ended, true))
            }
        }
    })
}

pub fn relationship(conn: &mut PgConnection, me: Uuid, other: Uuid) -> AppResult<RelationshipView> {
    let pair = CanonicalPair::new(me, other)?;
    require_profile(conn, other)?;

    let mine = state_of(find_action(conn, me, other)?.as_ref())?.map(|s| s.kind);
    let theirs = state_of(find_action(conn, other, me)?.as_ref())?.map(|s| s.kind);
    let match_row = find_match(conn, &pair)?;

    Ok(RelationshipView {
        user_id: other,
        state: relationship_state(mine, theirs, match_row.as_ref().map(|m| m.is_active)),
        my_action: mine,
        their_action: theirs,
        liked_you: theirs == Some(ActionKind::Like),
        match_row,
    })
}
