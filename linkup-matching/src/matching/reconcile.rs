//! Like/pass/match state machine for one pair of users.
//!
//! The relationship between two users is derived from at most two directed
//! `user_actions` rows (one per direction) and at most one canonical `matches`
//! row:
//!
//! ```text
//! unswiped -> liked | passed -> (mutual like) matched -> unmatched
//! ```
//!
//! Everything here is pure: the service layer loads the rows, asks for a plan,
//! and applies it inside one transaction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use linkup_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Match, UserAction};

pub const MAX_LIKE_MESSAGE_CHARS: usize = 280;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Like,
    Pass,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Like => "like",
            ActionKind::Pass => "pass",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ActionKind::Like),
            "pass" => Ok(ActionKind::Pass),
            other => Err(AppError::new(
                ErrorCode::InvalidAction,
                format!("unknown action type: {other}"),
            )),
        }
    }
}

/// The part of a `user_actions` row the state machine cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionState {
    pub kind: ActionKind,
    pub message: Option<String>,
}

impl TryFrom<&UserAction> for ActionState {
    type Error = AppError;

    fn try_from(row: &UserAction) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: row.action_type.parse()?,
            message: row.message.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionWrite {
    Insert,
    Update,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchWrite {
    Leave,
    Create,
    Reactivate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipePlan {
    pub action_write: ActionWrite,
    pub kind: ActionKind,
    pub message: Option<String>,
    pub match_write: MatchWrite,
    /// The pair is matched once the plan is applied.
    pub matched: bool,
    /// A `like.sent` event is due (new like, or pass turned into like).
    pub like_sent: bool,
}

/// Trims a like note; blank notes count as absent.
pub fn normalize_message(message: Option<&str>) -> AppResult<Option<String>> {
    let Some(raw) = message else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_LIKE_MESSAGE_CHARS {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            format!("message must be at most {MAX_LIKE_MESSAGE_CHARS} characters"),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

/// Decides what a swipe does to the pair.
///
/// * `mine` / `theirs`: the caller's and the target's current action toward each other
/// * `match_active`: `None` when no match row exists, otherwise its `is_active`
///
/// Unmatching leaves both actions at pass, so a like seen next to an inactive
/// match was given after the match ended.
pub fn plan_swipe(
    mine: Option<&ActionState>,
    theirs: Option<&ActionState>,
    match_active: Option<bool>,
    requested: ActionKind,
    message: Option<&str>,
) -> AppResult<SwipePlan> {
    let message = normalize_message(message)?;
    if requested == ActionKind::Pass && message.is_some() {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "a message can only be attached to a like",
        ));
    }

    if match_active == Some(true) {
        return match mine {
            Some(state) if state.kind == ActionKind::Like && requested == ActionKind::Like => {
                Ok(SwipePlan {
                    action_write: ActionWrite::Unchanged,
                    kind: ActionKind::Like,
                    message: state.message.clone(),
                    match_write: MatchWrite::Leave,
                    matched: true,
                    like_sent: false,
                })
            }
            _ => Err(AppError::new(
                ErrorCode::AlreadyMatched,
                "you are already matched with this user; unmatch instead",
            )),
        };
    }

    let (action_write, stored_message) = match mine {
        None => (ActionWrite::Insert, message),
        Some(current) if current.kind == requested => match message {
            // A repeat without a new note keeps the stored note.
            None => (ActionWrite::Unchanged, current.message.clone()),
            Some(m) if current.message.as_deref() == Some(m.as_str()) => {
                (ActionWrite::Unchanged, Some(m))
            }
            Some(m) => (ActionWrite::Update, Some(m)),
        },
        Some(_) => (ActionWrite::Update, message),
    };

    let kind_changed = mine.map_or(true, |current| current.kind != requested);
    let like_sent = requested == ActionKind::Like && kind_changed;

    let mutual = requested == ActionKind::Like
        && theirs.map_or(false, |t| t.kind == ActionKind::Like);

    let match_write = match (mutual, match_active) {
        (true, None) => MatchWrite::Create,
        (true, Some(false)) => MatchWrite::Reactivate,
        _ => MatchWrite::Leave,
    };

    Ok(SwipePlan {
        action_write,
        kind: requested,
        message: stored_message,
        match_write,
        matched: mutual,
        like_sent,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchPlan {
    /// Already inactive; nothing to write.
    AlreadyEnded,
    /// Deactivate the match and rewrite both directed actions of the pair to pass.
    Deactivate { partner: Uuid },
}

pub fn plan_unmatch(m: &Match, caller: Uuid) -> AppResult<UnmatchPlan> {
    let partner = m
        .partner_of(caller)
        .ok_or_else(|| AppError::new(ErrorCode::NotInMatch, "you are not part of this match"))?;

    if !m.is_active {
        return Ok(UnmatchPlan::AlreadyEnded);
    }

    Ok(UnmatchPlan::Deactivate { partner })
}

/// How the pair looks from the caller's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipState {
    Unswiped,
    Liked,
    Passed,
    LikedYou,
    Matched,
    Unmatched,
}

pub fn relationship_state(
    mine: Option<ActionKind>,
    theirs: Option<ActionKind>,
    match_active: Option<bool>,
) -> RelationshipState {
    match (match_active, mine, theirs) {
        (Some(true), _, _) => RelationshipState::Matched,
        (Some(false), _, _) => RelationshipState::Unmatched,
        (None, Some(ActionKind::Like), _) => RelationshipState::Liked,
        (None, Some(ActionKind::Pass), _) => RelationshipState::Passed,
        (None, None, Some(ActionKind::Like)) => RelationshipState::LikedYou,
        (None, None, _) => RelationshipState::Unswiped,
    }
}

/// An incoming like waits in the inbox until the recipient reacts to it or the
/// pair is matched.
pub fn is_pending_like(
    incoming: &UserAction,
    recipient_has_acted: bool,
    pair_actively_matched: bool,
) -> bool {
    incoming.action_type == ActionKind::Like.as_str() && !recipient_has_acted && !pair_actively_matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn like() -> ActionState {
        ActionState { kind: ActionKind::Like, message: None }
    }

    fn pass() -> ActionState {
        ActionState { kind: ActionKind::Pass, message: None }
    }

    #[test]
    fn first_like_without_reciprocation_is_pending() {
        let plan = plan_swipe(None, None, None, ActionKind::Like, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Insert);
        assert_eq!(plan.match_write, MatchWrite::Leave);
        assert!(!plan.matched);
        assert!(plan.like_sent);
    }

    #[test]
    fn mutual_like_creates_match() {
        let plan = plan_swipe(None, Some(&like()), None, ActionKind::Like, None).unwrap();
        assert_eq!(plan.match_write, MatchWrite::Create);
        assert!(plan.matched);
    }

    #[test]
    fn pass_never_matches_even_if_liked() {
        let plan = plan_swipe(None, Some(&like()), None, ActionKind::Pass, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Insert);
        assert_eq!(plan.match_write, MatchWrite::Leave);
        assert!(!plan.matched);
        assert!(!plan.like_sent);
    }

    #[test]
    fn repeated_identical_action_is_a_no_op() {
        let plan = plan_swipe(Some(&pass()), None, None, ActionKind::Pass, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Unchanged);
        assert!(!plan.like_sent);

        let plan = plan_swipe(Some(&like()), None, None, ActionKind::Like, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Unchanged);
        assert!(!plan.like_sent);
    }

    #[test]
    fn repeat_like_keeps_stored_note() {
        let mine = ActionState { kind: ActionKind::Like, message: Some("hello".into()) };
        let plan = plan_swipe(Some(&mine), None, None, ActionKind::Like, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Unchanged);
        assert_eq!(plan.message.as_deref(), Some("hello"));

        let plan = plan_swipe(Some(&mine), None, None, ActionKind::Like, Some("  hello ")).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Unchanged);

        let plan = plan_swipe(Some(&mine), None, None, ActionKind::Like, Some("new note")).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Update);
        assert_eq!(plan.message.as_deref(), Some("new note"));
        assert!(!plan.like_sent);
    }

    #[test]
    fn pass_can_be_upgraded_to_like() {
        let plan = plan_swipe(Some(&pass()), Some(&like()), None, ActionKind::Like, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Update);
        assert_eq!(plan.match_write, MatchWrite::Create);
        assert!(plan.like_sent);
    }

    #[test]
    fn like_can_be_withdrawn_and_drops_its_note() {
        let mine = ActionState { kind: ActionKind::Like, message: Some("hi".into()) };
        let plan = plan_swipe(Some(&mine), None, None, ActionKind::Pass, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Update);
        assert_eq!(plan.kind, ActionKind::Pass);
        assert_eq!(plan.message, None);
    }

    #[test]
    fn active_match_rejects_changes_but_tolerates_repeat_like() {
        let err = plan_swipe(Some(&like()), Some(&like()), Some(true), ActionKind::Pass, None).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::AlreadyMatched));

        let plan = plan_swipe(Some(&like()), Some(&like()), Some(true), ActionKind::Like, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Unchanged);
        assert_eq!(plan.match_write, MatchWrite::Leave);
        assert!(plan.matched);
    }

    #[test]
    fn rematch_after_unmatch_needs_both_likes() {
        // Unmatch leaves both sides at pass. One side liking again is only a pending like.
        let plan = plan_swipe(Some(&pass()), Some(&pass()), Some(false), ActionKind::Like, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Update);
        assert_eq!(plan.match_write, MatchWrite::Leave);
        assert!(!plan.matched);
        assert!(plan.like_sent);

        // The other side liking back revives the existing row.
        let plan = plan_swipe(Some(&pass()), Some(&like()), Some(false), ActionKind::Like, None).unwrap();
        assert_eq!(plan.match_write, MatchWrite::Reactivate);
        assert!(plan.matched);

        // A repeat like from the first side changes nothing while the other still passes.
        let plan = plan_swipe(Some(&like()), Some(&pass()), Some(false), ActionKind::Like, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Unchanged);
        assert_eq!(plan.match_write, MatchWrite::Leave);
        assert!(!plan.matched);
    }

    #[test]
    fn mutual_like_without_match_row_heals_on_repeat() {
        let plan = plan_swipe(Some(&like()), Some(&like()), None, ActionKind::Like, None).unwrap();
        assert_eq!(plan.action_write, ActionWrite::Unchanged);
        assert_eq!(plan.match_write, MatchWrite::Create);
    }

    #[test]
    fn message_rules() {
        let err = plan_swipe(None, None, None, ActionKind::Pass, Some("nope")).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ValidationError));

        // Blank note on a pass is just absent.
        assert!(plan_swipe(None, None, None, ActionKind::Pass, Some("   ")).is_ok());

        let long = "x".repeat(MAX_LIKE_MESSAGE_CHARS + 1);
        assert!(plan_swipe(None, None, None, ActionKind::Like, Some(&long)).is_err());

        let exact = "é".repeat(MAX_LIKE_MESSAGE_CHARS);
        assert!(plan_swipe(None, None, None, ActionKind::Like, Some(&exact)).is_ok());
    }

    fn match_row(a: Uuid, b: Uuid, active: bool) -> Match {
        Match {
            id: Uuid::new_v4(),
            user_id_1: a.min(b),
            user_id_2: a.max(b),
            created_at: Utc::now(),
            is_active: active,
            ended_at: None,
            ended_by: None,
        }
    }

    #[test]
    fn unmatch_plans() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(
            plan_unmatch(&match_row(a, b, true), a).unwrap(),
            UnmatchPlan::Deactivate { partner: b }
        );
        assert_eq!(plan_unmatch(&match_row(a, b, false), b).unwrap(), UnmatchPlan::AlreadyEnded);

        let err = plan_unmatch(&match_row(a, b, true), Uuid::new_v4()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotInMatch));
    }

    #[test]
    fn relationship_states() {
        use ActionKind::*;
        use RelationshipState as S;

        assert_eq!(relationship_state(None, None, None), S::Unswiped);
        assert_eq!(relationship_state(Some(Like), None, None), S::Liked);
        assert_eq!(relationship_state(Some(Pass), Some(Like), None), S::Passed);
        assert_eq!(relationship_state(None, Some(Like), None), S::LikedYou);
        assert_eq!(relationship_state(None, Some(Pass), None), S::Unswiped);
        assert_eq!(relationship_state(Some(Like), Some(Like), Some(true)), S::Matched);
        assert_eq!(relationship_state(Some(Pass), Some(Like), Some(false)), S::Unmatched);
    }

    #[test]
    fn pending_like_rules() {
        let row = UserAction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            target_user_id: Uuid::new_v4(),
            action_type: "like".into(),
            message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(is_pending_like(&row, false, false));
        assert!(!is_pending_like(&row, true, false));
        assert!(!is_pending_like(&row, false, true));

        let passed = UserAction { action_type: "pass".into(), ..row };
        assert!(!is_pending_like(&passed, false, false));
    }

    #[test]
    fn action_kind_parsing() {
        assert_eq!("like".parse::<ActionKind>().unwrap(), ActionKind::Like);
        let err = "superlike".parse::<ActionKind>().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidAction));
    }
}
