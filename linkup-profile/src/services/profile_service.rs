use std::collections::HashSet;

use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use linkup_shared::errors::{AppError, AppResult, ErrorCode};
use linkup_shared::types::goal::Goal;

use crate::models::{NewProfile, PersonalChanges, ProfessionalChanges, Profile, SocialChanges};
use crate::schema::profiles;

pub const MAX_SKILLS: usize = 30;
pub const MAX_SKILL_CHARS: usize = 40;
pub const MAX_EXPERIENCE: usize = 20;
pub const MAX_EDUCATION: usize = 10;
pub const FINAL_STEP: i16 = 3;

// --- Normalization ---

/// Trims a free-text field; blank input is stored as NULL.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims skills, drops blanks and removes case-insensitive duplicates,
/// keeping the first spelling seen.
pub fn normalize_skills(raw: Vec<String>) -> AppResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut skills = Vec::new();

    for skill in raw {
        let skill = skill.trim();
        if skill.is_empty() {
            continue;
        }
        if skill.chars().count() > MAX_SKILL_CHARS {
            return Err(AppError::Validation(format!(
                "skill '{skill}' exceeds {MAX_SKILL_CHARS} characters"
            )));
        }
        if seen.insert(skill.to_lowercase()) {
            skills.push(skill.to_string());
        }
    }

    if skills.len() > MAX_SKILLS {
        return Err(AppError::Validation(format!(
            "at most {MAX_SKILLS} skills are allowed"
        )));
    }
    Ok(skills)
}

pub fn parse_goal(raw: &str) -> AppResult<Goal> {
    raw.parse::<Goal>()
        .map_err(|e| AppError::new(ErrorCode::InvalidGoal, e))
}

/// Resolves one social link field of a step-3 update.
///
/// Absent leaves the column alone, an empty string clears it, anything else
/// must be an http(s) URL.
pub fn resolve_link(field: &str, value: Option<String>) -> AppResult<Option<Option<String>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(Some(None));
    }
    let is_web = value.starts_with("https://") || value.starts_with("http://");
    if !is_web || !validator::validate_url(value) {
        return Err(AppError::Validation(format!("{field} must be a valid URL")));
    }
    Ok(Some(Some(value.to_string())))
}

pub fn advance_step(current: i16, reached: i16) -> i16 {
    current.max(reached).min(FINAL_STEP)
}

/// A profile can finish onboarding once it has a name and a goal.
pub fn check_completeness(profile: &Profile) -> AppResult<Goal> {
    let has_name = profile
        .full_name
        .as_deref()
        .map_or(false, |n| !n.trim().is_empty());
    if !has_name {
        return Err(AppError::new(
            ErrorCode::OnboardingIncomplete,
            "full name is required to complete onboarding",
        ));
    }

    profile
        .goal
        .as_deref()
        .and_then(|g| g.parse::<Goal>().ok())
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::OnboardingIncomplete,
                "a goal is required to complete onboarding",
            )
        })
}

// --- Queries ---

pub fn find_by_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Option<Profile>> {
    Ok(profiles::table
        .filter(profiles::user_id.eq(user_id))
        .first::<Profile>(conn)
        .optional()?)
}

pub fn require_by_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Profile> {
    find_by_user(conn, user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

/// Looks a profile up by profile id or by owner id.
pub fn find_public(conn: &mut PgConnection, id: Uuid) -> AppResult<Profile> {
    profiles::table
        .filter(profiles::id.eq(id).or(profiles::user_id.eq(id)))
        .first::<Profile>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

pub fn load_by_users(conn: &mut PgConnection, user_ids: &[Uuid]) -> AppResult<Vec<Profile>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(profiles::table
        .filter(profiles::user_id.eq_any(user_ids))
        .load::<Profile>(conn)?)
}

// --- Writes ---

/// Creates the caller's empty profile. Returns the row and whether it was new.
pub fn create_profile(conn: &mut PgConnection, user_id: Uuid) -> AppResult<(Profile, bool)> {
    let inserted = diesel::insert_into(profiles::table)
        .values(&NewProfile { user_id })
        .on_conflict(profiles::user_id)
        .do_nothing()
        .execute(conn)?;

    let profile = require_by_user(conn, user_id)?;
    if inserted > 0 {
        tracing::info!(profile_id = %profile.id, user_id = %user_id, "profile created");
    }
    Ok((profile, inserted > 0))
}

pub fn update_personal(
    conn: &mut PgConnection,
    user_id: Uuid,
    mut changes: PersonalChanges,
) -> AppResult<Profile> {
    conn.transaction(|conn| {
        let current = require_by_user(conn, user_id)?;
        changes.onboarding_step = advance_step(current.onboarding_step, 1);

        Ok(diesel::update(profiles::table.find(current.id))
            .set((&changes, profiles::updated_at.eq(Utc::now())))
            .get_result::<Profile>(conn)?)
    })
}

pub fn update_professional(
    conn: &mut PgConnection,
    user_id: Uuid,
    mut changes: ProfessionalChanges,
) -> AppResult<Profile> {
    conn.transaction(|conn| {
        let current = require_by_user(conn, user_id)?;
        changes.onboarding_step = advance_step(current.onboarding_step, 2);

        Ok(diesel::update(profiles::table.find(current.id))
            .set((&changes, profiles::updated_at.eq(Utc::now())))
            .get_result::<Profile>(conn)?)
    })
}

pub fn update_social(
    conn: &mut PgConnection,
    user_id: Uuid,
    mut changes: SocialChanges,
) -> AppResult<Profile> {
    conn.transaction(|conn| {
        let current = require_by_user(conn, user_id)?;
        changes.onboarding_step = Some(FINAL_STEP);

        Ok(diesel::update(profiles::table.find(current.id))
            .set((&changes, profiles::updated_at.eq(Utc::now())))
            .get_result::<Profile>(conn)?)
    })
}

/// Marks onboarding complete. Returns the row and whether this call completed it.
pub fn complete_onboarding(conn: &mut PgConnection, user_id: Uuid) -> AppResult<(Profile, bool)> {
    conn.transaction(|conn| {
        let current = require_by_user(conn, user_id)?;
        check_completeness(&current)?;

        if current.onboarding_complete {
            return Ok((current, false));
        }

        let updated = diesel::update(profiles::table.find(current.id))
            .set((
                profiles::onboarding_complete.eq(true),
                profiles::updated_at.eq(Utc::now()),
            ))
            .get_result::<Profile>(conn)?;

        tracing::info!(user_id = %user_id, goal = ?updated.goal, "onboarding completed");
        Ok((updated, true))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(full_name: Option<&str>, goal: Option<&str>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            full_name: full_name.map(String::from),
            headline: None,
            bio: None,
            location: None,
            goal: goal.map(String::from),
            skills: serde_json::json!([]),
            experience: serde_json::json!([]),
            education: serde_json::json!([]),
            github_url: None,
            linkedin_url: None,
            twitter_url: None,
            website_url: None,
            avatar_url: None,
            onboarding_step: 2,
            onboarding_complete: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn skills_are_trimmed_and_deduplicated() {
        let skills = normalize_skills(vec![
            " Rust ".into(),
            "rust".into(),
            "".into(),
            "Go".into(),
            "RUST".into(),
            "go ".into(),
        ])
        .unwrap();
        assert_eq!(skills, vec!["Rust", "Go"]);
    }

    #[test]
    fn skills_enforce_limits() {
        let too_long = "x".repeat(MAX_SKILL_CHARS + 1);
        assert!(normalize_skills(vec![too_long]).is_err());

        let many: Vec<String> = (0..=MAX_SKILLS).map(|i| format!("skill-{i}")).collect();
        let err = normalize_skills(many).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ValidationError));

        // Duplicates do not count towards the limit.
        let mut dupes: Vec<String> = (0..MAX_SKILLS).map(|i| format!("skill-{i}")).collect();
        dupes.push("SKILL-0".into());
        assert_eq!(normalize_skills(dupes).unwrap().len(), MAX_SKILLS);
    }

    #[test]
    fn blank_text_becomes_null() {
        assert_eq!(normalize_text(Some("   ".into())), None);
        assert_eq!(normalize_text(Some(" Paris ".into())), Some("Paris".into()));
        assert_eq!(normalize_text(None), None);
    }

    #[test]
    fn goal_parsing_maps_to_invalid_goal() {
        assert_eq!(parse_goal("Investing").unwrap(), Goal::Investing);
        assert_eq!(parse_goal("dating").unwrap_err().code(), Some(ErrorCode::InvalidGoal));
    }

    #[test]
    fn links_can_be_kept_cleared_or_set() {
        assert_eq!(resolve_link("github_url", None).unwrap(), None);
        assert_eq!(resolve_link("github_url", Some("  ".into())).unwrap(), Some(None));
        assert_eq!(
            resolve_link("github_url", Some("https://github.com/ada".into())).unwrap(),
            Some(Some("https://github.com/ada".into()))
        );
        assert!(resolve_link("github_url", Some("github.com/ada".into())).is_err());
        assert!(resolve_link("github_url", Some("ftp://example.com".into())).is_err());
    }

    #[test]
    fn steps_only_move_forward() {
        assert_eq!(advance_step(0, 1), 1);
        assert_eq!(advance_step(2, 1), 2);
        assert_eq!(advance_step(1, 2), 2);
        assert_eq!(advance_step(3, 7), FINAL_STEP);
    }

    #[test]
    fn completeness_needs_name_and_goal() {
        assert_eq!(
            check_completeness(&profile(Some("Ada"), Some("searching"))).unwrap(),
            Goal::Searching
        );
        assert_eq!(
            check_completeness(&profile(Some("  "), Some("searching"))).unwrap_err().code(),
            Some(ErrorCode::OnboardingIncomplete)
        );
        assert_eq!(
            check_completeness(&profile(Some("Ada"), None)).unwrap_err().code(),
            Some(ErrorCode::OnboardingIncomplete)
        );
    }
}
