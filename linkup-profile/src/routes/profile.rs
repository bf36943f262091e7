use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use linkup_shared::clients::db;
use linkup_shared::errors::{AppError, AppResult, ErrorCode};
use linkup_shared::types::auth::AuthUser;
use linkup_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{
    EducationEntry, ExperienceEntry, PersonalChanges, ProfessionalChanges, Profile, SocialChanges,
};
use crate::services::profile_service::{self, MAX_EDUCATION, MAX_EXPERIENCE};
use crate::AppState;

fn validate<T: Validate>(req: &T) -> AppResult<()> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::internal(e.to_string()))
}

// --- POST /me ---

pub async fn create_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<(StatusCode, Json<ApiResponse<Profile>>)> {
    let mut conn = db::conn(&state.db)?;
    let (profile, created) = profile_service::create_profile(&mut conn, user.id)?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(ApiResponse::ok(profile))))
}

// --- GET /me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = db::conn(&state.db)?;
    let profile = profile_service::require_by_user(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- GET /profiles/:id --- (by profile id or user id)

pub async fn get_public_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = db::conn(&state.db)?;
    let profile = profile_service::find_public(&mut conn, id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PUT /me/personal ---

#[derive(Debug, Deserialize, Validate)]
pub struct PersonalInfoRequest {
    #[validate(length(min = 1, max = 80, message = "full_name must be 1-80 characters"))]
    pub full_name: String,
    #[validate(length(max = 120, message = "headline must be at most 120 characters"))]
    pub headline: Option<String>,
    #[validate(length(max = 1000, message = "bio must be at most 1000 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 120, message = "location must be at most 120 characters"))]
    pub location: Option<String>,
    #[validate(url(message = "avatar_url must be a valid URL"))]
    pub avatar_url: Option<String>,
}

impl PersonalInfoRequest {
    fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            headline: profile_service::normalize_text(self.headline),
            bio: profile_service::normalize_text(self.bio),
            location: profile_service::normalize_text(self.location),
            avatar_url: profile_service::normalize_text(self.avatar_url),
        }
    }
}

pub async fn update_personal(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PersonalInfoRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let req = req.normalized();
    validate(&req)?;

    let changes = PersonalChanges {
        full_name: Some(req.full_name),
        headline: req.headline,
        bio: req.bio,
        location: req.location,
        avatar_url: req.avatar_url,
        onboarding_step: 1,
    };

    let mut conn = db::conn(&state.db)?;
    let updated = profile_service::update_personal(&mut conn, user.id, changes)?;

    publisher::publish_profile_updated(&state.rabbitmq, &updated).await;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- PUT /me/professional ---

#[derive(Debug, Deserialize, Validate)]
pub struct ProfessionalRequest {
    pub goal: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    #[validate]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    #[validate]
    pub education: Vec<EducationEntry>,
}

pub async fn update_professional(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfessionalRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let goal = profile_service::parse_goal(&req.goal)?;
    let skills = profile_service::normalize_skills(req.skills.clone())?;

    if req.experience.len() > MAX_EXPERIENCE {
        return Err(AppError::Validation(format!(
            "at most {MAX_EXPERIENCE} experience entries are allowed"
        )));
    }
    if req.education.len() > MAX_EDUCATION {
        return Err(AppError::Validation(format!(
            "at most {MAX_EDUCATION} education entries are allowed"
        )));
    }
    validate(&req)?;

    let changes = ProfessionalChanges {
        goal: goal.as_str().to_string(),
        skills: to_json(&skills)?,
        experience: to_json(&req.experience)?,
        education: to_json(&req.education)?,
        onboarding_step: 2,
    };

    let mut conn = db::conn(&state.db)?;
    let updated = profile_service::update_professional(&mut conn, user.id, changes)?;

    publisher::publish_profile_updated(&state.rabbitmq, &updated).await;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- PUT /me/social ---

#[derive(Debug, Deserialize)]
pub struct SocialLinksRequest {
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub website_url: Option<String>,
}

pub async fn update_social(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SocialLinksRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let changes = SocialChanges {
        github_url: profile_service::resolve_link("github_url", req.github_url)?,
        linkedin_url: profile_service::resolve_link("linkedin_url", req.linkedin_url)?,
        twitter_url: profile_service::resolve_link("twitter_url", req.twitter_url)?,
        website_url: profile_service::resolve_link("website_url", req.website_url)?,
        onboarding_step: None,
    };

    let mut conn = db::conn(&state.db)?;
    let updated = profile_service::update_social(&mut conn, user.id, changes)?;

    publisher::publish_profile_updated(&state.rabbitmq, &updated).await;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- POST /me/complete ---

pub async fn complete_onboarding(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = db::conn(&state.db)?;
    let (profile, completed_now) = profile_service::complete_onboarding(&mut conn, user.id)?;

    if completed_now {
        publisher::publish_onboarding_completed(&state.rabbitmq, &profile).await;
    }

    Ok(Json(ApiResponse::ok(profile)))
}
