use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E2xxx: Profile errors
/// - E3xxx: Matching errors
/// - E4xxx: Messaging errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    ServiceUnavailable,
    BadRequest,
    TokenExpired,
    TokenInvalid,

    // Profile (E2xxx)
    ProfileNotFound,
    OnboardingIncomplete,
    InvalidGoal,

    // Matching (E3xxx)
    CannotSwipeSelf,
    AlreadyMatched,
    MatchNotFound,
    NotInMatch,
    LikeRequestNotFound,
    InvalidAction,

    // Messaging (E4xxx)
    ConversationNotFound,
    NotConversationMember,
    MatchInactive,
    MessageTooLong,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::RateLimited => "E0006",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",
            Self::TokenExpired => "E0009",
            Self::TokenInvalid => "E0010",

            // Profile
            Self::ProfileNotFound => "E2001",
            Self::OnboardingIncomplete => "E2002",
            Self::InvalidGoal => "E2003",

            // Matching
            Self::CannotSwipeSelf => "E3001",
            Self::AlreadyMatched => "E3002",
            Self::MatchNotFound => "E3003",
            Self::NotInMatch => "E3004",
            Self::LikeRequestNotFound => "E3005",
            Self::InvalidAction => "E3006",

            // Messaging
            Self::ConversationNotFound => "E4001",
            Self::NotConversationMember => "E4002",
            Self::MatchInactive => "E4003",
            Self::MessageTooLong => "E4004",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::InvalidGoal
            | Self::InvalidAction | Self::MessageTooLong => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::ProfileNotFound | Self::MatchNotFound
            | Self::LikeRequestNotFound | Self::ConversationNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::OnboardingIncomplete | Self::CannotSwipeSelf
            | Self::NotInMatch | Self::NotConversationMember => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::AlreadyMatched | Self::MatchInactive => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The error code carried by this error, if it is a known one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Known { code, .. } => Some(*code),
            Self::Validation(_) => Some(ErrorCode::ValidationError),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let all = [
            ErrorCode::InternalError,
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::Unauthorized,
            ErrorCode::Forbidden,
            ErrorCode::RateLimited,
            ErrorCode::ServiceUnavailable,
            ErrorCode::BadRequest,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::ProfileNotFound,
            ErrorCode::OnboardingIncomplete,
            ErrorCode::InvalidGoal,
            ErrorCode::CannotSwipeSelf,
            ErrorCode::AlreadyMatched,
            ErrorCode::MatchNotFound,
            ErrorCode::NotInMatch,
            ErrorCode::LikeRequestNotFound,
            ErrorCode::InvalidAction,
            ErrorCode::ConversationNotFound,
            ErrorCode::NotConversationMember,
            ErrorCode::MatchInactive,
            ErrorCode::MessageTooLong,
        ];
        let mut codes: Vec<&str> = all.iter().map(|c| c.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn matching_errors_map_to_expected_status() {
        assert_eq!(ErrorCode::AlreadyMatched.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::NotInMatch.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::LikeRequestNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::CannotSwipeSelf.code(), "E3001");
    }

    #[test]
    fn known_error_renders_with_its_status() {
        let resp = AppError::new(ErrorCode::MatchNotFound, "match not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AppError::Validation("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::Database(diesel::result::Error::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn code_accessor() {
        assert_eq!(
            AppError::new(ErrorCode::AlreadyMatched, "x").code(),
            Some(ErrorCode::AlreadyMatched)
        );
        assert_eq!(AppError::Validation("x".into()).code(), Some(ErrorCode::ValidationError));
        assert_eq!(AppError::internal("x").code(), Some(ErrorCode::InternalError));
        assert_eq!(AppError::Internal(anyhow::anyhow!("boom")).code(), None);
    }
}
