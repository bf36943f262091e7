use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, ErrorCode};

/// Role claim as issued by the hosted identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Authenticated,
    ServiceRole,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Authenticated => write!(f, "authenticated"),
            UserRole::ServiceRole => write!(f, "service_role"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "authenticated" => Ok(UserRole::Authenticated),
            "service_role" => Ok(UserRole::ServiceRole),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid, role: UserRole, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            role,
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::now_v7(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn is_service(&self) -> bool {
        self.role == UserRole::ServiceRole
    }

    /// Signs the claims as an HS256 token. Used by dev tooling and tests.
    pub fn encode(&self, secret: &str) -> Result<String, AppError> {
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("failed to sign token: {e}")))
    }

    /// Verifies an HS256 token and returns its claims.
    pub fn decode(token: &str, secret: &str) -> Result<Self, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::new(ErrorCode::TokenExpired, "token has expired")
            }
            _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
        })?;

        if token_data.claims.is_expired() {
            return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
        }

        Ok(token_data.claims)
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
    pub token_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            token_id: claims.jti,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_through_signature() {
        let user_id = Uuid::new_v4();
        let token = Claims::new(user_id, UserRole::Authenticated, 3600)
            .encode(SECRET)
            .unwrap();
        let claims = Claims::decode(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(!claims.is_service());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = Claims::new(Uuid::new_v4(), UserRole::Authenticated, 3600)
            .encode(SECRET)
            .unwrap();
        let err = Claims::decode(&token, "other").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TokenInvalid));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = Claims::new(Uuid::new_v4(), UserRole::Authenticated, -3600)
            .encode(SECRET)
            .unwrap();
        let err = Claims::decode(&token, SECRET).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TokenExpired));
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("SERVICE_ROLE".parse::<UserRole>().unwrap(), UserRole::ServiceRole);
        assert!("admin".parse::<UserRole>().is_err());
    }
}
