use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    /// Builds a check from the outcome of probing a dependency.
    pub fn from_result<E: std::fmt::Display>(name: impl Into<String>, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                name: name.into(),
                status: HealthStatus::Healthy,
                message: None,
            },
            Err(e) => Self {
                name: name.into(),
                status: HealthStatus::Unhealthy,
                message: Some(e.to_string()),
            },
        }
    }
}

impl HealthResponse {
    pub fn healthy(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            service: service.into(),
            version: version.into(),
            checks: None,
        }
    }

    pub fn with_checks(mut self, checks: Vec<HealthCheck>) -> Self {
        let has_unhealthy = checks.iter().any(|c| c.status == HealthStatus::Unhealthy);
        let has_degraded = checks.iter().any(|c| c.status == HealthStatus::Degraded);

        self.status = if has_unhealthy {
            HealthStatus::Unhealthy
        } else if has_degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };
        self.checks = Some(checks);
        self
    }

    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_failed_dependency_makes_service_unhealthy() {
        let resp = HealthResponse::healthy("linkup-matching", "0.1.0").with_checks(vec![
            HealthCheck::from_result::<String>("database", Ok(())),
            HealthCheck::from_result("redis", Err("connection refused")),
        ]);
        assert_eq!(resp.status, HealthStatus::Unhealthy);
        assert_eq!(resp.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        let checks = resp.checks.unwrap();
        assert_eq!(checks[1].message.as_deref(), Some("connection refused"));
    }

    #[test]
    fn all_passing_checks_keep_service_healthy() {
        let resp = HealthResponse::healthy("linkup-profile", "0.1.0")
            .with_checks(vec![HealthCheck::from_result::<String>("database", Ok(()))]);
        assert_eq!(resp.status, HealthStatus::Healthy);
        assert_eq!(resp.http_status(), StatusCode::OK);
    }

    #[test]
    fn error_envelope_serializes_without_empty_details() {
        let json = serde_json::to_value(ApiErrorResponse::new("E3002", "already matched")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "E3002");
        assert!(json["error"].get("details").is_none());
    }
}
