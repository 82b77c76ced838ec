// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: HashMap<String, String>,
    },
    Duplicate {
        message: String,
        field: Option<String>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

/// Structured error body returned on every failure path.
///
/// `path` is filled in by the response middleware, which is the only
/// place that still knows the request URI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, String>>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Duplicate { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Short error category for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Duplicate { .. } => "DUPLICATE_RESOURCE",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let field_errors = match self {
            ApiError::ValidationError { field_errors, .. } => Some(field_errors.clone()),
            ApiError::Duplicate {
                message,
                field: Some(field),
            } => {
                let mut errors = HashMap::new();
                errors.insert(field.clone(), message.clone());
                Some(errors)
            }
            _ => None,
        };

        ErrorBody {
            timestamp: Utc::now(),
            status: self.status_code().as_u16(),
            error: self.error_code(),
            message: self.message().to_string(),
            path: None,
            field_errors,
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn duplicate(message: impl Into<String>, field: impl Into<String>) -> Self {
        ApiError::Duplicate {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert domain error types to ApiError
impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        use crate::database::DatabaseError;
        match err {
            DatabaseError::ConfigMissing(key) => {
                tracing::error!("Missing configuration: {}", key);
                ApiError::internal_server_error("Server is misconfigured")
            }
            DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("DATABASE_URL could not be parsed");
                ApiError::internal_server_error("Server is misconfigured")
            }
            DatabaseError::InvalidDatabaseName(name) => {
                ApiError::bad_request(format!("Invalid database name: {}", name))
            }
            DatabaseError::TenantConfigNotFound(db_name) => {
                ApiError::not_found(format!("No database configuration for '{}'", db_name))
            }
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::tenancy::OnboardingError> for ApiError {
    fn from(err: crate::tenancy::OnboardingError) -> Self {
        use crate::tenancy::OnboardingError;
        match err {
            OnboardingError::Duplicate { message, field } => ApiError::Duplicate {
                message,
                field: Some(field),
            },
            OnboardingError::InvalidCompanyCode(msg) => ApiError::bad_request(msg),
            OnboardingError::StepTimeout { step } => {
                tracing::error!("Onboarding step timed out: {}", step);
                ApiError::internal_server_error(format!(
                    "Tenant provisioning timed out during step '{}'",
                    step
                ))
            }
            OnboardingError::Step { step, source } => {
                tracing::error!("Onboarding step '{}' failed: {}", step, source);
                ApiError::internal_server_error("Tenant provisioning failed")
            }
            OnboardingError::PasswordHash(err) => {
                tracing::error!("Password hashing failed: {}", err);
                ApiError::internal_server_error("Tenant provisioning failed")
            }
        }
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        tracing::error!("JWT error: {}", err);
        ApiError::internal_server_error("Failed to issue token")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = self.to_body();
        let mut response = (self.status_code(), Json(&body)).into_response();
        // Stashed for the response middleware, which rewrites the body
        // with the request path attached.
        response.extensions_mut().insert(body);
        response
    }
}
