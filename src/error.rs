// HTTP API Error Types
use axum::response::IntoResponse;
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::auth::identity::IdentityError;
use crate::auth::JwtError;
use crate::database::StoreError;
use crate::middleware::response::ApiResponse;
use crate::validation::ValidationError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<BTreeMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({ "message": message });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => json!({ "message": self.message() }),
        }
    }

    /// Get error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
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
        field_errors: Option<BTreeMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
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

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PreconditionFailed { id, existed } => {
                tracing::warn!("Ownership check failed for item {} (existed: {})", id, existed);
                ApiError::forbidden("Forbidden")
            }
            StoreError::Unavailable(msg) => {
                // Don't expose backend errors to clients
                tracing::error!("Item store error: {}", msg);
                ApiError::internal_server_error("Internal Server Error")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let field_errors = if err.field_errors.is_empty() {
            None
        } else {
            Some(err.field_errors)
        };
        ApiError::validation_error(err.message, field_errors)
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        tracing::debug!("Identity extraction failed: {}", err);
        ApiError::unauthorized("Unauthorized")
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken(msg) => ApiError::unauthorized(format!("Invalid token: {}", msg)),
            other => {
                tracing::error!("Token error: {}", other);
                ApiError::internal_server_error("Internal Server Error")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::debug!(code = err.error_code(), status = status.as_u16(), "Request rejected: {}", err.message());
        ApiResponse::json(status, err.to_json())
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        ApiResponse::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(ApiError::unauthorized("x").status_code(), 401);
        assert_eq!(ApiError::bad_request("x").status_code(), 400);
        assert_eq!(ApiError::validation_error("x", None).status_code(), 400);
        assert_eq!(ApiError::forbidden("x").status_code(), 403);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::internal_server_error("x").status_code(), 500);
        assert_eq!(ApiError::service_unavailable("x").status_code(), 503);
    }

    #[test]
    fn error_codes_follow_variants() {
        assert_eq!(ApiError::forbidden("x").error_code(), "FORBIDDEN");
        assert_eq!(ApiError::service_unavailable("x").error_code(), "SERVICE_UNAVAILABLE");

        let response = ApiResponse::from(ApiError::service_unavailable("Storage unavailable"));
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body, json!({ "message": "Storage unavailable" }));
    }

    #[test]
    fn store_errors_never_leak_details() {
        let err: ApiError = StoreError::Unavailable("connection refused at 10.0.0.1".to_string()).into();
        assert_eq!(err, ApiError::internal_server_error("Internal Server Error"));

        let err: ApiError = StoreError::PreconditionFailed {
            id: "a".to_string(),
            existed: false,
        }
        .into();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn validation_body_includes_field_errors() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), "This field is required".to_string());
        let body = ApiError::validation_error("Invalid request body", Some(fields)).to_json();
        assert_eq!(body["message"], json!("Invalid request body"));
        assert_eq!(body["field_errors"]["name"], json!("This field is required"));
    }

    #[test]
    fn plain_errors_have_message_only() {
        let body = ApiError::not_found("Item not found").to_json();
        assert_eq!(body, json!({ "message": "Item not found" }));
    }
}
