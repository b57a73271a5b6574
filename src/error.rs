// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// API error with appropriate status codes and client-friendly messages.
///
/// The `message` field of the response envelope is derived from the status
/// category; the carried string is the specific `details` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400
    BadRequest(String),
    // 401
    Unauthorized(String),
    // 403
    Forbidden(String),
    // 404
    NotFound(String),
    // 409
    Conflict(String),
    // 500
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }

    /// Category string driven by the HTTP status
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "Bad Request",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::NotFound(_) => "Not Found",
            ApiError::Conflict(_) => "Conflict",
            ApiError::Internal(_) => "Internal Server Error",
        }
    }

    pub fn details(&self) -> &str {
        match self {
            ApiError::BadRequest(d)
            | ApiError::Unauthorized(d)
            | ApiError::Forbidden(d)
            | ApiError::NotFound(d)
            | ApiError::Conflict(d)
            | ApiError::Internal(d) => d,
        }
    }

    /// Convert to the JSON error envelope
    pub fn to_json(&self) -> Value {
        json!({
            "message": self.message(),
            "details": self.details(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(details: impl Into<String>) -> Self {
        ApiError::BadRequest(details.into())
    }

    pub fn unauthorized(details: impl Into<String>) -> Self {
        ApiError::Unauthorized(details.into())
    }

    pub fn forbidden(details: impl Into<String>) -> Self {
        ApiError::Forbidden(details.into())
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        ApiError::NotFound(details.into())
    }

    pub fn conflict(details: impl Into<String>) -> Self {
        ApiError::Conflict(details.into())
    }

    pub fn internal(details: impl Into<String>) -> Self {
        ApiError::Internal(details.into())
    }
}

// Convert infrastructure error types to ApiError. Internal failures are
// logged and flattened to a generic 500 without a curated details message.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("SQLx error: {}", err);
        ApiError::internal("An unexpected error occurred")
    }
}

impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        tracing::error!("Database error: {}", err);
        ApiError::internal("An unexpected error occurred")
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        tracing::error!("bcrypt error: {}", err);
        ApiError::internal("An unexpected error occurred")
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        tracing::error!("JWT error: {}", err);
        ApiError::internal("An unexpected error occurred")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.message(), self.details())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_category_and_details() {
        let err = ApiError::conflict("Plot name already exists");
        assert_eq!(err.status_code(), 409);
        assert_eq!(
            err.to_json(),
            json!({"message": "Conflict", "details": "Plot name already exists"})
        );
    }

    #[test]
    fn message_tracks_status() {
        assert_eq!(ApiError::bad_request("x").message(), "Bad Request");
        assert_eq!(ApiError::not_found("x").message(), "Not Found");
        assert_eq!(ApiError::forbidden("x").message(), "Forbidden");
    }
}
