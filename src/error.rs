//! Two-channel error model: expected business failures travel as
//! [`ServiceError`] values through the service layer, infrastructure faults
//! propagate and are normalized into one JSON envelope at the HTTP edge.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::{models::LogLevel, storage::StorageError},
    services::logger_service,
    state::SharedState,
};

/// Errors that can occur in service layer operations.
///
/// Every variant except [`ServiceError::Unavailable`], [`ServiceError::Degraded`]
/// and [`ServiceError::Internal`] is an expected business outcome: callers
/// branch on it, they do not treat it as a fault.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A unique constraint was violated (email, nickname, token).
    #[error("already exists: {0}")]
    Duplicate(String),
    /// Caller is not authenticated or presented an invalid token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Caller is authenticated but not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Unexpected fault (signing failure, serialization bug, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate { field } => {
                ServiceError::Duplicate(format!("duplicate value for `{field}`"))
            }
            other => ServiceError::Unavailable(other),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated but not permitted.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Too many requests within the throttle window.
    #[error("too many requests")]
    TooManyRequests,
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Duplicate(message) => AppError::Conflict(message),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {err}"))
    }
}

impl AppError {
    /// HTTP status code the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to expose to clients.
    ///
    /// Business failures carry their own message; infrastructure faults are
    /// replaced with a generic one so store/library internals never leak.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ServiceUnavailable(_) | AppError::Internal(_) => {
                "Something went wrong, please try again later".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Severity used when the failure is forwarded to the logs queue.
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::ServiceUnavailable(_) | AppError::Internal(_) => LogLevel::Critical,
            AppError::Unauthorized(_) | AppError::Forbidden(_) | AppError::TooManyRequests => {
                LogLevel::Warn
            }
            _ => LogLevel::Info,
        }
    }
}

/// Error details attached to the response so [`error_envelope`] can rebuild
/// the body with request metadata.
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    /// HTTP status code of the failure.
    pub status: StatusCode,
    /// Client-facing message.
    pub message: String,
    /// Internal message forwarded to the logs queue.
    pub internal_message: String,
    /// Severity for the logs queue.
    pub level: LogLevel,
}

/// Uniform JSON error envelope returned by the HTTP edge.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// HTTP status code of the failure.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// RFC 3339 timestamp of when the failure was rendered.
    pub timestamp: String,
    /// Client-facing message.
    pub message: String,
    /// Request path that produced the failure.
    pub path: String,
    /// Request method that produced the failure.
    pub method: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = ErrorDetails {
            status: self.status_code(),
            message: self.public_message(),
            internal_message: self.to_string(),
            level: self.log_level(),
        };

        let envelope = ErrorEnvelope {
            status_code: details.status.as_u16(),
            timestamp: crate::dto::rfc3339_now(),
            message: details.message.clone(),
            path: String::new(),
            method: String::new(),
        };

        let mut response = (details.status, Json(envelope)).into_response();
        response.extensions_mut().insert(details);
        response
    }
}

/// Normalize every error response into the shared envelope, filling in the
/// request path and method, and forward the failure to the logs queue.
pub async fn error_envelope(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().to_string();
    let identity = request
        .extensions()
        .get::<crate::auth::identity::Identity>()
        .cloned();

    let response = next.run(request).await;
    let Some(details) = response.extensions().get::<ErrorDetails>().cloned() else {
        return response;
    };

    logger_service::emit_request_failure(&state, &details, &path, &method, identity.as_ref());

    let envelope = ErrorEnvelope {
        status_code: details.status.as_u16(),
        timestamp: crate::dto::rfc3339_now(),
        message: details.message,
        path,
        method,
    };

    (details.status, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_expected_status_codes() {
        let cases = [
            (
                ServiceError::InvalidInput("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Duplicate("x".into()), StatusCode::CONFLICT),
            (
                ServiceError::Unauthorized("x".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ServiceError::InvalidState("x".into()), StatusCode::CONFLICT),
            (ServiceError::Degraded, StatusCode::SERVICE_UNAVAILABLE),
            (
                ServiceError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn infrastructure_messages_never_leak() {
        let err = AppError::Internal("mongo driver exploded at 0xdead".into());
        assert_eq!(
            err.public_message(),
            "Something went wrong, please try again later"
        );

        let business = AppError::Conflict("a user with this email already exists".into());
        assert!(business.public_message().contains("already exists"));
    }

    #[test]
    fn duplicate_storage_error_becomes_business_failure() {
        let err = ServiceError::from(StorageError::Duplicate { field: "email" });
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }
}
