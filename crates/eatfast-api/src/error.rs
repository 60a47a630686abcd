//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use eatfast_core::error::{AppError, ErrorKind};

/// Message shown to clients in place of infrastructure failures.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Detailed message of a masked internal error, kept in the response
/// extensions so development builds can reveal it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation
        | ErrorKind::DuplicateAccount
        | ErrorKind::InvalidCode
        | ErrorKind::InvalidResetToken
        | ErrorKind::InvalidOrExpiredState
        | ErrorKind::AccountAlreadyLinked
        | ErrorKind::LastCredential
        | ErrorKind::InvalidRole => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidCredentials
        | ErrorKind::AccountLocked
        | ErrorKind::AccountInactive
        | ErrorKind::Unauthenticated
        | ErrorKind::TokenExpired
        | ErrorKind::TokenInvalid => StatusCode::UNAUTHORIZED,
        ErrorKind::InsufficientPermissions | ErrorKind::ResourceAccessDenied => {
            StatusCode::FORBIDDEN
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::OAuthVerificationFailed
        | ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Cache
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::ExternalService => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);

        if err.kind.is_internal() {
            tracing::error!(code = err.kind.code(), error = %err, "Internal server error");
            let body = ApiErrorResponse {
                error: INTERNAL_MESSAGE.to_string(),
                code: err.kind.code().to_string(),
                details: None,
            };
            let mut response = (status, Json(body)).into_response();
            response
                .extensions_mut()
                .insert(InternalErrorDetail(err.message));
            return response;
        }

        if status.is_server_error() {
            tracing::error!(code = err.kind.code(), error = %err, "Upstream failure");
        }

        let body = ApiErrorResponse {
            error: err.message,
            code: err.kind.code().to_string(),
            details: err.details,
        };
        (status, Json(body)).into_response()
    }
}
