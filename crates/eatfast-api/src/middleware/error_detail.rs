//! Reveals masked internal error messages outside production.

use axum::Json;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::{ApiErrorResponse, InternalErrorDetail};

/// Replaces the generic internal-error body with the underlying message.
///
/// Mounted only when the environment exposes internal errors.
pub async fn expose_internal_errors(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let Some(InternalErrorDetail(detail)) = response.extensions_mut().remove::<InternalErrorDetail>()
    else {
        return response;
    };

    let body = ApiErrorResponse {
        error: detail,
        code: "INTERNAL_ERROR".to_string(),
        details: None,
    };
    (response.status(), Json(body)).into_response()
}
