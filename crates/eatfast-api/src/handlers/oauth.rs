//! Google sign-in handlers.

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use tracing::debug;

use crate::dto::request::{GoogleCallbackRequest, GoogleLinkRequest};
use crate::dto::response::{GoogleCallbackResponse, GoogleInitResponse, LinkResponse, RoleResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ClientContext, MaybeAuthUser, ValidatedJson};
use crate::handlers::auth::session_cookie;
use crate::state::AppState;

/// GET /api/auth/google/init
///
/// Signed-in callers use the same state for linking.
pub async fn init(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    ClientContext(ctx): ClientContext,
) -> ApiResult<Json<GoogleInitResponse>> {
    let outcome = state.oauth()?.initiate(&ctx).await?;
    if let Some(principal) = caller {
        debug!(account_id = %principal.account_id, "Google flow started by a signed-in account");
    }

    Ok(Json(GoogleInitResponse {
        auth_url: outcome.auth_url,
        state: outcome.state,
    }))
}

/// GET /api/auth/google/roles
pub async fn roles(State(state): State<AppState>) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state.oauth()?.available_roles().await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// POST /api/auth/google/callback
pub async fn callback(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<GoogleCallbackRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .oauth()?
        .complete_callback(&req.code, &req.state, req.role.as_deref())
        .await?;
    let cookie = session_cookie(&state, &outcome.tokens.refresh_token)?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(GoogleCallbackResponse {
            user: outcome.account,
            access_token: outcome.tokens.access_token,
            redirect_url: outcome.redirect_url,
            is_new_user: outcome.is_new_user,
        }),
    ))
}

/// POST /api/auth/google/link
pub async fn link(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<GoogleLinkRequest>,
) -> ApiResult<Json<LinkResponse>> {
    let user = state
        .oauth()?
        .link_account(auth.account_id, &req.code, &req.state)
        .await?;

    Ok(Json(LinkResponse {
        user,
        message: "Google account linked".to_string(),
    }))
}

/// DELETE /api/auth/google/unlink
pub async fn unlink(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<LinkResponse>> {
    let user = state.oauth()?.unlink_account(auth.account_id).await?;

    Ok(Json(LinkResponse {
        user,
        message: "Google account unlinked".to_string(),
    }))
}
