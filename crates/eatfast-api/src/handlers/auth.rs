//! Password sign-in handlers: registration, login with a second factor,
//! token refresh, logout, password reset and the current profile.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum_extra::extract::CookieJar;
use tracing::debug;

use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;

use crate::cookies::{clear_refresh_cookie, refresh_cookie, refresh_token_from};
use crate::dto::request::{
    ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterRequest, ResendTwoFactorRequest,
    ResetPasswordRequest, VerifyTwoFactorRequest,
};
use crate::dto::response::{
    LoginResponse, MessageResponse, ProfileResponse, RefreshResponse, RegisterResponse,
    SessionResponse,
};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ClientContext, ValidatedJson};
use crate::state::AppState;

/// `Set-Cookie` value carrying a fresh refresh token.
pub(crate) fn session_cookie(state: &AppState, refresh_token: &str) -> AppResult<HeaderValue> {
    refresh_cookie(
        refresh_token,
        state.issuer.refresh_ttl(),
        state.config.server.environment.is_production(),
    )
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.password_auth.register(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            account_id: outcome.account_id,
            message: "Account created. Check your email for the verification code.".to_string(),
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientContext(ctx): ClientContext,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let outcome = state
        .password_auth
        .login(&ctx, &req.email, &req.password)
        .await?;

    Ok(Json(LoginResponse {
        account_id: outcome.account_id,
        requires_two_factor: outcome.requires_two_factor,
        message: "A verification code has been sent to your email.".to_string(),
    }))
}

/// POST /api/auth/verify-2fa
pub async fn verify_two_factor(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyTwoFactorRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .password_auth
        .verify_two_factor(req.account_id, &req.code)
        .await?;
    let cookie = session_cookie(&state, &session.tokens.refresh_token)?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SessionResponse {
            user: session.account,
            access_token: session.tokens.access_token,
            message: "Signed in".to_string(),
        }),
    ))
}

/// POST /api/auth/resend-2fa
pub async fn resend_two_factor(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResendTwoFactorRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.password_auth.resend_two_factor(req.account_id).await?;
    Ok(Json(MessageResponse::new(
        "A new verification code has been sent to your email.",
    )))
}

/// POST /api/auth/refresh
///
/// Reads the refresh token from the cookie, falling back to a
/// `refreshToken` body field.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let token = match refresh_token_from(&jar) {
        Some(token) => token,
        None => {
            debug!("No refresh cookie, reading request body");
            refresh_token_from_body(&body)?
                .ok_or_else(|| AppError::unauthenticated("Refresh token required"))?
        }
    };

    let session = state.password_auth.refresh(&token).await?;
    let cookie = session_cookie(&state, &session.tokens.refresh_token)?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(RefreshResponse {
            access_token: session.tokens.access_token,
        }),
    ))
}

fn refresh_token_from_body(body: &[u8]) -> AppResult<Option<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let req: RefreshRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;
    Ok(req.refresh_token.filter(|t| !t.is_empty()))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    state.password_auth.logout(auth.account_id).await;
    let cookie = clear_refresh_cookie(state.config.server.environment.is_production())?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(MessageResponse::new("Logged out")),
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state.password_auth.profile(auth.account_id).await?;
    Ok(Json(ProfileResponse { user }))
}

/// POST /api/auth/forgot-password
///
/// Answers the same way whether or not the email is registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Json<MessageResponse> {
    state.password_auth.forgot_password(&req.email).await;
    Json(MessageResponse::new(
        "If an account exists for this email, a reset link has been sent.",
    ))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .password_auth
        .reset_password(&req.token, &req.password)
        .await?;
    Ok(Json(MessageResponse::new(
        "Password updated. You can now sign in.",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eatfast_core::error::ErrorKind;

    #[test]
    fn test_refresh_body_is_optional() {
        assert_eq!(refresh_token_from_body(b"").unwrap(), None);
        assert_eq!(refresh_token_from_body(b"  \n").unwrap(), None);
        assert_eq!(refresh_token_from_body(b"{}").unwrap(), None);
        assert_eq!(
            refresh_token_from_body(br#"{"refreshToken":"abc"}"#).unwrap(),
            Some("abc".to_string())
        );
        assert_eq!(
            refresh_token_from_body(br#"{"refresh_token":"abc"}"#).unwrap(),
            Some("abc".to_string())
        );

        let err = refresh_token_from_body(br#"{"token":"abc"}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
