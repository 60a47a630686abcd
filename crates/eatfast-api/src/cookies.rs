//! The refresh-token cookie.

use axum::http::HeaderValue;
use axum_extra::extract::CookieJar;
use chrono::Duration;

use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;

/// Name of the cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// `Set-Cookie` value storing `token` for `max_age`.
///
/// The cookie is `HttpOnly` and `SameSite=Strict`, and `Secure` in production.
pub fn refresh_cookie(token: &str, max_age: Duration, secure: bool) -> AppResult<HeaderValue> {
    build(token, max_age.num_seconds().max(0), secure)
}

/// `Set-Cookie` value that removes the refresh token.
pub fn clear_refresh_cookie(secure: bool) -> AppResult<HeaderValue> {
    build("", 0, secure)
}

/// Refresh token sent by the browser, if any.
pub fn refresh_token_from(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn build(value: &str, max_age_secs: i64, secure: bool) -> AppResult<HeaderValue> {
    let mut cookie =
        format!("{REFRESH_COOKIE}={value}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal(format!("Invalid refresh cookie: {e}")))
}
