//! Integration tests for the password sign-in flow.

use std::net::SocketAddr;

use chrono::Duration;
use http::StatusCode;
use serde_json::json;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["cache"], "connected");
}

#[tokio::test]
async fn test_register_then_verify_signs_in() {
    let app = TestApp::new();
    let account_id = app.register("amina@example.com").await;

    let response = app.verify(&account_id, "amina@example.com").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["accessToken"].as_str().is_some());
    assert!(response.body.get("refreshToken").is_none());
    assert_eq!(response.body["user"]["email"], "amina@example.com");
    assert_eq!(response.body["user"]["role"], "customer");
    assert_eq!(response.body["user"]["status"], "active");
    assert!(response.body["user"].get("passwordHash").is_none());

    let cookie = response.set_cookie.expect("refresh cookie");
    assert!(cookie.starts_with("refreshToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
}

#[tokio::test]
async fn test_register_with_self_service_role_alias() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "kitchen@example.com",
                "password": PASSWORD,
                "first_name": "Tunde",
                "last_name": "Bakare",
                "role": "restaurant",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let account_id = response.body["accountId"].as_str().unwrap().to_string();
    let session = app.verify(&account_id, "kitchen@example.com").await;
    assert_eq!(session.body["user"]["role"], "restaurant_owner");
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let app = TestApp::new();
    app.register("dup@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "DUP@example.com",
                "password": PASSWORD,
                "firstName": "Other",
                "lastName": "Person",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "DUPLICATE_ACCOUNT");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new();

    let unknown_field = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "x@example.com",
                "password": PASSWORD,
                "firstName": "Xavier",
                "lastName": "Mbeki",
                "role_id": 1,
            })),
            None,
        )
        .await;
    assert_eq!(unknown_field.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_field.code(), "VALIDATION_FAILED");

    let bad_phone = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "x@example.com",
                "password": PASSWORD,
                "firstName": "Xavier",
                "lastName": "Mbeki",
                "phone": "call me",
            })),
            None,
        )
        .await;
    assert_eq!(bad_phone.status, StatusCode::BAD_REQUEST);
    assert!(bad_phone.body["details"]["fields"]["phone"].is_array());

    let weak_password = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "x@example.com",
                "password": "alllowercase",
                "firstName": "Xavier",
                "lastName": "Mbeki",
            })),
            None,
        )
        .await;
    assert_eq!(weak_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak_password.code(), "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_login_requires_second_factor() {
    let app = TestApp::new();
    let session = app.signed_in("login@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "login@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["accountId"], session.account_id.as_str());
    assert_eq!(response.body["requiresTwoFactor"], true);
    assert!(response.body.get("accessToken").is_none());

    let verified = app.verify(&session.account_id, "login@example.com").await;
    assert_eq!(verified.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.signed_in("known@example.com").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "known@example.com", "password": "Wrong1!pass" })),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_lockout_after_repeated_failures() {
    let app = TestApp::new();
    app.signed_in("lock@example.com").await;

    for _ in 0..5 {
        let response = app
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "email": "lock@example.com", "password": "Wrong1!pass" })),
                None,
            )
            .await;
        assert_eq!(response.code(), "INVALID_CREDENTIALS");
    }

    let locked = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "lock@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(locked.status, StatusCode::UNAUTHORIZED);
    assert_eq!(locked.code(), "ACCOUNT_LOCKED");

    app.clock.advance(Duration::minutes(16));
    let unlocked = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "lock@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(unlocked.status, StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_code_rejected() {
    let app = TestApp::new();
    let account_id = app.register("code@example.com").await;

    let sent = app.outbox.last_code_for("code@example.com").unwrap();
    let wrong = if sent == "000000" { "111111" } else { "000000" };

    let response = app
        .request(
            "POST",
            "/api/auth/verify-2fa",
            Some(json!({ "accountId": account_id, "code": wrong })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "INVALID_CODE");

    let malformed = app
        .request(
            "POST",
            "/api/auth/verify-2fa",
            Some(json!({ "accountId": account_id, "code": "12ab" })),
            None,
        )
        .await;
    assert_eq!(malformed.code(), "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_resend_issues_new_code() {
    let app = TestApp::new();
    let account_id = app.register("resend@example.com").await;
    let before = app.outbox.sent().len();

    let response = app
        .request(
            "POST",
            "/api/auth/resend-2fa",
            Some(json!({ "accountId": account_id })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.outbox.sent().len(), before + 1);

    let verified = app.verify(&account_id, "resend@example.com").await;
    assert_eq!(verified.status, StatusCode::OK);

    let missing = app
        .request(
            "POST",
            "/api/auth/resend-2fa",
            Some(json!({ "accountId": uuid::Uuid::new_v4() })),
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let app = TestApp::new();
    let session = app.signed_in("me@example.com").await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(&session.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["email"], "me@example.com");
    assert_eq!(response.body["user"]["hasPassword"], true);

    let anonymous = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.code(), "NO_TOKEN");

    let garbage = app
        .request("GET", "/api/auth/me", None, Some("not.a.token"))
        .await;
    assert_eq!(garbage.code(), "INVALID_TOKEN");

    let refresh_as_access = app
        .request(
            "GET",
            "/api/auth/me",
            None,
            Some(session.refresh_cookie.trim_start_matches("refreshToken=")),
        )
        .await;
    assert_eq!(refresh_as_access.code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_expired_access_token_then_refresh() {
    let app = TestApp::new();
    let session = app.signed_in("refresh@example.com").await;

    app.clock.advance(Duration::minutes(16));
    let expired = app
        .request("GET", "/api/auth/me", None, Some(&session.access_token))
        .await;
    assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired.code(), "TOKEN_EXPIRED");

    let refreshed = app
        .request_with_cookie("POST", "/api/auth/refresh", None, &session.refresh_cookie)
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(refreshed.set_cookie.is_some());

    let token = refreshed.body["accessToken"].as_str().unwrap();
    let me = app.request("GET", "/api/auth/me", None, Some(token)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_from_body_and_missing_token() {
    let app = TestApp::new();
    let session = app.signed_in("body@example.com").await;
    let refresh_token = session.refresh_cookie.trim_start_matches("refreshToken=");

    let from_body = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": refresh_token })),
            None,
        )
        .await;
    assert_eq!(from_body.status, StatusCode::OK);

    let missing = app.request("POST", "/api/auth/refresh", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.code(), "NO_TOKEN");

    let access_as_refresh = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": session.access_token })),
            None,
        )
        .await;
    assert_eq!(access_as_refresh.code(), "INVALID_TOKEN");

    app.clock.advance(Duration::days(8));
    let expired = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": refresh_token })),
            None,
        )
        .await;
    assert_eq!(expired.code(), "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new();
    let session = app.signed_in("bye@example.com").await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&session.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.set_cookie.expect("cleared cookie");
    assert!(cookie.starts_with("refreshToken=;"));
    assert!(cookie.contains("Max-Age=0"));

    let anonymous = app.request("POST", "/api/auth/logout", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();
    app.signed_in("forgot@example.com").await;

    let unknown = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(json!({ "email": "ghost@example.com" })),
            None,
        )
        .await;
    let known = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(json!({ "email": "forgot@example.com" })),
            None,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.body, known.body);
    assert!(app.reset_url_for("ghost@example.com").is_none());

    let url = app.reset_url_for("forgot@example.com").expect("reset mail");
    assert!(url.starts_with("http://localhost:3000/reset-password?token="));
    let token = url.split("token=").nth(1).unwrap().to_string();

    let reset = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(json!({ "token": token, "newPassword": "Bb2@bbbb" })),
            None,
        )
        .await;
    assert_eq!(reset.status, StatusCode::OK);

    let reused = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(json!({ "token": token, "password": "Cc3$cccc" })),
            None,
        )
        .await;
    assert_eq!(reused.status, StatusCode::BAD_REQUEST);
    assert_eq!(reused.code(), "INVALID_RESET_TOKEN");

    let old = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "forgot@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(old.code(), "INVALID_CREDENTIALS");

    let new = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "forgot@example.com", "password": "Bb2@bbbb" })),
            None,
        )
        .await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
async fn test_strict_tier_rate_limit() {
    let app = TestApp::with_config(|c| c.rate_limit.strict = 2);

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let response = app
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "email": "rl@example.com", "password": PASSWORD })),
                None,
            )
            .await;
        statuses.push((response.status, response.code().to_string()));
    }

    assert_eq!(statuses[0].0, StatusCode::UNAUTHORIZED);
    assert_eq!(statuses[1].0, StatusCode::UNAUTHORIZED);
    assert_eq!(statuses[2].0, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(statuses[2].1, "RATE_LIMITED");

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
}

async fn login_statuses(app: &TestApp, forwarded_for: impl Fn(usize) -> String) -> Vec<StatusCode> {
    let peer = SocketAddr::from(([198, 51, 100, 7], 52_000));
    let mut statuses = Vec::new();
    for i in 0..5 {
        let response = app
            .request_via(
                peer,
                &forwarded_for(i),
                "POST",
                "/api/auth/login",
                Some(json!({ "email": "rl@example.com", "password": PASSWORD })),
            )
            .await;
        statuses.push(response.status);
    }
    statuses
}

#[tokio::test]
async fn test_rotating_forwarded_for_shares_the_peer_bucket() {
    let app = TestApp::with_config(|c| c.rate_limit.strict = 2);

    let statuses = login_statuses(&app, |i| format!("10.9.9.{i}")).await;

    assert_eq!(statuses[..2], [StatusCode::UNAUTHORIZED; 2]);
    assert_eq!(statuses[2..], [StatusCode::TOO_MANY_REQUESTS; 3]);
}

#[tokio::test]
async fn test_trusted_proxy_keys_clients_by_forwarded_for() {
    let app = TestApp::with_config(|c| {
        c.rate_limit.strict = 2;
        c.rate_limit.trust_forwarded_for = true;
    });

    let distinct = login_statuses(&app, |i| format!("10.9.9.{i}, 198.51.100.7")).await;
    assert!(distinct.iter().all(|s| *s == StatusCode::UNAUTHORIZED));

    let repeated = login_statuses(&app, |_| "203.0.113.50".to_string()).await;
    assert_eq!(repeated[..2], [StatusCode::UNAUTHORIZED; 2]);
    assert_eq!(repeated[2..], [StatusCode::TOO_MANY_REQUESTS; 3]);
}
