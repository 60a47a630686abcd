//! Integration tests for Google sign-in, linking and unlinking.

use http::StatusCode;
use serde_json::json;

use eatfast_core::types::AccountId;
use eatfast_entity::account::AccountStatus;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_init_returns_url_with_state() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/auth/google/init", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let state = response.body["state"].as_str().unwrap();
    assert_eq!(state.len(), 64);
    assert!(
        response.body["authUrl"]
            .as_str()
            .unwrap()
            .ends_with(&format!("state={state}"))
    );
}

#[tokio::test]
async fn test_callback_creates_account_once() {
    let app = TestApp::new();
    app.google.will_return("code-1", "google-sub-1", "chidi@gmail.com");

    let state = app.google_state().await;
    let response = app
        .request(
            "POST",
            "/api/auth/google/callback",
            Some(json!({ "code": "code-1", "state": state })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["isNewUser"], true);
    assert_eq!(
        response.body["redirectUrl"],
        "http://localhost:3000/client/dashboard"
    );
    assert_eq!(response.body["user"]["email"], "chidi@gmail.com");
    assert_eq!(response.body["user"]["googleLinked"], true);
    assert_eq!(response.body["user"]["hasPassword"], false);
    assert!(response.set_cookie.unwrap().starts_with("refreshToken="));

    let replay = app
        .request(
            "POST",
            "/api/auth/google/callback",
            Some(json!({ "code": "code-1", "state": state })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::BAD_REQUEST);
    assert_eq!(replay.code(), "INVALID_STATE");

    let again = app.google_state().await;
    let second = app
        .request(
            "POST",
            "/api/auth/google/callback",
            Some(json!({ "code": "code-1", "state": again })),
            None,
        )
        .await;
    assert_eq!(second.body["isNewUser"], false);
    assert_eq!(second.body["user"]["id"], response.body["user"]["id"]);
}

#[tokio::test]
async fn test_callback_honours_requested_role() {
    let app = TestApp::new();
    app.google.will_return("code-r", "google-sub-r", "rider@gmail.com");

    let state = app.google_state().await;
    let response = app
        .request(
            "POST",
            "/api/auth/google/callback",
            Some(json!({ "code": "code-r", "state": state, "requestedRole": "delivery" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["role"], "delivery_person");
    assert!(
        response.body["redirectUrl"]
            .as_str()
            .unwrap()
            .ends_with("/delivery/dashboard")
    );
}

#[tokio::test]
async fn test_callback_refuses_admin_role() {
    let app = TestApp::new();
    app.google.will_return("code-a", "google-sub-a", "boss@gmail.com");

    let state = app.google_state().await;
    let response = app
        .request(
            "POST",
            "/api/auth/google/callback",
            Some(json!({ "code": "code-a", "state": state, "role": "admin" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "INVALID_ROLE");
}

#[tokio::test]
async fn test_callback_links_existing_email() {
    let app = TestApp::new();
    let session = app.signed_in("amina@example.com").await;
    app.google.will_return("code-e", "google-sub-e", "amina@example.com");

    let state = app.google_state().await;
    let response = app
        .request(
            "POST",
            "/api/auth/google/callback",
            Some(json!({ "code": "code-e", "state": state })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["isNewUser"], false);
    assert_eq!(response.body["user"]["id"], session.account_id.as_str());
    assert_eq!(response.body["user"]["googleLinked"], true);
    assert_eq!(response.body["user"]["hasPassword"], true);
}

#[tokio::test]
async fn test_callback_rejects_suspended_account() {
    let app = TestApp::new();
    let session = app.signed_in("suspended@example.com").await;
    let id: AccountId = session.account_id.parse().unwrap();
    app.accounts
        .set_status(id, AccountStatus::Suspended)
        .await
        .unwrap();
    app.google.will_return("code-s", "google-sub-s", "suspended@example.com");

    let state = app.google_state().await;
    let response = app
        .request(
            "POST",
            "/api/auth/google/callback",
            Some(json!({ "code": "code-s", "state": state })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "ACCOUNT_INACTIVE");
}

#[tokio::test]
async fn test_failed_exchange_is_reported() {
    let app = TestApp::new();
    let state = app.google_state().await;

    let response = app
        .request(
            "POST",
            "/api/auth/google/callback",
            Some(json!({ "code": "unknown-code", "state": state })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.code(), "OAUTH_VERIFICATION_FAILED");
}

#[tokio::test]
async fn test_link_and_unlink() {
    let app = TestApp::new();
    let session = app.signed_in("linker@example.com").await;
    app.google.will_return("code-l", "google-sub-l", "linker.personal@gmail.com");

    let state = app.google_state().await;
    let anonymous = app
        .request(
            "POST",
            "/api/auth/google/link",
            Some(json!({ "code": "code-l", "state": state })),
            None,
        )
        .await;
    assert_eq!(anonymous.code(), "NO_TOKEN");

    let state = app.google_state().await;
    let linked = app
        .request(
            "POST",
            "/api/auth/google/link",
            Some(json!({ "code": "code-l", "state": state })),
            Some(&session.access_token),
        )
        .await;
    assert_eq!(linked.status, StatusCode::OK, "{:?}", linked.body);
    assert_eq!(linked.body["user"]["googleLinked"], true);

    let unlinked = app
        .request(
            "DELETE",
            "/api/auth/google/unlink",
            None,
            Some(&session.access_token),
        )
        .await;
    assert_eq!(unlinked.status, StatusCode::OK);
    assert_eq!(unlinked.body["user"]["googleLinked"], false);
}

#[tokio::test]
async fn test_link_identity_owned_by_another_account() {
    let app = TestApp::new();
    app.google.will_return("code-o", "google-sub-o", "owner@gmail.com");
    let state = app.google_state().await;
    app.request(
        "POST",
        "/api/auth/google/callback",
        Some(json!({ "code": "code-o", "state": state })),
        None,
    )
    .await;

    let session = app.signed_in("other@example.com").await;
    let state = app.google_state().await;
    let response = app
        .request(
            "POST",
            "/api/auth/google/link",
            Some(json!({ "code": "code-o", "state": state })),
            Some(&session.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "ACCOUNT_ALREADY_LINKED");
}

#[tokio::test]
async fn test_unlink_refused_without_password() {
    let app = TestApp::new();
    app.google.will_return("code-g", "google-sub-g", "only.google@gmail.com");
    let state = app.google_state().await;
    let signed_in = app
        .request(
            "POST",
            "/api/auth/google/callback",
            Some(json!({ "code": "code-g", "state": state })),
            None,
        )
        .await;
    let token = signed_in.body["accessToken"].as_str().unwrap();

    let response = app
        .request("DELETE", "/api/auth/google/unlink", None, Some(token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "LAST_CREDENTIAL");
}

#[tokio::test]
async fn test_roles_lists_self_service_roles() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/auth/google/roles", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(!names.contains(&"admin"));
    assert!(!names.contains(&"support_agent"));
}

#[tokio::test]
async fn test_google_routes_absent_when_disabled() {
    let app = TestApp::with_config(|c| c.oauth.google.enabled = false);
    let response = app.request("GET", "/api/auth/google/init", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.code(), "NOT_FOUND");
}
