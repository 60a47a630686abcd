//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use eatfast_api::{AppState, StateParts, build_app};
use eatfast_auth::{ExternalIdentity, IdentityProvider};
use eatfast_cache::CacheManager;
use eatfast_core::config::{AppConfig, Environment};
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::ManualClock;
use eatfast_database::{MemoryAccountRepository, MemoryRoleRepository};
use eatfast_service::{Notification, RecordingNotifier};

/// Password that satisfies the policy.
pub const PASSWORD: &str = "Aa1!aaaa";

/// Test application context
pub struct TestApp {
    /// The Axum app for making test requests
    pub router: Router,
    /// Credential store behind the app
    pub accounts: Arc<MemoryAccountRepository>,
    /// Clock shared by token issuer and flows
    pub clock: Arc<ManualClock>,
    /// Every notification the app sent
    pub outbox: Arc<RecordingNotifier>,
    /// Scripted Google stand-in
    pub google: Arc<FakeGoogle>,
}

impl TestApp {
    /// App with Google enabled and generous rate limits.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// App built from the test configuration after `adjust` has run.
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.server.environment = Environment::Test;
        config.rate_limit.strict = 1_000;
        config.rate_limit.moderate = 1_000;
        config.rate_limit.lenient = 1_000;
        config.oauth.google.enabled = true;
        adjust(&mut config);

        let accounts = Arc::new(MemoryAccountRepository::new());
        let clock = Arc::new(ManualClock::starting_now());
        let outbox = Arc::new(RecordingNotifier::new());
        let google = Arc::new(FakeGoogle::default());

        let identity_provider: Option<Arc<dyn IdentityProvider>> = if config.oauth.google.enabled {
            Some(google.clone())
        } else {
            None
        };

        let state = AppState::new(StateParts {
            config,
            accounts: accounts.clone(),
            roles: Arc::new(MemoryRoleRepository::seeded()),
            cache: Arc::new(CacheManager::in_memory()),
            notifier: outbox.clone(),
            identity_provider,
            clock: clock.clone(),
        });

        Self {
            router: build_app(state),
            accounts,
            clock,
            outbox,
            google,
        }
    }

    /// Send a JSON request, optionally with a bearer token.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.send(method, path, body, token, None).await
    }

    /// Send a JSON request carrying a `Cookie` header.
    pub async fn request_with_cookie(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        cookie: &str,
    ) -> TestResponse {
        self.send(method, path, body, None, Some(cookie)).await
    }

    /// Send a JSON request as if it arrived on a socket from `peer`,
    /// carrying the given `X-Forwarded-For` value.
    pub async fn request_via(
        &self,
        peer: SocketAddr,
        forwarded_for: &str,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let mut req = json_request(method, path, body, |req| {
            req.header("x-forwarded-for", forwarded_for)
        });
        req.extensions_mut().insert(ConnectInfo(peer));
        self.dispatch(req).await
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let req = json_request(method, path, body, |mut req| {
            if let Some(token) = token {
                req = req.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            if let Some(cookie) = cookie {
                req = req.header(COOKIE, cookie);
            }
            req
        });
        self.dispatch(req).await
    }

    async fn dispatch(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            set_cookie,
        }
    }

    /// Register a password account and return its id.
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "email": email,
                    "password": PASSWORD,
                    "firstName": "Amina",
                    "lastName": "Nkemelu",
                    "phone": "+237612345678",
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["accountId"]
            .as_str()
            .expect("accountId")
            .to_string()
    }

    /// Submit the last code mailed to `email` for `account_id`.
    pub async fn verify(&self, account_id: &str, email: &str) -> TestResponse {
        let code = self.outbox.last_code_for(email).expect("code was mailed");
        self.request(
            "POST",
            "/api/auth/verify-2fa",
            Some(serde_json::json!({ "accountId": account_id, "code": code })),
            None,
        )
        .await
    }

    /// Register, verify and return the access token.
    pub async fn signed_in(&self, email: &str) -> Session {
        let account_id = self.register(email).await;
        let response = self.verify(&account_id, email).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        Session {
            account_id,
            access_token: response.body["accessToken"]
                .as_str()
                .expect("accessToken")
                .to_string(),
            refresh_cookie: response.cookie_pair().expect("refresh cookie"),
        }
    }

    /// Start a Google flow and return its state nonce.
    pub async fn google_state(&self) -> String {
        let response = self.request("GET", "/api/auth/google/init", None, None).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["state"].as_str().expect("state").to_string()
    }

    /// Reset URL of the most recent reset mail to `email`.
    pub fn reset_url_for(&self, email: &str) -> Option<String> {
        self.outbox.sent().into_iter().rev().find_map(|n| match n {
            Notification::PasswordReset { to, reset_url, .. } if to == email => Some(reset_url),
            _ => None,
        })
    }
}

/// A signed-in account.
#[derive(Debug, Clone)]
pub struct Session {
    pub account_id: String,
    pub access_token: String,
    /// `refreshToken=<value>`, ready for a `Cookie` header.
    pub refresh_cookie: String,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
    /// First `Set-Cookie` header, if any
    pub set_cookie: Option<String>,
}

impl TestResponse {
    /// Error code of an error body.
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }

    /// `name=value` part of the `Set-Cookie` header.
    pub fn cookie_pair(&self) -> Option<String> {
        self.set_cookie
            .as_deref()
            .and_then(|c| c.split(';').next())
            .map(|pair| pair.trim().to_string())
    }
}

/// Google stand-in answering authorization codes from a fixed table.
#[derive(Debug, Default)]
pub struct FakeGoogle {
    identities: Mutex<HashMap<String, ExternalIdentity>>,
}

impl FakeGoogle {
    /// Make `code` exchange for `identity`.
    pub fn will_return(&self, code: &str, subject: &str, email: &str) {
        self.identities.lock().expect("lock").insert(
            code.to_string(),
            ExternalIdentity {
                subject: subject.to_string(),
                email: email.to_string(),
                first_name: "Chidi".to_string(),
                last_name: "Okafor".to_string(),
                picture: Some(format!("https://lh3.example/{subject}.jpg")),
            },
        );
    }
}

#[async_trait]
impl IdentityProvider for FakeGoogle {
    fn authorization_url(&self, state: &str) -> AppResult<String> {
        Ok(format!("https://accounts.example/o/oauth2/auth?state={state}"))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<ExternalIdentity> {
        self.identities
            .lock()
            .expect("lock")
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::oauth_verification("invalid_grant"))
    }
}

fn json_request(
    method: &str,
    path: &str,
    body: Option<Value>,
    headers: impl FnOnce(http::request::Builder) -> http::request::Builder,
) -> Request<Body> {
    let body_str = body
        .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
        .unwrap_or_default();

    let builder = Request::builder()
        .method(method)
        .uri(path)
        .header(CONTENT_TYPE, "application/json");

    headers(builder)
        .body(Body::from(body_str))
        .expect("Failed to build request")
}
