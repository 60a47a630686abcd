//! Shared fixtures for flow tests: in-memory stores, a manual clock, an
//! outbox and a scripted identity provider.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use eatfast_auth::{ExternalIdentity, IdentityProvider, TokenIssuer};
use eatfast_cache::CacheManager;
use eatfast_core::config::AuthConfig;
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::ManualClock;
use eatfast_core::types::AccountId;
use eatfast_database::{AccountRepository, MemoryAccountRepository, MemoryRoleRepository};
use eatfast_entity::account::AccountStatus;
use eatfast_entity::role::RoleName;

use crate::auth::{AuthDeps, OAuthService, PasswordAuthService, RegisterInput};
use crate::notification::{NotificationDispatcher, RecordingNotifier};

pub(crate) const STRONG_PASSWORD: &str = "Aa1!aaaa";
const CLIENT_URL: &str = "http://localhost:3000";

pub(crate) struct Fixture {
    pub deps: AuthDeps,
    pub accounts: Arc<MemoryAccountRepository>,
    pub clock: Arc<ManualClock>,
    pub outbox: Arc<RecordingNotifier>,
    pub config: AuthConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let config = AuthConfig::default();
        let clock = Arc::new(ManualClock::starting_now());
        let accounts = Arc::new(MemoryAccountRepository::new());
        let outbox = Arc::new(RecordingNotifier::new());
        let deps = AuthDeps {
            accounts: accounts.clone(),
            roles: Arc::new(MemoryRoleRepository::seeded()),
            issuer: Arc::new(TokenIssuer::new(&config, clock.clone())),
            cache: Arc::new(CacheManager::in_memory()),
            notifier: NotificationDispatcher::new(outbox.clone()),
            clock: clock.clone(),
        };
        Self {
            deps,
            accounts,
            clock,
            outbox,
            config,
        }
    }

    pub fn password_service(&self) -> PasswordAuthService {
        PasswordAuthService::new(self.deps.clone(), &self.config, CLIENT_URL)
    }

    pub fn oauth_service(&self, provider: Arc<FakeIdentityProvider>) -> OAuthService {
        OAuthService::new(
            self.deps.clone(),
            provider,
            Duration::from_secs(600),
            CLIENT_URL,
        )
    }

    /// A pending password account.
    pub async fn registered(&self, email: &str) -> AccountId {
        self.password_service()
            .register(register_input(email))
            .await
            .expect("register")
            .account_id
    }

    /// A password account that has completed its first second factor.
    pub async fn active_account(&self, email: &str) -> AccountId {
        let id = self.registered(email).await;
        let code = self.outbox.last_code_for(email).expect("verification code");
        self.password_service()
            .verify_two_factor(id, &code)
            .await
            .expect("verify");
        id
    }

    pub async fn role_name_of(&self, id: AccountId) -> RoleName {
        let account = self
            .accounts
            .find_by_id(id)
            .await
            .expect("lookup")
            .expect("account");
        self.deps.role_of(&account).await.expect("role").name
    }

    pub async fn set_status(&self, id: AccountId, status: AccountStatus) {
        self.accounts
            .set_status(id, status)
            .await
            .expect("set status");
    }
}

pub(crate) fn register_input(email: &str) -> RegisterInput {
    RegisterInput {
        email: email.to_string(),
        password: STRONG_PASSWORD.to_string(),
        first_name: "Jo".to_string(),
        last_name: "Do".to_string(),
        phone: Some("+237600000000".to_string()),
        role: None,
    }
}

pub(crate) fn identity(subject: &str, email: &str) -> ExternalIdentity {
    ExternalIdentity {
        subject: subject.to_string(),
        email: email.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        picture: Some(format!("https://pics.example/{subject}.png")),
    }
}

/// Identity provider that answers codes from a fixed table.
#[derive(Debug, Default)]
pub(crate) struct FakeIdentityProvider {
    identities: Mutex<HashMap<String, ExternalIdentity>>,
    exchanges: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn register(&self, code: &str, identity: ExternalIdentity) {
        self.identities
            .lock()
            .expect("lock")
            .insert(code.to_string(), identity);
    }

    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, state: &str) -> AppResult<String> {
        Ok(format!("https://accounts.example/auth?state={state}"))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<ExternalIdentity> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        self.identities
            .lock()
            .expect("lock")
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::oauth_verification("invalid_grant"))
    }
}
