//! Six-digit second-factor codes.
//!
//! At most one live code exists per account: issuing overwrites the previous
//! one. Wrong guesses are counted and the code is destroyed once the
//! configured maximum is reached.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use eatfast_cache::{CacheManager, keys};
use eatfast_core::config::AuthConfig;
use eatfast_core::error::AppError;
use eatfast_core::result::AppResult;
use eatfast_core::traits::CacheProvider;
use eatfast_core::types::AccountId;

/// Issues and verifies one-time codes in the ephemeral store.
#[derive(Debug, Clone)]
pub struct OneTimeCodeStore {
    cache: Arc<CacheManager>,
    ttl: Duration,
    max_attempts: i64,
}

impl OneTimeCodeStore {
    /// Creates a code store from auth configuration.
    pub fn new(cache: Arc<CacheManager>, config: &AuthConfig) -> Self {
        Self {
            cache,
            ttl: Duration::from_secs(config.code_ttl_seconds),
            max_attempts: config.max_code_attempts,
        }
    }

    /// Generates a code for `account_id`, replacing any live one, and
    /// returns it for delivery.
    pub async fn issue(&self, account_id: AccountId) -> AppResult<String> {
        let code = generate_code();
        self.cache
            .set(&keys::two_factor_code(account_id), &code, self.ttl)
            .await?;
        self.cache
            .delete(&keys::two_factor_attempts(account_id))
            .await?;
        debug!(account_id = %account_id, "Issued one-time code");
        Ok(code)
    }

    /// Consumes the live code if `submitted` matches it.
    ///
    /// Fails with `InvalidCode` when no code is live or the value differs.
    pub async fn verify(&self, account_id: AccountId, submitted: &str) -> AppResult<()> {
        let code_key = keys::two_factor_code(account_id);
        let Some(stored) = self.cache.get(&code_key).await? else {
            return Err(AppError::invalid_code());
        };

        if stored != submitted {
            self.record_miss(account_id).await?;
            return Err(AppError::invalid_code());
        }

        // A concurrent verify or re-issue may have won the race.
        match self.cache.take(&code_key).await? {
            Some(taken) if taken == submitted => {
                self.cache
                    .delete(&keys::two_factor_attempts(account_id))
                    .await?;
                Ok(())
            }
            _ => Err(AppError::invalid_code()),
        }
    }

    /// Removes any live code and its attempt counter.
    pub async fn discard(&self, account_id: AccountId) -> AppResult<()> {
        self.cache.delete(&keys::two_factor_code(account_id)).await?;
        self.cache
            .delete(&keys::two_factor_attempts(account_id))
            .await
    }

    async fn record_miss(&self, account_id: AccountId) -> AppResult<()> {
        let attempts_key = keys::two_factor_attempts(account_id);
        let attempts = self.cache.incr(&attempts_key, self.ttl).await?;
        if attempts >= self.max_attempts {
            warn!(account_id = %account_id, attempts, "Too many wrong codes, discarding");
            self.discard(account_id).await?;
        }
        Ok(())
    }
}

/// Uniformly random six-digit code.
fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}
