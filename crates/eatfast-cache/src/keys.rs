//! Key builders for every ephemeral secret the application stores.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use eatfast_core::types::AccountId;

/// Pending two-factor code for an account.
pub fn two_factor_code(account_id: AccountId) -> String {
    format!("2fa:{account_id}")
}

/// Failed verification attempts against the pending code.
pub fn two_factor_attempts(account_id: AccountId) -> String {
    format!("2fa:attempts:{account_id}")
}

/// OAuth state nonce awaiting its callback.
pub fn oauth_state(nonce: &str) -> String {
    format!("oauth:state:{nonce}")
}

/// Password reset token, keyed by the SHA-256 hex digest of the raw token.
pub fn password_reset(token_digest: &str) -> String {
    format!("reset:{token_digest}")
}

/// Fixed-window request counter for a client address.
pub fn rate_limit(tier: &str, client: &str) -> String {
    format!("rl:{tier}:{client}")
}
