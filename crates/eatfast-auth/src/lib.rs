//! # eatfast-auth
//!
//! Authentication and authorization primitives for the Eat Fast platform.
//!
//! ## Modules
//!
//! - `jwt` : access/refresh token issuance and verification
//! - `password` : Argon2id password hashing and policy enforcement
//! - `otp` : six-digit second-factor codes in the ephemeral store
//! - `oauth` : state nonces and the external identity provider client
//! - `guard` : per-request admission: token, account, role, permission
//! - `secret` : random tokens and digests

pub mod guard;
pub mod jwt;
pub mod oauth;
pub mod otp;
pub mod password;
pub mod secret;

pub use guard::{AccessGuard, AccessPolicy, Principal};
pub use jwt::{AccessClaims, RefreshClaims, TokenIssuer, TokenKind, TokenPair};
pub use oauth::{ExternalIdentity, GoogleIdentityProvider, IdentityProvider, OAuthStateStore};
pub use otp::OneTimeCodeStore;
pub use password::{PasswordHasher, PasswordValidator};
