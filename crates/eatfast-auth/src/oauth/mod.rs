//! OAuth sign-in primitives: single-use state nonces and the identity
//! provider client.

pub mod google;
pub mod provider;
pub mod state;

pub use google::GoogleIdentityProvider;
pub use provider::{ExternalIdentity, IdentityProvider};
pub use state::{OAuthStateStore, StateRecord};
