//! Access and refresh token issuance and verification.

pub mod claims;
pub mod issuer;

pub use claims::{AccessClaims, RefreshClaims, TokenKind};
pub use issuer::{TokenIssuer, TokenPair};
