//! # eatfast-service
//!
//! Sign-in flows for Eat Fast. Each service orchestrates the credential
//! store, the ephemeral secret store, the token issuer and the notification
//! sender to implement one application-level use case.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod auth;
pub mod context;
pub mod notification;

pub use auth::{
    AuthDeps, InitiateOutcome, LoginOutcome, OAuthOutcome, OAuthService, PasswordAuthService,
    RegisterInput, RegisterOutcome, SessionOutcome,
};
pub use context::RequestContext;
pub use notification::{
    LogNotifier, Notification, NotificationDispatcher, Notifier, RecordingNotifier, SmtpNotifier,
};

#[cfg(test)]
pub(crate) mod test_support;
