//! Unified application error types for Eat Fast.
//!
//! All crates map their internal errors into [`AppError`] so that a flow
//! step can propagate any failure with the `?` operator. The HTTP layer
//! turns the [`ErrorKind`] into a status code and a stable wire `code`.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across the entire application.
///
/// The first group are the authentication outcomes clients are expected to
/// react to. The second group are infrastructure failures that are never
/// shown to clients verbatim outside development mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input failed schema or policy validation.
    Validation,
    /// An account with the same email already exists.
    DuplicateAccount,
    /// Unknown email or wrong password (deliberately indistinguishable).
    InvalidCredentials,
    /// The account is temporarily locked after repeated failures.
    AccountLocked,
    /// The account exists but is not allowed to authenticate.
    AccountInactive,
    /// A one-time code is missing, expired, or wrong.
    InvalidCode,
    /// A password reset token is missing, expired, or already used.
    InvalidResetToken,
    /// An OAuth state nonce is unknown or expired.
    InvalidOrExpiredState,
    /// The identity provider rejected or failed the code exchange.
    OAuthVerificationFailed,
    /// The external identity already belongs to another account.
    AccountAlreadyLinked,
    /// The operation would leave the account without any credential.
    LastCredential,
    /// The requested role does not exist or may not be self-assigned.
    InvalidRole,
    /// No bearer credential was presented.
    Unauthenticated,
    /// The token signature was valid but its lifetime has elapsed.
    TokenExpired,
    /// The token is malformed, has a bad signature, or is of the wrong kind.
    TokenInvalid,
    /// The caller lacks the required role or permission.
    InsufficientPermissions,
    /// The caller does not own the requested resource.
    ResourceAccessDenied,
    /// The requested resource was not found.
    NotFound,
    /// A rate limit was exceeded.
    RateLimit,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An external service (mail, identity provider) failed.
    ExternalService,
}

impl ErrorKind {
    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_FAILED",
            Self::DuplicateAccount => "DUPLICATE_ACCOUNT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::InvalidCode => "INVALID_CODE",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::InvalidOrExpiredState => "INVALID_STATE",
            Self::OAuthVerificationFailed => "OAUTH_VERIFICATION_FAILED",
            Self::AccountAlreadyLinked => "ACCOUNT_ALREADY_LINKED",
            Self::LastCredential => "LAST_CREDENTIAL",
            Self::InvalidRole => "INVALID_ROLE",
            Self::Unauthenticated => "NO_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "INVALID_TOKEN",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::ResourceAccessDenied => "RESOURCE_ACCESS_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimit => "RATE_LIMITED",
            Self::Internal
            | Self::Database
            | Self::Cache
            | Self::Configuration
            | Self::Serialization
            | Self::ExternalService => "INTERNAL_ERROR",
        }
    }

    /// Whether this kind describes an infrastructure failure whose message
    /// must not reach clients in production.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal
                | Self::Database
                | Self::Cache
                | Self::Configuration
                | Self::Serialization
                | Self::ExternalService
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout Eat Fast.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Structured diagnostics attached to the response (e.g. required vs.
    /// held permissions).
    pub details: Option<serde_json::Value>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach structured details to this error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a duplicate-account error.
    pub fn duplicate_account() -> Self {
        Self::new(
            ErrorKind::DuplicateAccount,
            "An account with this email already exists",
        )
    }

    /// Create the credentials error shared by unknown emails and wrong
    /// passwords.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid email or password")
    }

    /// Create an account-locked error.
    pub fn account_locked() -> Self {
        Self::new(
            ErrorKind::AccountLocked,
            "Account temporarily locked. Please try again later",
        )
    }

    /// Create an account-inactive error.
    pub fn account_inactive(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccountInactive, message)
    }

    /// Create an invalid one-time code error.
    pub fn invalid_code() -> Self {
        Self::new(ErrorKind::InvalidCode, "Invalid or expired verification code")
    }

    /// Create an invalid reset token error.
    pub fn invalid_reset_token() -> Self {
        Self::new(
            ErrorKind::InvalidResetToken,
            "Invalid or expired password reset token",
        )
    }

    /// Create an invalid OAuth state error.
    pub fn invalid_state() -> Self {
        Self::new(
            ErrorKind::InvalidOrExpiredState,
            "Invalid or expired OAuth state",
        )
    }

    /// Create an OAuth verification error.
    pub fn oauth_verification(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OAuthVerificationFailed, message)
    }

    /// Create an already-linked error.
    pub fn account_already_linked() -> Self {
        Self::new(
            ErrorKind::AccountAlreadyLinked,
            "This Google account is already linked to another account",
        )
    }

    /// Create an invalid role error.
    pub fn invalid_role(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRole, message)
    }

    /// Create an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Create a token-expired error.
    pub fn token_expired() -> Self {
        Self::new(ErrorKind::TokenExpired, "Token has expired")
    }

    /// Create a token-invalid error.
    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, message)
    }

    /// Create an insufficient-permissions error echoing what was required
    /// and what the caller holds.
    pub fn insufficient_permissions(
        message: impl Into<String>,
        required: &[String],
        current: &[String],
    ) -> Self {
        Self::new(ErrorKind::InsufficientPermissions, message).with_details(serde_json::json!({
            "required": required,
            "current": current,
        }))
    }

    /// Create a resource-ownership error.
    pub fn resource_access_denied() -> Self {
        Self::new(
            ErrorKind::ResourceAccessDenied,
            "You do not have access to this resource",
        )
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a rate-limit error.
    pub fn rate_limited() -> Self {
        Self::new(
            ErrorKind::RateLimit,
            "Too many requests. Please try again later",
        )
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an external-service error.
    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
