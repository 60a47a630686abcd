//! Request DTOs with validation.
//!
//! Bodies use camelCase names and also accept the snake_case spelling.
//! Unknown fields are rejected.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use eatfast_core::types::AccountId;
use eatfast_service::RegisterInput;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password. The full policy is enforced by the flow.
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
    /// Given name.
    #[serde(alias = "first_name")]
    #[validate(length(min = 2, max = 50, message = "First name must be 2 to 50 characters"))]
    pub first_name: String,
    /// Family name.
    #[serde(alias = "last_name")]
    #[validate(length(min = 2, max = 50, message = "Last name must be 2 to 50 characters"))]
    pub last_name: String,
    /// Phone number in E.164 form.
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    /// Requested role name or alias.
    #[serde(default)]
    pub role: Option<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            phone: req.phone.filter(|p| !p.is_empty()),
            role: req.role,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// Second-factor verification request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifyTwoFactorRequest {
    /// Account awaiting its second factor.
    #[serde(alias = "account_id", alias = "userId", alias = "user_id")]
    pub account_id: AccountId,
    /// Six-digit code.
    #[validate(custom(function = "validate_code"))]
    pub code: String,
}

/// Request for a fresh second-factor code.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResendTwoFactorRequest {
    /// Account awaiting its second factor.
    #[serde(alias = "account_id", alias = "userId", alias = "user_id")]
    pub account_id: AccountId,
}

/// Token refresh request body. The cookie takes precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RefreshRequest {
    /// Refresh token, for clients that cannot hold cookies.
    #[serde(default, alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

/// Forgot-password request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Reset-password request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResetPasswordRequest {
    /// Token from the reset link.
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    /// New password.
    #[serde(alias = "newPassword", alias = "new_password")]
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
}

/// Google callback request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GoogleCallbackRequest {
    /// Authorization code from Google.
    #[validate(length(min = 1, message = "Authorization code is required"))]
    pub code: String,
    /// State nonce from the init step.
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    /// Role for a newly created account.
    #[serde(default, alias = "requestedRole", alias = "requested_role")]
    pub role: Option<String>,
}

/// Google link request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GoogleLinkRequest {
    /// Authorization code from Google.
    #[validate(length(min = 1, message = "Authorization code is required"))]
    pub code: String,
    /// State nonce from the init step.
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
}

/// E.164: optional `+`, a non-zero digit, then 1 to 14 digits.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (2..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("Invalid phone number".into()))
    }
}

fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("code").with_message("Code must be 6 digits".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register(body: serde_json::Value) -> Result<RegisterRequest, serde_json::Error> {
        serde_json::from_value(body)
    }

    #[test]
    fn test_register_accepts_both_spellings() {
        let camel = register(json!({
            "email": "jo@example.com",
            "password": "Aa1!aaaa",
            "firstName": "Jo",
            "lastName": "Doe",
        }))
        .unwrap();
        assert!(camel.validate().is_ok());

        let snake = register(json!({
            "email": "jo@example.com",
            "password": "Aa1!aaaa",
            "first_name": "Jo",
            "last_name": "Doe",
            "phone": "+237612345678",
            "role": "restaurant",
        }))
        .unwrap();
        assert!(snake.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_unknown_fields() {
        let err = register(json!({
            "email": "jo@example.com",
            "password": "Aa1!aaaa",
            "firstName": "Jo",
            "lastName": "Doe",
            "isAdmin": true,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("isAdmin"));
    }

    #[test]
    fn test_register_field_rules() {
        let req = register(json!({
            "email": "not-an-email",
            "password": "short",
            "firstName": "J",
            "lastName": "Doe",
            "phone": "0123",
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["email", "password", "first_name", "phone"] {
            assert!(fields.contains_key(field), "{field} should fail");
        }
        assert!(!fields.contains_key("last_name"));
    }

    #[test]
    fn test_phone_rule() {
        assert!(validate_phone("+237612345678").is_ok());
        assert!(validate_phone("14155552671").is_ok());
        assert!(validate_phone("+0123456").is_err());
        assert!(validate_phone("+1").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
        assert!(validate_phone("+23761234abc").is_err());
    }

    #[test]
    fn test_code_rule() {
        assert!(validate_code("012345").is_ok());
        assert!(validate_code("12345").is_err());
        assert!(validate_code("12345a").is_err());
    }

    #[test]
    fn test_verify_accepts_user_id_alias() {
        let id = AccountId::new();
        let req: VerifyTwoFactorRequest =
            serde_json::from_value(json!({ "userId": id.to_string(), "code": "123456" })).unwrap();
        assert_eq!(req.account_id, id);

        let bad: Result<VerifyTwoFactorRequest, _> =
            serde_json::from_value(json!({ "accountId": "not-a-uuid", "code": "123456" }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_reset_accepts_new_password_alias() {
        let req: ResetPasswordRequest =
            serde_json::from_value(json!({ "token": "abc", "newPassword": "Bb2@bbbb" })).unwrap();
        assert_eq!(req.password, "Bb2@bbbb");
    }
}
