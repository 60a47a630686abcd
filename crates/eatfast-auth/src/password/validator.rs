//! Password policy for new passwords.

use eatfast_core::config::AuthConfig;
use eatfast_core::error::AppError;

/// Characters that satisfy the special-character rule.
pub const SPECIAL_CHARACTERS: &str = "@$!%*?&";

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a password against all configured policies.
    ///
    /// Returns the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(AppError::validation(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(AppError::validation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            return Err(AppError::validation(format!(
                "Password must contain at least one special character ({SPECIAL_CHARACTERS})"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_accepts_minimal_strong_password() {
        assert!(validator().validate("Aa1!aaaa").is_ok());
    }

    #[test]
    fn test_rejects_each_missing_class() {
        let v = validator();
        for weak in ["Aa1!aaa", "AA1!AAAA", "aa1!aaaa", "Aaa!aaaa", "Aa1aaaaa", "Aa1#aaaa"] {
            assert!(v.validate(weak).is_err(), "{weak} should be rejected");
        }
    }
}
