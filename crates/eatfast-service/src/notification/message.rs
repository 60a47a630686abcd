//! Notification kinds and their rendered content.

use serde::{Deserialize, Serialize};

/// A message to one account holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Code confirming a new account's email.
    VerificationCode {
        to: String,
        name: String,
        code: String,
    },
    /// Second-factor code for a sign-in.
    LoginCode {
        to: String,
        name: String,
        code: String,
    },
    /// Link to choose a new password.
    PasswordReset {
        to: String,
        name: String,
        reset_url: String,
    },
    /// Notice that the password was changed.
    PasswordChanged { to: String, name: String },
    /// Notice that an external identity was attached.
    AccountLinked {
        to: String,
        name: String,
        provider: String,
    },
}

impl Notification {
    /// Recipient address.
    pub fn recipient(&self) -> &str {
        match self {
            Self::VerificationCode { to, .. }
            | Self::LoginCode { to, .. }
            | Self::PasswordReset { to, .. }
            | Self::PasswordChanged { to, .. }
            | Self::AccountLinked { to, .. } => to,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::VerificationCode { .. } => "verification_code",
            Self::LoginCode { .. } => "login_code",
            Self::PasswordReset { .. } => "password_reset",
            Self::PasswordChanged { .. } => "password_changed",
            Self::AccountLinked { .. } => "account_linked",
        }
    }

    /// The one-time code carried, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::VerificationCode { code, .. } | Self::LoginCode { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Subject line.
    pub fn subject(&self, product: &str) -> String {
        match self {
            Self::VerificationCode { .. } => format!("Verify Your Email - {product}"),
            Self::LoginCode { .. } => format!("Your Login Code - {product}"),
            Self::PasswordReset { .. } => format!("Password Reset - {product}"),
            Self::PasswordChanged { .. } => format!("Your Password Was Changed - {product}"),
            Self::AccountLinked { provider, .. } => {
                format!("{} Account Linked - {product}", capitalize(provider))
            }
        }
    }

    /// Plain-text body.
    pub fn text_body(&self, product: &str) -> String {
        match self {
            Self::VerificationCode { name, code, .. } => format!(
                "Hello {name},\n\nWelcome to {product}! Your verification code is: {code}\n\n\
                 This code expires in 10 minutes.\n"
            ),
            Self::LoginCode { name, code, .. } => format!(
                "Hello {name},\n\nYour {product} login code is: {code}\n\n\
                 This code expires in 10 minutes. If you did not try to sign in, \
                 change your password.\n"
            ),
            Self::PasswordReset {
                name, reset_url, ..
            } => format!(
                "Hello {name},\n\nWe received a request to reset your {product} password.\n\n\
                 {reset_url}\n\nThis link expires in 1 hour and can only be used once. \
                 If you did not ask for it, ignore this email.\n"
            ),
            Self::PasswordChanged { name, .. } => format!(
                "Hello {name},\n\nThe password of your {product} account was just changed. \
                 If this was not you, contact support immediately.\n"
            ),
            Self::AccountLinked { name, provider, .. } => format!(
                "Hello {name},\n\nYour {product} account can now be accessed with {}.\n",
                capitalize(provider)
            ),
        }
    }

    /// HTML body.
    pub fn html_body(&self, product: &str) -> String {
        let paragraphs: String = self
            .text_body(product)
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .map(|p| format!("<p>{}</p>", escape_html(p.trim())))
            .collect();
        format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px;\">\
             <h2 style=\"color: #ff6b35;\">{}</h2>{paragraphs}</div>",
            escape_html(product)
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
