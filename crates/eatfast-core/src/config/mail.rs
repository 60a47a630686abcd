//! Outgoing mail configuration.

use serde::{Deserialize, Serialize};

/// SMTP settings for verification codes and account notices.
///
/// With `enabled = false` notifications are only logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Whether mail is actually sent.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// Use STARTTLS instead of implicit TLS.
    #[serde(default = "default_starttls")]
    pub starttls: bool,
    /// Sender mailbox, e.g. `"Eat Fast <noreply@eatfast.example>"`.
    #[serde(default = "default_from")]
    pub from: String,
    /// Product name used in subjects and bodies.
    #[serde(default = "default_product_name")]
    pub product_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            starttls: default_starttls(),
            from: default_from(),
            product_name: default_product_name(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_starttls() -> bool {
    true
}

fn default_from() -> String {
    "Eat Fast <noreply@eatfast.local>".to_string()
}

fn default_product_name() -> String {
    "Eat Fast".to_string()
}
