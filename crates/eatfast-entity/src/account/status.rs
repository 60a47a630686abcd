//! Account lifecycle status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Registered but the first second-factor check has not succeeded yet.
    Pending,
    /// Fully usable.
    Active,
    /// Temporarily disabled by staff.
    Suspended,
    /// Permanently disabled by staff.
    Banned,
}

impl AccountStatus {
    /// Whether bearer tokens and refreshes are honoured for this status.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether staff have disabled the account.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Suspended | Self::Banned)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = eatfast_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "banned" => Ok(Self::Banned),
            _ => Err(eatfast_core::AppError::validation(format!(
                "Invalid account status: '{s}'. Expected one of: pending, active, suspended, banned"
            ))),
        }
    }
}
