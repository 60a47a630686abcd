//! Closed set of role names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use eatfast_core::AppError;

/// Every role known to the platform.
///
/// Free-text role strings coming from clients are converted into this enum at
/// the boundary and then checked against the Role table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    /// Platform administrator.
    Admin,
    /// Orders food.
    Customer,
    /// Manages a restaurant and its menu.
    RestaurantOwner,
    /// Delivers orders.
    DeliveryPerson,
    /// Handles customer support.
    SupportAgent,
}

impl RoleName {
    /// All roles.
    pub const ALL: [RoleName; 5] = [
        Self::Admin,
        Self::Customer,
        Self::RestaurantOwner,
        Self::DeliveryPerson,
        Self::SupportAgent,
    ];

    /// Roles a user may pick for themselves at sign-up.
    pub const SELF_ASSIGNABLE: [RoleName; 3] =
        [Self::Customer, Self::RestaurantOwner, Self::DeliveryPerson];

    /// Return the role as stored in the Role table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
            Self::RestaurantOwner => "restaurant_owner",
            Self::DeliveryPerson => "delivery_person",
            Self::SupportAgent => "support_agent",
        }
    }

    /// Whether the role can be chosen by the account holder.
    pub fn is_self_assignable(&self) -> bool {
        Self::SELF_ASSIGNABLE.contains(self)
    }

    /// Whether the role bypasses ownership checks.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Client route the user lands on after signing in.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin/dashboard",
            Self::Customer => "/client/dashboard",
            Self::RestaurantOwner => "/restaurant/dashboard",
            Self::DeliveryPerson => "/delivery/dashboard",
            Self::SupportAgent => "/agent/dashboard",
        }
    }

    /// Resolve a requested self-service role, accepting the short aliases
    /// used by the sign-up forms. Returns `None` for unknown names and for
    /// roles that cannot be self-assigned.
    pub fn parse_self_assignable(requested: &str) -> Option<Self> {
        let role = match normalize(requested).as_str() {
            "client" => Self::Customer,
            "restaurant" => Self::RestaurantOwner,
            "delivery" => Self::DeliveryPerson,
            other => other.parse().ok()?,
        };
        role.is_self_assignable().then_some(role)
    }

    /// Role for a password registration: the requested self-service role,
    /// or customer when none (or a disallowed one) was requested.
    pub fn for_registration(requested: Option<&str>) -> Self {
        requested
            .and_then(Self::parse_self_assignable)
            .unwrap_or(Self::Customer)
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace('-', "_")
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            "restaurant_owner" => Ok(Self::RestaurantOwner),
            "delivery_person" => Ok(Self::DeliveryPerson),
            "support_agent" => Ok(Self::SupportAgent),
            _ => Err(AppError::invalid_role(format!("Invalid role: '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_both_spellings() {
        assert_eq!(
            "restaurant-owner".parse::<RoleName>().unwrap(),
            RoleName::RestaurantOwner
        );
        assert_eq!(
            "DELIVERY_PERSON".parse::<RoleName>().unwrap(),
            RoleName::DeliveryPerson
        );
        assert!("manager".parse::<RoleName>().is_err());
    }

    #[test]
    fn test_self_assignable_never_grants_staff_roles() {
        assert_eq!(
            RoleName::parse_self_assignable("restaurant"),
            Some(RoleName::RestaurantOwner)
        );
        assert_eq!(
            RoleName::parse_self_assignable("customer"),
            Some(RoleName::Customer)
        );
        assert_eq!(RoleName::parse_self_assignable("admin"), None);
        assert_eq!(RoleName::parse_self_assignable("support_agent"), None);
        assert_eq!(RoleName::parse_self_assignable("pirate"), None);
    }

    #[test]
    fn test_registration_defaults_to_customer() {
        assert_eq!(RoleName::for_registration(None), RoleName::Customer);
        assert_eq!(RoleName::for_registration(Some("admin")), RoleName::Customer);
        assert_eq!(RoleName::for_registration(Some("client")), RoleName::Customer);
        assert_eq!(
            RoleName::for_registration(Some("delivery")),
            RoleName::DeliveryPerson
        );
    }

    #[test]
    fn test_dashboard_paths() {
        assert_eq!(RoleName::Customer.dashboard_path(), "/client/dashboard");
        assert_eq!(RoleName::Admin.dashboard_path(), "/admin/dashboard");
    }
}
