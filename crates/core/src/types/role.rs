//! Account roles.

use serde::{Deserialize, Serialize};

/// What a signed-in account is allowed to do.
///
/// Roles live on the profile row, never in client state: the storefront
/// re-derives the role every time the profile is (re)loaded. Early profile
/// rows predate the `role` column and carry an `is_seller` boolean instead;
/// [`Role::from_row`] honors both spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browse, buy, favorite.
    #[default]
    Customer,
    /// Everything a customer can do, plus inventory, orders, and user
    /// management.
    Admin,
}

impl Role {
    /// Derive the role from a profile row's columns.
    ///
    /// A literal `"admin"` in the role column wins; any other value is a
    /// customer. Rows without a role column fall back to the legacy
    /// `is_seller` flag.
    #[must_use]
    pub fn from_row(role: Option<&str>, legacy_is_seller: Option<bool>) -> Self {
        match role {
            Some("admin") => Self::Admin,
            Some(_) => Self::Customer,
            None => {
                if legacy_is_seller == Some(true) {
                    Self::Admin
                } else {
                    Self::Customer
                }
            }
        }
    }

    /// True for admin accounts.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_column_wins() {
        assert_eq!(Role::from_row(Some("admin"), Some(false)), Role::Admin);
        assert_eq!(Role::from_row(Some("customer"), Some(true)), Role::Customer);
    }

    #[test]
    fn test_unknown_role_is_customer() {
        assert_eq!(Role::from_row(Some("moderator"), None), Role::Customer);
    }

    #[test]
    fn test_legacy_seller_flag() {
        assert_eq!(Role::from_row(None, Some(true)), Role::Admin);
        assert_eq!(Role::from_row(None, Some(false)), Role::Customer);
        assert_eq!(Role::from_row(None, None), Role::Customer);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"customer\"").unwrap();
        assert_eq!(role, Role::Customer);
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for role in [Role::Customer, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }
}
