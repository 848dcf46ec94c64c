//! User roles and capabilities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assigned to an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    InventoryManager,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::InventoryManager => "inventory_manager",
            UserRole::Staff => "staff",
        }
    }

    /// Whether this role may create/update/delete master data and
    /// trigger stock-mutating transitions (validate, complete, approve)
    pub fn can_manage_inventory(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::InventoryManager)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "inventory_manager" => Ok(UserRole::InventoryManager),
            "staff" => Ok(UserRole::Staff),
            other => Err(format!("unknown user role: {other}")),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_capabilities() {
        assert!(UserRole::Admin.can_manage_inventory());
        assert!(UserRole::InventoryManager.can_manage_inventory());
        assert!(!UserRole::Staff.can_manage_inventory());
    }

    #[test]
    fn role_round_trips() {
        for role in [UserRole::Admin, UserRole::InventoryManager, UserRole::Staff] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
    }
}
