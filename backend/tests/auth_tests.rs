//! Authentication and authorization tests
//!
//! Role capabilities and the credential validation rules used at
//! registration.

use proptest::prelude::*;
use shared::validation::{validate_email, validate_password};
use shared::UserRole;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_manager_roles_can_mutate() {
        assert!(UserRole::Admin.can_manage_inventory());
        assert!(UserRole::InventoryManager.can_manage_inventory());
    }

    #[test]
    fn test_staff_is_read_mostly() {
        // staff can create draft documents but not trigger stock
        // mutations or edit master data
        assert!(!UserRole::Staff.can_manage_inventory());
    }

    #[test]
    fn test_role_serialization_names() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::InventoryManager.as_str(), "inventory_manager");
        assert_eq!(UserRole::Staff.as_str(), "staff");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("manager@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("warehouse1").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("nodigitshere").is_err());
        assert!(validate_password("1234567890").is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Role names round-trip through parsing
        #[test]
        fn prop_role_round_trips(
            role in prop_oneof![
                Just(UserRole::Admin),
                Just(UserRole::InventoryManager),
                Just(UserRole::Staff),
            ]
        ) {
            let parsed: UserRole = role.as_str().parse().unwrap();
            prop_assert_eq!(parsed, role);
        }

        /// Any password passing validation has at least one letter and
        /// one digit
        #[test]
        fn prop_valid_password_shape(password in "[a-zA-Z0-9]{8,20}") {
            if validate_password(&password).is_ok() {
                prop_assert!(password.chars().any(|c| c.is_ascii_alphabetic()));
                prop_assert!(password.chars().any(|c| c.is_ascii_digit()));
            }
        }
    }
}
