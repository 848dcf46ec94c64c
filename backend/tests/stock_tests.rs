//! Stock balance tests
//!
//! Covers the availability invariant (available = quantity - reserved),
//! sufficiency checks for outbound movements, and summary arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{available_quantity, has_sufficient_stock};
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_available_quantity() {
        assert_eq!(available_quantity(100, 30), 70);
        assert_eq!(available_quantity(50, 0), 50);
        assert_eq!(available_quantity(0, 0), 0);
    }

    #[test]
    fn test_fully_reserved_stock() {
        assert_eq!(available_quantity(25, 25), 0);
        assert!(!has_sufficient_stock(available_quantity(25, 25), 1));
    }

    #[test]
    fn test_sufficiency_boundary() {
        assert!(has_sufficient_stock(20, 20));
        assert!(has_sufficient_stock(21, 20));
        assert!(!has_sufficient_stock(19, 20));
    }

    #[test]
    fn test_summary_value() {
        // total value = Σ quantity × cost price
        let rows = [(50i64, dec("12.50")), (30, dec("4.00")), (0, dec("99.99"))];

        let total: Decimal = rows
            .iter()
            .map(|(qty, cost)| Decimal::from(*qty) * cost)
            .sum();

        assert_eq!(total, dec("745.00"));
    }

    #[test]
    fn test_summary_distinct_products() {
        // one product can hold stock at several locations
        let product_ids = ["a", "a", "b", "c", "b"];
        let distinct: std::collections::HashSet<&&str> = product_ids.iter().collect();
        assert_eq!(distinct.len(), 3);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// available == quantity - reserved, always
        #[test]
        fn prop_availability_invariant(
            quantity in 0i64..=1_000_000,
            reserved in 0i64..=1_000_000,
        ) {
            let available = available_quantity(quantity, reserved);
            prop_assert_eq!(available + reserved, quantity);
        }

        /// An outbound movement is allowed exactly when it fits the
        /// available quantity
        #[test]
        fn prop_sufficiency(
            quantity in 0i64..=10_000,
            reserved in 0i64..=10_000,
            requested in 1i64..=10_000,
        ) {
            let available = available_quantity(quantity, reserved);
            prop_assert_eq!(
                has_sufficient_stock(available, requested),
                requested <= quantity - reserved
            );
        }

        /// Reservations never change the on-hand quantity, only its
        /// availability
        #[test]
        fn prop_reservation_preserves_on_hand(
            quantity in 0i64..=10_000,
            reserved_before in 0i64..=5_000,
            reserved_after in 0i64..=5_000,
        ) {
            let before = available_quantity(quantity, reserved_before);
            let after = available_quantity(quantity, reserved_after);
            prop_assert_eq!(before + reserved_before, after + reserved_after);
        }
    }
}

// ============================================================================
// Administrative Override Semantics
// ============================================================================

#[cfg(test)]
mod override_tests {
    use super::*;

    /// Apply an administrative override to a (quantity, reserved) pair;
    /// omitted fields keep their previous value
    fn apply_override(
        current: (i64, i64),
        quantity: Option<i64>,
        reserved: Option<i64>,
    ) -> (i64, i64) {
        (
            quantity.unwrap_or(current.0),
            reserved.unwrap_or(current.1),
        )
    }

    #[test]
    fn test_override_sets_absolute_values() {
        let (qty, reserved) = apply_override((100, 10), Some(40), None);
        assert_eq!(qty, 40);
        assert_eq!(reserved, 10);
        assert_eq!(available_quantity(qty, reserved), 30);
    }

    #[test]
    fn test_override_without_fields_is_noop() {
        assert_eq!(apply_override((100, 10), None, None), (100, 10));
    }

    #[test]
    fn test_override_can_zero_a_balance() {
        let (qty, reserved) = apply_override((100, 10), Some(0), Some(0));
        assert_eq!(available_quantity(qty, reserved), 0);
    }
}
