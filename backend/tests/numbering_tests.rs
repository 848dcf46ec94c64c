//! Document numbering tests
//!
//! The numbering service issues `{prefix}{YYYYMM}{NNNN}` identifiers from
//! an atomic counter; these tests cover the pure formatting layer and the
//! ordering guarantees the format provides.

use proptest::prelude::*;
use shared::numbering::{
    format_number, parse_sequence, period, ADJUSTMENT_PREFIX, DELIVERY_PREFIX, RECEIPT_PREFIX,
    TRANSFER_PREFIX,
};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_known_prefixes() {
        assert_eq!(RECEIPT_PREFIX, "WH/IN/");
        assert_eq!(DELIVERY_PREFIX, "WH/OUT/");
        assert_eq!(TRANSFER_PREFIX, "WH/TR/");
        assert_eq!(ADJUSTMENT_PREFIX, "ADJ/");
    }

    #[test]
    fn test_first_number_of_month() {
        assert_eq!(format_number(RECEIPT_PREFIX, "202601", 1), "WH/IN/2026010001");
    }

    #[test]
    fn test_sequence_is_zero_padded() {
        assert_eq!(format_number(ADJUSTMENT_PREFIX, "202608", 7), "ADJ/2026080007");
        assert_eq!(format_number(ADJUSTMENT_PREFIX, "202608", 123), "ADJ/2026080123");
        assert_eq!(format_number(ADJUSTMENT_PREFIX, "202608", 9999), "ADJ/2026089999");
    }

    #[test]
    fn test_period_formatting() {
        assert_eq!(period(2026, 1), "202601");
        assert_eq!(period(2026, 12), "202612");
    }

    #[test]
    fn test_parse_sequence_round_trip() {
        for sequence in [1, 42, 500, 9999] {
            let number = format_number(TRANSFER_PREFIX, "202603", sequence);
            assert_eq!(parse_sequence(&number), Some(sequence));
        }
    }

    #[test]
    fn test_parse_sequence_rejects_garbage() {
        assert_eq!(parse_sequence("abc"), None);
        assert_eq!(parse_sequence("WH/IN/202601000X"), None);
    }

    /// Sequential issuing within a month yields strictly increasing,
    /// unique identifiers
    #[test]
    fn test_sequential_numbers_increase() {
        let numbers: Vec<String> = (1..=20)
            .map(|seq| format_number(RECEIPT_PREFIX, "202608", seq))
            .collect();

        for pair in numbers.windows(2) {
            assert!(pair[0] < pair[1]);
        }

        let unique: std::collections::HashSet<&String> = numbers.iter().collect();
        assert_eq!(unique.len(), numbers.len());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn prefix_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just(RECEIPT_PREFIX),
            Just(DELIVERY_PREFIX),
            Just(TRANSFER_PREFIX),
            Just(ADJUSTMENT_PREFIX),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The fixed-width suffix keeps lexicographic and numeric order
        /// aligned within one prefix and month
        #[test]
        fn prop_lexicographic_matches_numeric(
            prefix in prefix_strategy(),
            a in 1i64..=9999,
            b in 1i64..=9999,
        ) {
            let period = period(2026, 8);
            let number_a = format_number(prefix, &period, a);
            let number_b = format_number(prefix, &period, b);

            prop_assert_eq!(a.cmp(&b), number_a.cmp(&number_b));
        }

        /// Formatting then parsing recovers the sequence
        #[test]
        fn prop_sequence_round_trips(
            prefix in prefix_strategy(),
            year in 2020i32..=2099,
            month in 1u32..=12,
            sequence in 1i64..=9999,
        ) {
            let number = format_number(prefix, &period(year, month), sequence);
            prop_assert_eq!(parse_sequence(&number), Some(sequence));
        }

        /// Identifiers from different sequences never collide
        #[test]
        fn prop_distinct_sequences_distinct_numbers(
            prefix in prefix_strategy(),
            a in 1i64..=9999,
            b in 1i64..=9999,
        ) {
            prop_assume!(a != b);
            let period = period(2026, 8);
            prop_assert_ne!(
                format_number(prefix, &period, a),
                format_number(prefix, &period, b)
            );
        }
    }
}
