//! Document number formatting
//!
//! Workflow documents carry human-readable identifiers of the form
//! `{prefix}{YYYYMM}{NNNN}`, e.g. `WH/IN/2026080001`. The 4-digit
//! zero-padded suffix keeps lexicographic and numeric order aligned
//! within a month, so string sorting of numbers is safe.

/// Prefix for goods receipts
pub const RECEIPT_PREFIX: &str = "WH/IN/";
/// Prefix for delivery orders
pub const DELIVERY_PREFIX: &str = "WH/OUT/";
/// Prefix for internal transfers
pub const TRANSFER_PREFIX: &str = "WH/TR/";
/// Prefix for stock adjustments
pub const ADJUSTMENT_PREFIX: &str = "ADJ/";

/// Render the `YYYYMM` period component for a given year and month
pub fn period(year: i32, month: u32) -> String {
    format!("{year}{month:02}")
}

/// Period component for a calendar date
pub fn period_of(date: impl chrono::Datelike) -> String {
    period(date.year(), date.month())
}

/// Format a full document number from prefix, period, and sequence value
pub fn format_number(prefix: &str, period: &str, sequence: i64) -> String {
    format!("{prefix}{period}{sequence:04}")
}

/// Extract the numeric sequence from a document number (last 4 characters)
pub fn parse_sequence(number: &str) -> Option<i64> {
    let len = number.len();
    if len < 4 {
        return None;
    }
    number[len - 4..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_number(RECEIPT_PREFIX, "202608", 1), "WH/IN/2026080001");
        assert_eq!(format_number(ADJUSTMENT_PREFIX, "202612", 42), "ADJ/2026120042");
    }

    #[test]
    fn period_pads_month() {
        assert_eq!(period(2026, 8), "202608");
        assert_eq!(period(2026, 11), "202611");
    }

    #[test]
    fn sequence_round_trips() {
        let number = format_number(DELIVERY_PREFIX, "202601", 137);
        assert_eq!(parse_sequence(&number), Some(137));
    }

    #[test]
    fn parse_rejects_short_input() {
        assert_eq!(parse_sequence("001"), None);
    }
}
