//! Stock adjustment workflow types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Adjustment lifecycle: `pending → approved | rejected`, both terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdjustmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentStatus::Pending => "pending",
            AdjustmentStatus::Approved => "approved",
            AdjustmentStatus::Rejected => "rejected",
        }
    }

    /// Approve and reject both fire only from `pending`
    pub fn can_resolve(&self) -> bool {
        *self == AdjustmentStatus::Pending
    }

    pub fn can_update(&self) -> bool {
        *self == AdjustmentStatus::Pending
    }

    pub fn can_delete(&self) -> bool {
        *self != AdjustmentStatus::Approved
    }
}

/// Signed ledger delta produced by approving an adjustment
///
/// The stock quantity is set to the counted value; the ledger records the
/// difference against what the books said.
pub fn adjustment_difference(recorded_quantity: i64, counted_quantity: i64) -> i64 {
    counted_quantity - recorded_quantity
}

impl FromStr for AdjustmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AdjustmentStatus::Pending),
            "approved" => Ok(AdjustmentStatus::Approved),
            "rejected" => Ok(AdjustmentStatus::Rejected),
            other => Err(format!("unknown adjustment status: {other}")),
        }
    }
}

impl fmt::Display for AdjustmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_resolves() {
        assert!(AdjustmentStatus::Pending.can_resolve());
        assert!(!AdjustmentStatus::Approved.can_resolve());
        assert!(!AdjustmentStatus::Rejected.can_resolve());
    }

    #[test]
    fn difference_is_signed() {
        assert_eq!(adjustment_difference(30, 25), -5);
        assert_eq!(adjustment_difference(25, 30), 5);
        assert_eq!(adjustment_difference(40, 40), 0);
    }

    #[test]
    fn approved_blocks_delete() {
        assert!(!AdjustmentStatus::Approved.can_delete());
        assert!(AdjustmentStatus::Rejected.can_delete());
        assert!(AdjustmentStatus::Pending.can_delete());
    }
}
