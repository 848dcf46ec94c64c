//! Goods receipt workflow types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Supplier contact details embedded in a receipt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Supplier {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

/// One inbound line: a product quantity bound for a target location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub product_id: Uuid,
    pub qty: i64,
    pub unit_price: Option<Decimal>,
    pub location_id: Uuid,
}

/// Receipt lifecycle
///
/// `draft → waiting → ready → done`; `canceled` is terminal and only
/// reachable through an explicit status edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Draft,
    Waiting,
    Ready,
    Done,
    Canceled,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Draft => "draft",
            ReceiptStatus::Waiting => "waiting",
            ReceiptStatus::Ready => "ready",
            ReceiptStatus::Done => "done",
            ReceiptStatus::Canceled => "canceled",
        }
    }

    /// Validation only fires from `waiting` or `ready`
    pub fn can_validate(&self) -> bool {
        matches!(self, ReceiptStatus::Waiting | ReceiptStatus::Ready)
    }

    /// Edits are blocked once the receipt is done or canceled
    pub fn can_update(&self) -> bool {
        !matches!(self, ReceiptStatus::Done | ReceiptStatus::Canceled)
    }

    /// Deletion is blocked once the receipt is done
    pub fn can_delete(&self) -> bool {
        *self != ReceiptStatus::Done
    }
}

impl FromStr for ReceiptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ReceiptStatus::Draft),
            "waiting" => Ok(ReceiptStatus::Waiting),
            "ready" => Ok(ReceiptStatus::Ready),
            "done" => Ok(ReceiptStatus::Done),
            "canceled" => Ok(ReceiptStatus::Canceled),
            other => Err(format!("unknown receipt status: {other}")),
        }
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_waiting_and_ready_validate() {
        assert!(ReceiptStatus::Waiting.can_validate());
        assert!(ReceiptStatus::Ready.can_validate());
        assert!(!ReceiptStatus::Draft.can_validate());
        assert!(!ReceiptStatus::Done.can_validate());
        assert!(!ReceiptStatus::Canceled.can_validate());
    }

    #[test]
    fn terminal_states_block_updates() {
        assert!(!ReceiptStatus::Done.can_update());
        assert!(!ReceiptStatus::Canceled.can_update());
        assert!(ReceiptStatus::Waiting.can_update());
    }

    #[test]
    fn done_blocks_delete_only() {
        assert!(!ReceiptStatus::Done.can_delete());
        assert!(ReceiptStatus::Canceled.can_delete());
    }
}
