//! Delivery order workflow types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Customer contact details embedded in a delivery order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
}

/// One outbound line with pick/pack progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryItem {
    pub product_id: Uuid,
    pub qty: i64,
    #[serde(default)]
    pub picked_qty: i64,
    #[serde(default)]
    pub packed_qty: i64,
}

/// Whether every line has been picked in full
pub fn all_picked(items: &[DeliveryItem]) -> bool {
    items.iter().all(|item| item.picked_qty >= item.qty)
}

/// Whether every line has been packed in full
pub fn all_packed(items: &[DeliveryItem]) -> bool {
    items.iter().all(|item| item.packed_qty >= item.qty)
}

/// Delivery order lifecycle
///
/// `draft → picking → packing → ready → done`. The `waiting` state is
/// accepted on input for compatibility but no transition produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Draft,
    Waiting,
    Picking,
    Packing,
    Ready,
    Done,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Draft => "draft",
            DeliveryStatus::Waiting => "waiting",
            DeliveryStatus::Picking => "picking",
            DeliveryStatus::Packing => "packing",
            DeliveryStatus::Ready => "ready",
            DeliveryStatus::Done => "done",
        }
    }

    /// Stock deduction only fires from `ready`
    pub fn can_complete(&self) -> bool {
        *self == DeliveryStatus::Ready
    }

    /// Edits are blocked once the order is done
    pub fn can_update(&self) -> bool {
        *self != DeliveryStatus::Done
    }

    /// Deletion is blocked once the order is done
    pub fn can_delete(&self) -> bool {
        *self != DeliveryStatus::Done
    }
}

/// Status after recording picking progress
pub fn status_after_picking(current: DeliveryStatus, items: &[DeliveryItem]) -> DeliveryStatus {
    let status = if current == DeliveryStatus::Draft {
        DeliveryStatus::Picking
    } else {
        current
    };
    if status == DeliveryStatus::Picking && all_picked(items) {
        DeliveryStatus::Packing
    } else {
        status
    }
}

/// Status after recording packing progress
pub fn status_after_packing(current: DeliveryStatus, items: &[DeliveryItem]) -> DeliveryStatus {
    if all_packed(items) {
        DeliveryStatus::Ready
    } else {
        current
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DeliveryStatus::Draft),
            "waiting" => Ok(DeliveryStatus::Waiting),
            "picking" => Ok(DeliveryStatus::Picking),
            "packing" => Ok(DeliveryStatus::Packing),
            "ready" => Ok(DeliveryStatus::Ready),
            "done" => Ok(DeliveryStatus::Done),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: i64, picked: i64, packed: i64) -> DeliveryItem {
        DeliveryItem {
            product_id: Uuid::nil(),
            qty,
            picked_qty: picked,
            packed_qty: packed,
        }
    }

    #[test]
    fn picking_starts_from_draft() {
        let items = [item(10, 2, 0)];
        assert_eq!(
            status_after_picking(DeliveryStatus::Draft, &items),
            DeliveryStatus::Picking
        );
    }

    #[test]
    fn fully_picked_advances_to_packing() {
        let items = [item(10, 10, 0), item(4, 5, 0)];
        assert_eq!(
            status_after_picking(DeliveryStatus::Draft, &items),
            DeliveryStatus::Packing
        );
        assert_eq!(
            status_after_picking(DeliveryStatus::Picking, &items),
            DeliveryStatus::Packing
        );
    }

    #[test]
    fn partial_pick_stays_picking() {
        let items = [item(10, 10, 0), item(4, 3, 0)];
        assert_eq!(
            status_after_picking(DeliveryStatus::Picking, &items),
            DeliveryStatus::Picking
        );
    }

    #[test]
    fn fully_packed_becomes_ready() {
        let items = [item(10, 10, 10)];
        assert_eq!(
            status_after_packing(DeliveryStatus::Packing, &items),
            DeliveryStatus::Ready
        );
    }

    #[test]
    fn partial_pack_keeps_status() {
        let items = [item(10, 10, 6)];
        assert_eq!(
            status_after_packing(DeliveryStatus::Packing, &items),
            DeliveryStatus::Packing
        );
    }

    #[test]
    fn only_ready_completes() {
        assert!(DeliveryStatus::Ready.can_complete());
        assert!(!DeliveryStatus::Packing.can_complete());
        assert!(!DeliveryStatus::Done.can_complete());
    }
}
