//! Delivery order workflow tests
//!
//! Covers pick/pack status advancement and the completion semantics:
//! deduction only from `ready`, insufficient stock aborts everything,
//! and a second completion is a state conflict that changes nothing.

use proptest::prelude::*;
use shared::{
    all_packed, all_picked, available_quantity, status_after_packing, status_after_picking,
    DeliveryItem, DeliveryStatus, TransactionType,
};
use std::collections::HashMap;
use uuid::Uuid;

type StockKey = (Uuid, Uuid, Uuid);

#[derive(Debug, Clone)]
struct LedgerRecord {
    product_id: Uuid,
    transaction_type: TransactionType,
    quantity_change: i64,
    quantity_after: i64,
}

/// In-memory stand-in for the stock store and ledger
#[derive(Debug, Default, Clone)]
struct World {
    /// key -> (quantity, reserved)
    stocks: HashMap<StockKey, (i64, i64)>,
    ledger: Vec<LedgerRecord>,
}

impl World {
    /// Complete a delivery the way the service does: all lines must be
    /// deliverable from the given stock or nothing applies.
    fn complete_delivery(
        &mut self,
        status: DeliveryStatus,
        warehouse_id: Uuid,
        location_id: Uuid,
        items: &[DeliveryItem],
    ) -> Result<DeliveryStatus, &'static str> {
        if !status.can_complete() {
            return Err("delivery must be ready to complete");
        }

        // Check every line before touching anything
        for item in items {
            let key = (item.product_id, warehouse_id, location_id);
            let (quantity, reserved) = self.stocks.get(&key).ok_or("stock not found")?;
            if available_quantity(*quantity, *reserved) < item.qty {
                return Err("insufficient stock");
            }
        }

        for item in items {
            let key = (item.product_id, warehouse_id, location_id);
            let entry = self.stocks.get_mut(&key).unwrap();
            entry.0 -= item.qty;
            self.ledger.push(LedgerRecord {
                product_id: item.product_id,
                transaction_type: TransactionType::Delivery,
                quantity_change: -item.qty,
                quantity_after: entry.0,
            });
        }

        Ok(DeliveryStatus::Done)
    }
}

fn item(product_id: Uuid, qty: i64, picked: i64, packed: i64) -> DeliveryItem {
    DeliveryItem {
        product_id,
        qty,
        picked_qty: picked,
        packed_qty: packed,
    }
}

// ============================================================================
// Pick/Pack Progression
// ============================================================================

#[cfg(test)]
mod progression_tests {
    use super::*;

    #[test]
    fn test_first_pick_starts_picking() {
        let items = [item(Uuid::new_v4(), 10, 3, 0)];
        assert_eq!(
            status_after_picking(DeliveryStatus::Draft, &items),
            DeliveryStatus::Picking
        );
    }

    #[test]
    fn test_full_pick_advances_to_packing() {
        let items = [
            item(Uuid::new_v4(), 10, 10, 0),
            item(Uuid::new_v4(), 5, 7, 0),
        ];
        assert!(all_picked(&items));
        assert_eq!(
            status_after_picking(DeliveryStatus::Picking, &items),
            DeliveryStatus::Packing
        );
    }

    #[test]
    fn test_partial_pick_stays_picking() {
        let items = [
            item(Uuid::new_v4(), 10, 10, 0),
            item(Uuid::new_v4(), 5, 4, 0),
        ];
        assert!(!all_picked(&items));
        assert_eq!(
            status_after_picking(DeliveryStatus::Picking, &items),
            DeliveryStatus::Picking
        );
    }

    #[test]
    fn test_full_pack_becomes_ready() {
        let items = [item(Uuid::new_v4(), 10, 10, 10)];
        assert!(all_packed(&items));
        assert_eq!(
            status_after_packing(DeliveryStatus::Packing, &items),
            DeliveryStatus::Ready
        );
    }

    #[test]
    fn test_partial_pack_keeps_status() {
        let items = [item(Uuid::new_v4(), 10, 10, 9)];
        assert_eq!(
            status_after_packing(DeliveryStatus::Packing, &items),
            DeliveryStatus::Packing
        );
    }

    /// No code path produces the `waiting` state; it survives only as an
    /// input value
    #[test]
    fn test_waiting_is_never_produced() {
        let empty = [item(Uuid::new_v4(), 10, 0, 0)];
        let picked = [item(Uuid::new_v4(), 10, 10, 0)];
        let packed = [item(Uuid::new_v4(), 10, 10, 10)];

        for status in [
            DeliveryStatus::Draft,
            DeliveryStatus::Picking,
            DeliveryStatus::Packing,
        ] {
            for items in [&empty, &picked, &packed] {
                assert_ne!(
                    status_after_picking(status, items.as_slice()),
                    DeliveryStatus::Waiting
                );
                assert_ne!(
                    status_after_packing(status, items.as_slice()),
                    DeliveryStatus::Waiting
                );
            }
        }
    }
}

// ============================================================================
// Completion
// ============================================================================

#[cfg(test)]
mod completion_tests {
    use super::*;

    /// End-to-end scenario: 50 on hand, deliver 20, balance 30, then a
    /// second completion fails and changes nothing
    #[test]
    fn test_complete_deducts_and_logs() {
        let mut world = World::default();
        let warehouse = Uuid::new_v4();
        let location = Uuid::new_v4();
        let product = Uuid::new_v4();
        world.stocks.insert((product, warehouse, location), (50, 0));

        let items = [item(product, 20, 20, 20)];
        let status = world
            .complete_delivery(DeliveryStatus::Ready, warehouse, location, &items)
            .unwrap();

        assert_eq!(status, DeliveryStatus::Done);
        let (quantity, reserved) = world.stocks[&(product, warehouse, location)];
        assert_eq!(quantity, 30);
        assert_eq!(reserved, 0);
        assert_eq!(available_quantity(quantity, reserved), 30);

        let entry = &world.ledger[0];
        assert_eq!(entry.transaction_type, TransactionType::Delivery);
        assert_eq!(entry.quantity_change, -20);
        assert_eq!(entry.quantity_after, 30);

        // Second completion: the order is done, nothing may change
        let before = world.clone();
        let result = world.complete_delivery(status, warehouse, location, &items);
        assert!(result.is_err());
        assert_eq!(world.stocks[&(product, warehouse, location)], (30, 0));
        assert_eq!(world.ledger.len(), before.ledger.len());
    }

    #[test]
    fn test_missing_stock_fails() {
        let mut world = World::default();
        let items = [item(Uuid::new_v4(), 5, 5, 5)];

        let result = world.complete_delivery(
            DeliveryStatus::Ready,
            Uuid::new_v4(),
            Uuid::new_v4(),
            &items,
        );

        assert!(result.is_err());
        assert!(world.ledger.is_empty());
    }

    /// Reserved units are not deliverable
    #[test]
    fn test_reservation_blocks_delivery() {
        let mut world = World::default();
        let warehouse = Uuid::new_v4();
        let location = Uuid::new_v4();
        let product = Uuid::new_v4();
        world.stocks.insert((product, warehouse, location), (50, 40));

        let items = [item(product, 20, 20, 20)];
        let result = world.complete_delivery(DeliveryStatus::Ready, warehouse, location, &items);

        assert!(result.is_err());
        assert_eq!(world.stocks[&(product, warehouse, location)], (50, 40));
    }

    /// One short line aborts the entire delivery, leaving every balance
    /// untouched
    #[test]
    fn test_insufficient_line_aborts_all() {
        let mut world = World::default();
        let warehouse = Uuid::new_v4();
        let location = Uuid::new_v4();
        let plentiful = Uuid::new_v4();
        let scarce = Uuid::new_v4();
        world.stocks.insert((plentiful, warehouse, location), (100, 0));
        world.stocks.insert((scarce, warehouse, location), (1, 0));

        let items = [item(plentiful, 10, 10, 10), item(scarce, 5, 5, 5)];
        let result = world.complete_delivery(DeliveryStatus::Ready, warehouse, location, &items);

        assert!(result.is_err());
        assert_eq!(world.stocks[&(plentiful, warehouse, location)], (100, 0));
        assert_eq!(world.stocks[&(scarce, warehouse, location)], (1, 0));
        assert!(world.ledger.is_empty());
    }

    #[test]
    fn test_only_ready_completes() {
        for status in [
            DeliveryStatus::Draft,
            DeliveryStatus::Waiting,
            DeliveryStatus::Picking,
            DeliveryStatus::Packing,
            DeliveryStatus::Done,
        ] {
            let mut world = World::default();
            let result =
                world.complete_delivery(status, Uuid::new_v4(), Uuid::new_v4(), &[]);
            assert!(result.is_err());
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Completed deliveries log exactly the negated item quantities
        #[test]
        fn prop_ledger_negates_items(
            quantities in prop::collection::vec(1i64..=100, 1..8)
        ) {
            let mut world = World::default();
            let warehouse = Uuid::new_v4();
            let location = Uuid::new_v4();

            let items: Vec<DeliveryItem> = quantities
                .iter()
                .map(|&qty| {
                    let product = Uuid::new_v4();
                    world.stocks.insert((product, warehouse, location), (qty + 50, 0));
                    item(product, qty, qty, qty)
                })
                .collect();

            world
                .complete_delivery(DeliveryStatus::Ready, warehouse, location, &items)
                .unwrap();

            let delivered: i64 = quantities.iter().sum();
            let logged: i64 = world.ledger.iter().map(|e| -e.quantity_change).sum();
            prop_assert_eq!(delivered, logged);
            prop_assert!(world.ledger.iter().all(|e| e.quantity_change < 0));
        }

        /// Pick progression is monotone: once packing, more picking input
        /// never moves the order backwards
        #[test]
        fn prop_picking_never_regresses(
            qty in 1i64..=50,
            picked in 0i64..=100,
        ) {
            let items = [item(Uuid::new_v4(), qty, picked, 0)];
            let status = status_after_picking(DeliveryStatus::Packing, &items);
            prop_assert_eq!(status, DeliveryStatus::Packing);
        }

        /// A failed completion is always a full no-op on the ledger
        #[test]
        fn prop_failed_completion_writes_nothing(
            qty in 1i64..=100,
            shortfall in 1i64..=100,
        ) {
            let mut world = World::default();
            let warehouse = Uuid::new_v4();
            let location = Uuid::new_v4();
            let product = Uuid::new_v4();
            world.stocks.insert((product, warehouse, location), (qty, 0));

            let items = [item(product, qty + shortfall, 0, 0)];
            let result =
                world.complete_delivery(DeliveryStatus::Ready, warehouse, location, &items);

            prop_assert!(result.is_err());
            prop_assert!(world.ledger.is_empty());
            prop_assert_eq!(world.stocks[&(product, warehouse, location)], (qty, 0));
        }
    }
}
