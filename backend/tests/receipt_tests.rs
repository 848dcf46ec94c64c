//! Goods receipt workflow tests
//!
//! Covers the receipt state machine and the all-or-nothing validation
//! semantics: every line books into stock exactly once with a matching
//! ledger entry, and a line targeting a foreign location aborts the whole
//! operation before any stock is touched.

use proptest::prelude::*;
use shared::{ReceiptItem, ReceiptStatus, TransactionType};
use std::collections::HashMap;
use uuid::Uuid;

/// (product, warehouse, location)
type StockKey = (Uuid, Uuid, Uuid);

#[derive(Debug, Clone, PartialEq)]
struct LedgerRecord {
    product_id: Uuid,
    warehouse_id: Uuid,
    location_id: Uuid,
    transaction_type: TransactionType,
    quantity_change: i64,
    quantity_after: i64,
}

/// In-memory stand-in for the stock store and ledger
#[derive(Debug, Default, Clone)]
struct World {
    stocks: HashMap<StockKey, i64>,
    ledger: Vec<LedgerRecord>,
    /// location -> owning warehouse
    locations: HashMap<Uuid, Uuid>,
}

impl World {
    fn add_location(&mut self, warehouse_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.locations.insert(id, warehouse_id);
        id
    }

    /// Validate a receipt the way the service does: check every line's
    /// location first, then apply all lines, or apply nothing.
    fn validate_receipt(
        &mut self,
        status: ReceiptStatus,
        warehouse_id: Uuid,
        items: &[ReceiptItem],
    ) -> Result<ReceiptStatus, &'static str> {
        if !status.can_validate() {
            return Err("receipt must be in waiting or ready status");
        }
        if items.is_empty() {
            return Err("receipt has no line items");
        }
        for item in items {
            match self.locations.get(&item.location_id) {
                Some(owner) if *owner == warehouse_id => {}
                Some(_) => return Err("location does not belong to the receipt warehouse"),
                None => return Err("location not found"),
            }
        }

        for item in items {
            let key = (item.product_id, warehouse_id, item.location_id);
            let quantity = self.stocks.entry(key).or_insert(0);
            *quantity += item.qty;
            self.ledger.push(LedgerRecord {
                product_id: item.product_id,
                warehouse_id,
                location_id: item.location_id,
                transaction_type: TransactionType::Receipt,
                quantity_change: item.qty,
                quantity_after: *quantity,
            });
        }

        Ok(ReceiptStatus::Done)
    }
}

fn item(product_id: Uuid, qty: i64, location_id: Uuid) -> ReceiptItem {
    ReceiptItem {
        product_id,
        qty,
        unit_price: None,
        location_id,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// End-to-end scenario: one item of 50 units into an empty warehouse
    #[test]
    fn test_validate_books_stock_and_ledger() {
        let mut world = World::default();
        let warehouse = Uuid::new_v4();
        let location = world.add_location(warehouse);
        let product = Uuid::new_v4();

        let status = world
            .validate_receipt(
                ReceiptStatus::Waiting,
                warehouse,
                &[item(product, 50, location)],
            )
            .unwrap();

        assert_eq!(status, ReceiptStatus::Done);
        assert_eq!(world.stocks[&(product, warehouse, location)], 50);
        assert_eq!(world.ledger.len(), 1);

        let entry = &world.ledger[0];
        assert_eq!(entry.transaction_type, TransactionType::Receipt);
        assert_eq!(entry.quantity_change, 50);
        assert_eq!(entry.quantity_after, 50);
        assert_eq!(entry.location_id, location);
    }

    #[test]
    fn test_validate_increments_existing_stock() {
        let mut world = World::default();
        let warehouse = Uuid::new_v4();
        let location = world.add_location(warehouse);
        let product = Uuid::new_v4();
        world.stocks.insert((product, warehouse, location), 30);

        world
            .validate_receipt(
                ReceiptStatus::Ready,
                warehouse,
                &[item(product, 20, location)],
            )
            .unwrap();

        assert_eq!(world.stocks[&(product, warehouse, location)], 50);
        assert_eq!(world.ledger[0].quantity_after, 50);
    }

    /// A line targeting a location of another warehouse aborts the whole
    /// validation; earlier lines must not have been applied
    #[test]
    fn test_foreign_location_aborts_without_mutation() {
        let mut world = World::default();
        let warehouse = Uuid::new_v4();
        let other_warehouse = Uuid::new_v4();
        let good_location = world.add_location(warehouse);
        let foreign_location = world.add_location(other_warehouse);
        let product = Uuid::new_v4();

        let result = world.validate_receipt(
            ReceiptStatus::Waiting,
            warehouse,
            &[
                item(product, 10, good_location),
                item(product, 5, foreign_location),
            ],
        );

        assert!(result.is_err());
        assert!(world.stocks.is_empty());
        assert!(world.ledger.is_empty());
    }

    #[test]
    fn test_draft_receipt_cannot_validate() {
        let mut world = World::default();
        let warehouse = Uuid::new_v4();
        let location = world.add_location(warehouse);
        let product = Uuid::new_v4();

        let result = world.validate_receipt(
            ReceiptStatus::Draft,
            warehouse,
            &[item(product, 10, location)],
        );

        assert!(result.is_err());
        assert!(world.ledger.is_empty());
    }

    #[test]
    fn test_done_receipt_cannot_validate_again() {
        assert!(!ReceiptStatus::Done.can_validate());
        assert!(!ReceiptStatus::Canceled.can_validate());
    }

    #[test]
    fn test_empty_receipt_rejected() {
        let mut world = World::default();
        let warehouse = Uuid::new_v4();

        let result = world.validate_receipt(ReceiptStatus::Waiting, warehouse, &[]);
        assert!(result.is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn qty_strategy() -> impl Strategy<Value = i64> {
        1i64..=1_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The sum of item quantities equals the sum of positive receipt
        /// ledger changes created by the validation
        #[test]
        fn prop_ledger_matches_items(quantities in prop::collection::vec(qty_strategy(), 1..10)) {
            let mut world = World::default();
            let warehouse = Uuid::new_v4();
            let location = world.add_location(warehouse);

            let items: Vec<ReceiptItem> = quantities
                .iter()
                .map(|&qty| item(Uuid::new_v4(), qty, location))
                .collect();

            world
                .validate_receipt(ReceiptStatus::Waiting, warehouse, &items)
                .unwrap();

            let item_total: i64 = quantities.iter().sum();
            let ledger_total: i64 = world
                .ledger
                .iter()
                .filter(|e| e.transaction_type == TransactionType::Receipt)
                .filter(|e| e.quantity_change > 0)
                .map(|e| e.quantity_change)
                .sum();

            prop_assert_eq!(item_total, ledger_total);
            prop_assert_eq!(world.ledger.len(), items.len());
        }

        /// Each ledger entry snapshots the balance immediately after its
        /// own change
        #[test]
        fn prop_quantity_after_tracks_running_balance(
            quantities in prop::collection::vec(qty_strategy(), 1..10)
        ) {
            let mut world = World::default();
            let warehouse = Uuid::new_v4();
            let location = world.add_location(warehouse);
            let product = Uuid::new_v4();

            let items: Vec<ReceiptItem> = quantities
                .iter()
                .map(|&qty| item(product, qty, location))
                .collect();

            world
                .validate_receipt(ReceiptStatus::Waiting, warehouse, &items)
                .unwrap();

            let mut running = 0;
            for entry in &world.ledger {
                running += entry.quantity_change;
                prop_assert_eq!(entry.quantity_after, running);
            }
            prop_assert_eq!(world.stocks[&(product, warehouse, location)], running);
        }

        /// Validation from any non-validatable status leaves the world
        /// untouched
        #[test]
        fn prop_invalid_status_never_mutates(qty in qty_strategy()) {
            for status in [ReceiptStatus::Draft, ReceiptStatus::Done, ReceiptStatus::Canceled] {
                let mut world = World::default();
                let warehouse = Uuid::new_v4();
                let location = world.add_location(warehouse);

                let result = world.validate_receipt(
                    status,
                    warehouse,
                    &[item(Uuid::new_v4(), qty, location)],
                );

                prop_assert!(result.is_err());
                prop_assert!(world.stocks.is_empty());
                prop_assert!(world.ledger.is_empty());
            }
        }
    }
}
