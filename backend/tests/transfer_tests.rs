//! Internal transfer workflow tests
//!
//! A completed transfer deducts the source balance and credits the
//! destination, writing two mirrored ledger entries per line. The whole
//! move is all-or-nothing.

use proptest::prelude::*;
use shared::{available_quantity, TransactionType, TransferItem, TransferStatus};
use std::collections::HashMap;
use uuid::Uuid;

type StockKey = (Uuid, Uuid, Uuid);

#[derive(Debug, Clone)]
struct LedgerRecord {
    product_id: Uuid,
    warehouse_id: Uuid,
    location_id: Uuid,
    transaction_type: TransactionType,
    quantity_change: i64,
    quantity_after: i64,
}

#[derive(Debug, Default, Clone)]
struct World {
    stocks: HashMap<StockKey, (i64, i64)>,
    ledger: Vec<LedgerRecord>,
}

/// Source and destination endpoints of a transfer
#[derive(Debug, Clone, Copy)]
struct Endpoints {
    source_warehouse: Uuid,
    source_location: Uuid,
    destination_warehouse: Uuid,
    destination_location: Uuid,
}

impl Endpoints {
    fn random() -> Self {
        Self {
            source_warehouse: Uuid::new_v4(),
            source_location: Uuid::new_v4(),
            destination_warehouse: Uuid::new_v4(),
            destination_location: Uuid::new_v4(),
        }
    }
}

impl World {
    /// Complete a transfer the way the service does: every source line
    /// must be available or nothing moves.
    fn complete_transfer(
        &mut self,
        status: TransferStatus,
        endpoints: Endpoints,
        items: &[TransferItem],
    ) -> Result<TransferStatus, &'static str> {
        if !status.can_complete() {
            return Err("transfer must be in pending status");
        }

        for item in items {
            let key = (
                item.product_id,
                endpoints.source_warehouse,
                endpoints.source_location,
            );
            let (quantity, reserved) = self.stocks.get(&key).ok_or("source stock not found")?;
            if available_quantity(*quantity, *reserved) < item.qty {
                return Err("insufficient stock at source");
            }
        }

        for item in items {
            let source_key = (
                item.product_id,
                endpoints.source_warehouse,
                endpoints.source_location,
            );
            let source = self.stocks.get_mut(&source_key).unwrap();
            source.0 -= item.qty;
            let source_after = source.0;
            self.ledger.push(LedgerRecord {
                product_id: item.product_id,
                warehouse_id: endpoints.source_warehouse,
                location_id: endpoints.source_location,
                transaction_type: TransactionType::Transfer,
                quantity_change: -item.qty,
                quantity_after: source_after,
            });

            let dest_key = (
                item.product_id,
                endpoints.destination_warehouse,
                endpoints.destination_location,
            );
            let dest = self.stocks.entry(dest_key).or_insert((0, 0));
            dest.0 += item.qty;
            let dest_after = dest.0;
            self.ledger.push(LedgerRecord {
                product_id: item.product_id,
                warehouse_id: endpoints.destination_warehouse,
                location_id: endpoints.destination_location,
                transaction_type: TransactionType::Transfer,
                quantity_change: item.qty,
                quantity_after: dest_after,
            });
        }

        Ok(TransferStatus::Completed)
    }
}

fn item(product_id: Uuid, qty: i64) -> TransferItem {
    TransferItem { product_id, qty }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_complete_moves_stock() {
        let mut world = World::default();
        let endpoints = Endpoints::random();
        let product = Uuid::new_v4();
        world.stocks.insert(
            (product, endpoints.source_warehouse, endpoints.source_location),
            (40, 0),
        );

        let status = world
            .complete_transfer(TransferStatus::Pending, endpoints, &[item(product, 15)])
            .unwrap();

        assert_eq!(status, TransferStatus::Completed);
        assert_eq!(
            world.stocks
                [&(product, endpoints.source_warehouse, endpoints.source_location)],
            (25, 0)
        );
        assert_eq!(
            world.stocks[&(
                product,
                endpoints.destination_warehouse,
                endpoints.destination_location
            )],
            (15, 0)
        );
    }

    /// Two entries per line: source-out then destination-in, each
    /// snapshotting its own side's balance
    #[test]
    fn test_two_ledger_entries_per_line() {
        let mut world = World::default();
        let endpoints = Endpoints::random();
        let product = Uuid::new_v4();
        world.stocks.insert(
            (product, endpoints.source_warehouse, endpoints.source_location),
            (40, 0),
        );

        world
            .complete_transfer(TransferStatus::Pending, endpoints, &[item(product, 15)])
            .unwrap();

        assert_eq!(world.ledger.len(), 2);

        let out = &world.ledger[0];
        assert_eq!(out.quantity_change, -15);
        assert_eq!(out.quantity_after, 25);
        assert_eq!(out.location_id, endpoints.source_location);

        let inbound = &world.ledger[1];
        assert_eq!(inbound.quantity_change, 15);
        assert_eq!(inbound.quantity_after, 15);
        assert_eq!(inbound.location_id, endpoints.destination_location);

        assert!(world
            .ledger
            .iter()
            .all(|e| e.transaction_type == TransactionType::Transfer));
    }

    #[test]
    fn test_missing_source_stock_fails() {
        let mut world = World::default();
        let endpoints = Endpoints::random();

        let result = world.complete_transfer(
            TransferStatus::Pending,
            endpoints,
            &[item(Uuid::new_v4(), 5)],
        );

        assert!(result.is_err());
        assert!(world.ledger.is_empty());
    }

    #[test]
    fn test_insufficient_source_aborts_all_lines() {
        let mut world = World::default();
        let endpoints = Endpoints::random();
        let plentiful = Uuid::new_v4();
        let scarce = Uuid::new_v4();
        world.stocks.insert(
            (plentiful, endpoints.source_warehouse, endpoints.source_location),
            (100, 0),
        );
        world.stocks.insert(
            (scarce, endpoints.source_warehouse, endpoints.source_location),
            (2, 0),
        );

        let result = world.complete_transfer(
            TransferStatus::Pending,
            endpoints,
            &[item(plentiful, 10), item(scarce, 5)],
        );

        assert!(result.is_err());
        assert_eq!(
            world.stocks
                [&(plentiful, endpoints.source_warehouse, endpoints.source_location)],
            (100, 0)
        );
        assert!(world.ledger.is_empty());
    }

    #[test]
    fn test_only_pending_completes() {
        for status in [
            TransferStatus::Draft,
            TransferStatus::Completed,
            TransferStatus::Canceled,
        ] {
            let mut world = World::default();
            let result = world.complete_transfer(status, Endpoints::random(), &[]);
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

        /// A transfer conserves total stock: whatever leaves the source
        /// arrives at the destination
        #[test]
        fn prop_transfer_conserves_quantity(
            quantities in prop::collection::vec(1i64..=100, 1..8)
        ) {
            let mut world = World::default();
            let endpoints = Endpoints::random();

            let items: Vec<TransferItem> = quantities
                .iter()
                .map(|&qty| {
                    let product = Uuid::new_v4();
                    world.stocks.insert(
                        (product, endpoints.source_warehouse, endpoints.source_location),
                        (qty + 10, 0),
                    );
                    item(product, qty)
                })
                .collect();

            let total_before: i64 = world.stocks.values().map(|(q, _)| q).sum();

            world
                .complete_transfer(TransferStatus::Pending, endpoints, &items)
                .unwrap();

            let total_after: i64 = world.stocks.values().map(|(q, _)| q).sum();
            prop_assert_eq!(total_before, total_after);
        }

        /// Ledger entries mirror each other exactly: per line, one entry
        /// of -qty at the source and one of +qty at the destination
        #[test]
        fn prop_ledger_entries_mirror(
            quantities in prop::collection::vec(1i64..=100, 1..8)
        ) {
            let mut world = World::default();
            let endpoints = Endpoints::random();

            let items: Vec<TransferItem> = quantities
                .iter()
                .map(|&qty| {
                    let product = Uuid::new_v4();
                    world.stocks.insert(
                        (product, endpoints.source_warehouse, endpoints.source_location),
                        (qty, 0),
                    );
                    item(product, qty)
                })
                .collect();

            world
                .complete_transfer(TransferStatus::Pending, endpoints, &items)
                .unwrap();

            prop_assert_eq!(world.ledger.len(), 2 * items.len());
            let net: i64 = world.ledger.iter().map(|e| e.quantity_change).sum();
            prop_assert_eq!(net, 0);

            for pair in world.ledger.chunks(2) {
                prop_assert_eq!(pair[0].product_id, pair[1].product_id);
                prop_assert_eq!(pair[0].quantity_change, -pair[1].quantity_change);
            }
        }
    }
}
