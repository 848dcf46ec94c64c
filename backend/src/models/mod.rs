//! Database models for the StockMaster server
//!
//! Re-exports the warehouse domain types from the shared crate; the
//! service modules define their own row and response structs.

pub use shared::models::*;
