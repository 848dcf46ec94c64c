//! Shared types and domain logic for StockMaster
//!
//! This crate contains the warehouse domain model used by the backend:
//! status state machines, line-item types, document numbering, and
//! input validation helpers.

pub mod models;
pub mod numbering;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
