//! Warehouse domain models

pub mod adjustment;
pub mod delivery;
pub mod ledger;
pub mod receipt;
pub mod stock;
pub mod transfer;
pub mod user;
pub mod warehouse;

pub use adjustment::*;
pub use delivery::*;
pub use ledger::*;
pub use receipt::*;
pub use stock::*;
pub use transfer::*;
pub use user::*;
pub use warehouse::*;
