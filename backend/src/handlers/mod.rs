//! HTTP handlers for the StockMaster server

pub mod adjustment;
pub mod auth;
pub mod delivery;
pub mod export;
pub mod health;
pub mod ledger;
pub mod location;
pub mod product;
pub mod receipt;
pub mod stock;
pub mod transfer;
pub mod warehouse;

pub use adjustment::*;
pub use auth::*;
pub use delivery::*;
pub use export::*;
pub use health::*;
pub use ledger::*;
pub use location::*;
pub use product::*;
pub use receipt::*;
pub use stock::*;
pub use transfer::*;
pub use warehouse::*;
