//! Business logic services for the StockMaster server

pub mod adjustment;
pub mod auth;
pub mod delivery;
pub mod export;
pub mod ledger;
pub mod location;
pub mod numbering;
pub mod product;
pub mod receipt;
pub mod stock;
pub mod transfer;
pub mod warehouse;

pub use adjustment::AdjustmentService;
pub use auth::AuthService;
pub use delivery::DeliveryService;
pub use export::ExportService;
pub use ledger::LedgerService;
pub use location::LocationService;
pub use numbering::NumberingService;
pub use product::ProductService;
pub use receipt::ReceiptService;
pub use stock::StockService;
pub use transfer::TransferService;
pub use warehouse::WarehouseService;
