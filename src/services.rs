pub mod csv_parser;
pub mod csv_export;
pub mod reconciliation;
pub use reconciliation::{InventorySnapshot, ReconciliationPlan};
pub mod stock_service;
pub use stock_service::StockService;
