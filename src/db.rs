pub mod stock_store;
pub use stock_store::StockStore;
pub mod stock_repo;
pub use stock_repo::StockRepository;
pub mod memory_store;
pub use memory_store::InMemoryStockStore;
