pub mod stock;
pub use stock::{
    AdjustmentResult, ImportOutcome, ImportPreview, ImportReport, ImportRow, ImportStrategy,
    SortDirection, SortKey, StockFilter, StockItem,
};
