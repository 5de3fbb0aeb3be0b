// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- ESTOQUE ---
        handlers::stock::list_items,
        handlers::stock::import_stock,
        handlers::stock::preview_import,
        handlers::stock::adjust_quantity,
        handlers::stock::export_stock,
    ),
    components(
        schemas(
            // --- Estoque ---
            models::stock::StockItem,
            models::stock::ImportRow,
            models::stock::ImportStrategy,
            models::stock::ImportOutcome,
            models::stock::ImportReport,
            models::stock::ImportPreview,
            models::stock::AdjustmentResult,
            models::stock::SortKey,
            models::stock::SortDirection,

            // --- PAYLOADS ---
            handlers::stock::AdjustPayload,
        )
    ),
    tags(
        (name = "Estoque", description = "Importação, ajuste e exportação do estoque")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stock_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/estoque",
            "/api/estoque/importar",
            "/api/estoque/importar/previa",
            "/api/estoque/{sku}/ajuste",
            "/api/estoque/exportar",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota sem documentação: {path}");
        }
    }
}
