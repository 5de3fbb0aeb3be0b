// src/app.rs

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// Monta o router completo (rotas de estoque + Swagger).
pub fn build_app(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/estoque", get(handlers::stock::list_items))
        .route("/api/estoque/importar", post(handlers::stock::import_stock))
        .route("/api/estoque/importar/previa", post(handlers::stock::preview_import))
        .route("/api/estoque/exportar", get(handlers::stock::export_stock))
        .route("/api/estoque/{sku}/ajuste", post(handlers::stock::adjust_quantity))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
