// src/handlers/stock.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::stock::{
        AdjustmentResult, ImportPreview, ImportReport, ImportStrategy, StockFilter, StockItem,
    },
};

// ---
// Validação Customizada
// ---
// O ajuste manual só anda de um em um.
fn validate_nudge(delta: i64) -> Result<(), ValidationError> {
    if !matches!(delta, 1 | -1) {
        let mut err = ValidationError::new("delta");
        err.message = Some("O ajuste deve ser +1 ou -1.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImportParams {
    /// definir | entrada | saida | inserir | atualizar | substituir (padrão: definir)
    pub estrategia: Option<ImportStrategy>,
}

impl ImportParams {
    fn strategy(&self) -> ImportStrategy {
        self.estrategia.unwrap_or(ImportStrategy::Set)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustPayload {
    #[validate(custom(function = "validate_nudge"))]
    #[schema(example = 1)]
    pub delta: i64,

    // Sem confirmação o servidor devolve 409 com a pergunta (quando ligada)
    #[serde(default)]
    pub confirmado: bool,
}

// GET /api/estoque
#[utoipa::path(
    get,
    path = "/api/estoque",
    tag = "Estoque",
    params(StockFilter),
    responses(
        (status = 200, description = "Itens do estoque", body = Vec<StockItem>)
    )
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<StockFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .stock_service
        .list_items(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/estoque/importar
#[utoipa::path(
    post,
    path = "/api/estoque/importar",
    tag = "Estoque",
    params(ImportParams),
    request_body(content = String, content_type = "text/csv", description = "CSV com cabeçalho sku,nome,descricao,local,quantidade"),
    responses(
        (status = 200, description = "Importação aplicada", body = ImportReport),
        (status = 400, description = "Arquivo vazio ou formato inválido"),
        (status = 409, description = "Outra operação de estoque em andamento"),
        (status = 500, description = "Falha ao gravar no armazenamento")
    )
)]
pub async fn import_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ImportParams>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .stock_service
        .import_csv(&body, params.strategy())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/estoque/importar/previa
#[utoipa::path(
    post,
    path = "/api/estoque/importar/previa",
    tag = "Estoque",
    params(ImportParams),
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "O que a importação faria, sem gravar nada", body = ImportPreview),
        (status = 400, description = "Arquivo vazio ou formato inválido")
    )
)]
pub async fn preview_import(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ImportParams>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let preview = app_state
        .stock_service
        .preview_import(&body, params.strategy())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(preview)))
}

// POST /api/estoque/{sku}/ajuste
#[utoipa::path(
    post,
    path = "/api/estoque/{sku}/ajuste",
    tag = "Estoque",
    params(("sku" = String, Path, description = "SKU do item")),
    request_body = AdjustPayload,
    responses(
        (status = 200, description = "Quantidade ajustada", body = AdjustmentResult),
        (status = 400, description = "Delta diferente de +1/-1"),
        (status = 404, description = "SKU não encontrado"),
        (status = 409, description = "Confirmação necessária ou operação em andamento")
    )
)]
pub async fn adjust_quantity(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(sku): Path<String>,
    Json(payload): Json<AdjustPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .stock_service
        .adjust_quantity(&sku, payload.delta, payload.confirmado)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/estoque/exportar
#[utoipa::path(
    get,
    path = "/api/estoque/exportar",
    tag = "Estoque",
    params(StockFilter),
    responses(
        (status = 200, description = "CSV no formato de importação", content_type = "text/csv", body = String)
    )
)]
pub async fn export_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<StockFilter>,
) -> Result<Response, ApiError> {
    let (filename, csv) = app_state
        .stock_service
        .export(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Headers para o navegador baixar o arquivo
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];

    Ok((headers, csv).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nudge_accepts_only_plus_or_minus_one() {
        assert!(validate_nudge(1).is_ok());
        assert!(validate_nudge(-1).is_ok());
        assert!(validate_nudge(0).is_err());
        assert!(validate_nudge(5).is_err());
        assert!(validate_nudge(i64::MIN).is_err());
    }
}
