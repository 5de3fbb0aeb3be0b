// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erros do domínio. Cada variante vira um ApiError localizado na borda HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Cabeçalho obrigatório ausente ou nenhuma linha aproveitável.
    #[error("Arquivo vazio ou formato inválido")]
    InvalidImportFile,

    #[error("SKU não encontrado: {0}")]
    StockItemNotFound(String),

    #[error("Confirmação necessária para o SKU {sku} ({from} -> {to})")]
    ConfirmationRequired { sku: String, from: i64, to: i64 },

    #[error("Já existe uma operação de estoque em andamento")]
    ImportInProgress,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Falha do armazenamento que não vem do sqlx (ex.: store em memória)
    #[error("Erro no armazenamento: {0}")]
    StoreError(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// O erro já traduzido, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Chave usada para buscar a mensagem no I18nStore.
    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::InvalidImportFile => "invalid_import_file",
            AppError::StockItemNotFound(_) => "stock_item_not_found",
            AppError::ConfirmationRequired { .. } => "confirmation_required",
            AppError::ImportInProgress => "import_in_progress",
            AppError::DatabaseError(_)
            | AppError::StoreError(_)
            | AppError::InternalServerError(_) => "import_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidImportFile => StatusCode::BAD_REQUEST,
            AppError::StockItemNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConfirmationRequired { .. } | AppError::ImportInProgress => {
                StatusCode::CONFLICT
            }
            AppError::DatabaseError(_)
            | AppError::StoreError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe vai pro log, o cliente só recebe a mensagem genérica.
            tracing::error!("🔥 Erro Interno do Servidor: {:?}", self);
        }

        let template = i18n.get(&locale.0, self.message_key());
        let message = match self {
            AppError::StockItemNotFound(sku) => template.replace("{sku}", sku),
            AppError::ConfirmationRequired { sku, from, to } => template
                .replace("{sku}", sku)
                .replace("{from}", &from.to_string())
                .replace("{to}", &to.to_string()),
            AppError::ValidationError(errors) => {
                let details: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, field_errors)| {
                        field_errors.iter().map(move |e| match &e.message {
                            Some(m) => format!("{field}: {m}"),
                            None => format!("{field}: {}", e.code),
                        })
                    })
                    .collect();
                format!("{template} {}", details.join("; "))
            }
            _ => template.to_string(),
        };

        ApiError { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

// Sem Locale disponível (ex.: fora de um handler) responde no idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::default())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_message_carries_the_numbers() {
        let err = AppError::ConfirmationRequired {
            sku: "A1".into(),
            from: 3,
            to: 2,
        };
        let api = err.to_api_error(&Locale("pt".into()), &I18nStore::default());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.message, "Atualizar quantidade do SKU A1 de 3 para 2?");
    }

    #[test]
    fn store_failures_hide_details_from_the_client() {
        let err = AppError::StoreError("connection reset".into());
        let api = err.to_api_error(&Locale("en".into()), &I18nStore::default());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("connection reset"));
    }

    #[test]
    fn invalid_file_is_a_bad_request() {
        let api = AppError::InvalidImportFile.to_api_error(&Locale::default(), &I18nStore::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "Arquivo vazio ou formato inválido");
    }
}
