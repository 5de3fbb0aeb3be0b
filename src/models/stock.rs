// src/models/stock.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// --- 1. Item de Estoque (tabela 'estoque') ---
// Uma linha por SKU. Datas e item_id são preenchidos pelo banco.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub item_id: Uuid,
    #[schema(example = "PAR-0001")]
    pub sku: String,
    #[schema(example = "Parafuso sextavado M8")]
    pub nome: String,
    pub descricao: Option<String>,
    #[schema(example = "Prateleira A3")]
    pub local: String,
    #[schema(example = 120)]
    pub quantidade: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// Linha de importação equivalente, com a quantidade trocada.
    pub fn to_import_row(&self, quantidade: i64) -> ImportRow {
        ImportRow {
            sku: self.sku.clone(),
            nome: self.nome.clone(),
            descricao: self.descricao.clone(),
            local: self.local.clone(),
            quantidade,
        }
    }
}

// --- 2. Linha de Importação (transitória) ---
// Sai do parser do CSV e nunca é persistida como está.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub sku: String,
    pub nome: String,
    pub descricao: Option<String>,
    pub local: String,
    pub quantidade: i64,
}

// --- 3. Estratégia de Importação ---
// Uma única estratégia vale para o lote inteiro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ImportStrategy {
    #[serde(rename = "definir")]
    Set, // Sobrescreve a quantidade (upsert)
    #[serde(rename = "entrada")]
    Increment, // Soma ao saldo atual
    #[serde(rename = "saida")]
    Decrement, // Subtrai, nunca abaixo de zero; ignora SKUs inexistentes
    #[serde(rename = "inserir")]
    InsertOnly, // Só SKUs novos
    #[serde(rename = "atualizar")]
    UpdateOnly, // Só SKUs já cadastrados
    #[serde(rename = "substituir")]
    ReplaceAll, // Apaga tudo e grava o arquivo como nova base
}

impl ImportStrategy {
    pub const ALL: [ImportStrategy; 6] = [
        ImportStrategy::Set,
        ImportStrategy::Increment,
        ImportStrategy::Decrement,
        ImportStrategy::InsertOnly,
        ImportStrategy::UpdateOnly,
        ImportStrategy::ReplaceAll,
    ];

    /// Identificador usado na API e nos logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStrategy::Set => "definir",
            ImportStrategy::Increment => "entrada",
            ImportStrategy::Decrement => "saida",
            ImportStrategy::InsertOnly => "inserir",
            ImportStrategy::UpdateOnly => "atualizar",
            ImportStrategy::ReplaceAll => "substituir",
        }
    }
}

impl std::fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- 4. Resultado de uma importação ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportOutcome {
    /// Nenhuma linha sobrou depois das regras da estratégia. Não é erro.
    NothingToProcess { skipped: usize },
    /// Upsert em lote. Contagem estimada contra o estoque anterior ao lote.
    Applied {
        created: usize,
        modified: usize,
        skipped: usize,
    },
    /// Troca completa da base (estratégia "substituir").
    Replaced { total: usize },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub strategy: ImportStrategy,
    pub rows_parsed: usize,
    /// Linhas descartadas no parser (SKU, nome ou local vazios).
    pub rows_dropped: usize,
    pub outcome: ImportOutcome,
    /// Estoque relido do banco depois da gravação.
    pub items: Vec<StockItem>,
}

// --- 5. Prévia (dry run) ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub strategy: ImportStrategy,
    pub rows_parsed: usize,
    pub rows_dropped: usize,
    pub to_apply: usize,
    pub to_skip: usize,
    pub estimated_created: usize,
    pub estimated_modified: usize,
    pub rows: Vec<ImportRow>,
}

// --- 6. Ajuste manual (+1 / -1) ---
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentResult {
    pub previous_quantity: i64,
    pub item: StockItem,
}

// --- 7. Filtros da listagem / exportação ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Sku,
    #[default]
    Nome,
    Local,
    Quantidade,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StockFilter {
    /// Busca por SKU, nome ou local (sem diferenciar maiúsculas).
    pub busca: Option<String>,
    /// Se maior que zero, mantém só itens com quantidade <= valor.
    pub estoque_baixo: Option<i64>,
    pub ordenar: Option<SortKey>,
    pub direcao: Option<SortDirection>,
}

impl StockFilter {
    /// true quando algum filtro de conteúdo está ativo (ordenação não conta).
    pub fn is_filtering(&self) -> bool {
        let has_search = self
            .busca
            .as_deref()
            .is_some_and(|b| !b.trim().is_empty());
        let has_low_stock = self.estoque_baixo.is_some_and(|t| t > 0);
        has_search || has_low_stock
    }
}
