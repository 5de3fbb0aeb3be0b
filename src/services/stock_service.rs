// src/services/stock_service.rs

use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    db::StockStore,
    models::stock::{
        AdjustmentResult, ImportOutcome, ImportPreview, ImportReport, ImportStrategy,
        SortDirection, SortKey, StockFilter, StockItem,
    },
    services::{
        csv_export,
        csv_parser,
        reconciliation::{self, InventorySnapshot, ReconciliationPlan},
    },
};

/// Resultado da aplicação de um plano: o que aconteceu e o estoque relido.
#[derive(Debug, Clone)]
pub struct AppliedPlan {
    pub outcome: ImportOutcome,
    pub items: Vec<StockItem>,
}

#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn StockStore>,
    confirm_adjustments: bool,
    // Uma operação de escrita por vez (importação ou ajuste).
    busy: Arc<Mutex<()>>,
}

impl StockService {
    pub fn new(store: Arc<dyn StockStore>, confirm_adjustments: bool) -> Self {
        Self {
            store,
            confirm_adjustments,
            busy: Arc::new(Mutex::new(())),
        }
    }

    // --- LISTAGEM ---
    pub async fn list_items(&self, filter: &StockFilter) -> Result<Vec<StockItem>, AppError> {
        let items = self.store.select_all().await?;
        Ok(filter_items(items, filter))
    }

    // --- EXPORTAÇÃO ---
    /// Devolve (nome do arquivo, conteúdo CSV).
    pub async fn export(&self, filter: &StockFilter) -> Result<(&'static str, String), AppError> {
        let items = self.list_items(filter).await?;
        let filename = if filter.is_filtering() {
            csv_export::FILTERED_EXPORT_FILENAME
        } else {
            csv_export::FULL_EXPORT_FILENAME
        };
        Ok((filename, csv_export::export_csv(&items)))
    }

    // --- PRÉVIA (DRY RUN) ---
    pub async fn preview_import(
        &self,
        text: &str,
        strategy: ImportStrategy,
    ) -> Result<ImportPreview, AppError> {
        let parsed = csv_parser::parse_with_report(text);
        if parsed.is_empty() {
            return Err(AppError::InvalidImportFile);
        }

        let current = self.store.select_all().await?;
        let plan = reconciliation::plan(strategy, &InventorySnapshot::from_items(&current), &parsed.rows);
        let counts = plan.counts();

        Ok(ImportPreview {
            strategy,
            rows_parsed: parsed.rows.len(),
            rows_dropped: parsed.dropped,
            to_apply: plan.applied_count(),
            to_skip: plan.skipped_count(),
            estimated_created: counts.created,
            estimated_modified: counts.modified,
            rows: plan.rows_to_write(),
        })
    }

    // --- IMPORTAÇÃO ---
    // texto -> parser -> plano (contra o estoque atual) -> gravação -> releitura
    pub async fn import_csv(
        &self,
        text: &str,
        strategy: ImportStrategy,
    ) -> Result<ImportReport, AppError> {
        let _guard = self.busy.try_lock().map_err(|_| AppError::ImportInProgress)?;

        let parsed = csv_parser::parse_with_report(text);
        if parsed.is_empty() {
            tracing::warn!("Importação recusada: arquivo vazio ou cabeçalho inválido");
            return Err(AppError::InvalidImportFile);
        }

        let current = self.store.select_all().await?;
        let plan = reconciliation::plan(strategy, &InventorySnapshot::from_items(&current), &parsed.rows);

        tracing::info!(
            "📦 Importação '{}': {} linhas lidas, {} descartadas, {} a aplicar, {} ignoradas",
            strategy,
            parsed.rows.len(),
            parsed.dropped,
            plan.applied_count(),
            plan.skipped_count()
        );

        let applied = self.apply(&plan).await?;

        Ok(ImportReport {
            strategy,
            rows_parsed: parsed.rows.len(),
            rows_dropped: parsed.dropped,
            outcome: applied.outcome,
            items: applied.items,
        })
    }

    /// Executa um plano no armazenamento e relê o estoque.
    ///
    /// As contagens de criados/alterados saem da classificação do plano
    /// (estoque anterior ao lote), não do que o banco efetivamente fez.
    pub async fn apply(&self, plan: &ReconciliationPlan) -> Result<AppliedPlan, AppError> {
        // Plano vazio nunca escreve, nem mesmo no "substituir".
        let outcome = if plan.is_empty() {
            ImportOutcome::NothingToProcess {
                skipped: plan.skipped_count(),
            }
        } else if plan.strategy == ImportStrategy::ReplaceAll {
            let saved = self
                .store
                .replace_all(&plan.rows_to_write())
                .await
                .inspect_err(|e| tracing::error!("🔥 Falha ao substituir estoque: {}", e))?;
            ImportOutcome::Replaced { total: saved.len() }
        } else {
            let counts = plan.counts();
            self.store
                .upsert(&plan.rows_to_write())
                .await
                .inspect_err(|e| tracing::error!("🔥 Falha no upsert do estoque: {}", e))?;
            ImportOutcome::Applied {
                created: counts.created,
                modified: counts.modified,
                skipped: plan.skipped_count(),
            }
        };

        let items = self.store.select_all().await?;
        tracing::info!("✅ Plano '{}' aplicado: {:?}", plan.strategy, outcome);
        Ok(AppliedPlan { outcome, items })
    }

    // --- AJUSTE MANUAL (+1 / -1) ---
    // Um plano "definir" com uma única linha, passando pelo mesmo caminho da importação.
    pub async fn adjust_quantity(
        &self,
        sku: &str,
        delta: i64,
        confirmed: bool,
    ) -> Result<AdjustmentResult, AppError> {
        let _guard = self.busy.try_lock().map_err(|_| AppError::ImportInProgress)?;

        let current = self.store.select_all().await?;
        let snapshot = InventorySnapshot::from_items(&current);
        let item = snapshot
            .get(sku)
            .ok_or_else(|| AppError::StockItemNotFound(sku.to_string()))?;

        let previous_quantity = item.quantidade;
        let target = previous_quantity.saturating_add(delta).max(0);

        if self.confirm_adjustments && !confirmed {
            return Err(AppError::ConfirmationRequired {
                sku: sku.to_string(),
                from: previous_quantity,
                to: target,
            });
        }

        let plan = reconciliation::plan(
            ImportStrategy::Set,
            &snapshot,
            &[item.to_import_row(target)],
        );
        let applied = self.apply(&plan).await?;

        let item = applied
            .items
            .into_iter()
            .find(|i| i.sku == sku)
            .ok_or_else(|| AppError::StockItemNotFound(sku.to_string()))?;

        Ok(AdjustmentResult {
            previous_quantity,
            item,
        })
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Aplica busca, alerta de estoque baixo e ordenação.
pub fn filter_items(mut items: Vec<StockItem>, filter: &StockFilter) -> Vec<StockItem> {
    if let Some(needle) = filter
        .busca
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_lowercase)
    {
        items.retain(|i| {
            i.sku.to_lowercase().contains(&needle)
                || i.nome.to_lowercase().contains(&needle)
                || i.local.to_lowercase().contains(&needle)
        });
    }

    if let Some(threshold) = filter.estoque_baixo.filter(|t| *t > 0) {
        items.retain(|i| i.quantidade <= threshold);
    }

    let key = filter.ordenar.unwrap_or_default();
    let direction = filter.direcao.unwrap_or_default();
    items.sort_by(|a, b| {
        let ord = match key {
            SortKey::Sku => compare_text(&a.sku, &b.sku),
            SortKey::Nome => compare_text(&a.nome, &b.nome),
            SortKey::Local => compare_text(&a.local, &b.local),
            SortKey::Quantidade => a.quantidade.cmp(&b.quantidade),
        };
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    items
}
