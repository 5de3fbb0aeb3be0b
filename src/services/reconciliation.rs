// src/services/reconciliation.rs
//
// Planejamento da importação de estoque. Tudo aqui é puro: recebe a foto do
// estoque atual e as linhas do CSV, devolve o que deve ser gravado. Nenhum
// acesso ao banco.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::stock::{ImportRow, ImportStrategy, StockItem};

/// Foto somente-leitura do estoque, indexada por SKU.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot<'a> {
    by_sku: HashMap<&'a str, &'a StockItem>,
}

impl<'a> InventorySnapshot<'a> {
    /// O banco garante SKU único; se vier repetido, o último prevalece.
    pub fn from_items(items: &'a [StockItem]) -> Self {
        let by_sku = items.iter().map(|i| (i.sku.as_str(), i)).collect();
        Self { by_sku }
    }

    pub fn get(&self, sku: &str) -> Option<&'a StockItem> {
        self.by_sku.get(sku).copied()
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.by_sku.contains_key(sku)
    }

    pub fn len(&self) -> usize {
        self.by_sku.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sku.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Apply,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Create,
    Modify,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// Linha como será gravada (quantidade já calculada pela estratégia).
    pub row: ImportRow,
    pub disposition: Disposition,
    /// Calculada contra a foto anterior ao lote, nunca contra o próprio plano.
    pub classification: Classification,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanCounts {
    pub created: usize,
    pub modified: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    pub strategy: ImportStrategy,
    pub entries: Vec<PlanEntry>,
}

impl ReconciliationPlan {
    pub fn applied(&self) -> impl DoubleEndedIterator<Item = &PlanEntry> {
        self.entries
            .iter()
            .filter(|e| e.disposition == Disposition::Apply)
    }

    pub fn applied_count(&self) -> usize {
        self.applied().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.len() - self.applied_count()
    }

    /// Plano vazio: nada a gravar. Para o chamador isso é sucesso sem efeito.
    pub fn is_empty(&self) -> bool {
        self.applied_count() == 0
    }

    /// Estimativa de criados/alterados, uma por entrada aplicada. SKU repetido
    /// no lote conta mais de uma vez.
    pub fn counts(&self) -> PlanCounts {
        self.applied()
            .fold(PlanCounts::default(), |mut acc, e| {
                match e.classification {
                    Classification::Create => acc.created += 1,
                    Classification::Modify => acc.modified += 1,
                }
                acc
            })
    }

    /// Linhas que vão para o upsert, uma por SKU. A última ocorrência no
    /// arquivo vence; a ordem segue a posição dessa última ocorrência.
    pub fn rows_to_write(&self) -> Vec<ImportRow> {
        let mut seen = HashSet::new();
        let mut rows: Vec<ImportRow> = self
            .applied()
            .rev()
            .filter(|e| seen.insert(e.row.sku.as_str()))
            .map(|e| e.row.clone())
            .collect();
        rows.reverse();
        rows
    }
}

/// Monta o plano de importação para a estratégia escolhida.
pub fn plan(
    strategy: ImportStrategy,
    current: &InventorySnapshot<'_>,
    rows: &[ImportRow],
) -> ReconciliationPlan {
    let entries = rows
        .iter()
        .map(|row| plan_row(strategy, current, row))
        .collect();

    ReconciliationPlan { strategy, entries }
}

fn plan_row(strategy: ImportStrategy, current: &InventorySnapshot<'_>, row: &ImportRow) -> PlanEntry {
    let existing = current.get(&row.sku);
    let classification = match existing {
        Some(_) => Classification::Modify,
        None => Classification::Create,
    };
    let entry = |quantidade: i64, disposition: Disposition| PlanEntry {
        row: ImportRow {
            quantidade,
            ..row.clone()
        },
        disposition,
        classification,
    };

    match (strategy, existing) {
        (ImportStrategy::Set, _) => entry(row.quantidade, Disposition::Apply),

        (ImportStrategy::Increment, Some(item)) => {
            entry(item.quantidade.saturating_add(row.quantidade), Disposition::Apply)
        }
        (ImportStrategy::Increment, None) => entry(row.quantidade, Disposition::Apply),

        (ImportStrategy::Decrement, Some(item)) => {
            entry((item.quantidade - row.quantidade).max(0), Disposition::Apply)
        }
        // Saída de um SKU que não existe não cria nada
        (ImportStrategy::Decrement, None) => entry(row.quantidade, Disposition::Skip),

        (ImportStrategy::InsertOnly, None) => entry(row.quantidade, Disposition::Apply),
        (ImportStrategy::InsertOnly, Some(_)) => entry(row.quantidade, Disposition::Skip),

        (ImportStrategy::UpdateOnly, Some(_)) => entry(row.quantidade, Disposition::Apply),
        (ImportStrategy::UpdateOnly, None) => entry(row.quantidade, Disposition::Skip),

        // "substituir" apaga tudo antes: toda linha vira item novo.
        (ImportStrategy::ReplaceAll, _) => PlanEntry {
            row: row.clone(),
            disposition: Disposition::Apply,
            classification: Classification::Create,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(sku: &str, quantidade: i64) -> StockItem {
        let now = Utc::now();
        StockItem {
            item_id: Uuid::new_v4(),
            sku: sku.to_string(),
            nome: format!("Item {sku}"),
            descricao: None,
            local: "A1".to_string(),
            quantidade,
            created_at: now,
            updated_at: now,
        }
    }

    fn row(sku: &str, quantidade: i64) -> ImportRow {
        ImportRow {
            sku: sku.to_string(),
            nome: format!("Item {sku}"),
            descricao: None,
            local: "A1".to_string(),
            quantidade,
        }
    }

    fn inventory() -> Vec<StockItem> {
        vec![item("A", 10), item("B", 3)]
    }

    fn applied_quantities(plan: &ReconciliationPlan) -> Vec<(String, i64)> {
        plan.applied()
            .map(|e| (e.row.sku.clone(), e.row.quantidade))
            .collect()
    }

    #[test]
    fn set_overwrites_and_creates() {
        let items = inventory();
        let snapshot = InventorySnapshot::from_items(&items);
        let plan = plan(ImportStrategy::Set, &snapshot, &[row("A", 2), row("C", 5)]);

        assert_eq!(applied_quantities(&plan), vec![("A".to_string(), 2), ("C".to_string(), 5)]);
        assert_eq!(plan.counts(), PlanCounts { created: 1, modified: 1 });
    }

    #[test]
    fn increment_adds_to_existing_and_creates_missing() {
        let items = inventory();
        let snapshot = InventorySnapshot::from_items(&items);
        let plan = plan(ImportStrategy::Increment, &snapshot, &[row("A", 2), row("C", 5)]);

        assert_eq!(applied_quantities(&plan), vec![("A".to_string(), 12), ("C".to_string(), 5)]);
        assert_eq!(plan.counts(), PlanCounts { created: 1, modified: 1 });
    }

    #[test]
    fn increment_saturates_instead_of_overflowing() {
        let items = vec![item("A", i64::MAX - 1)];
        let snapshot = InventorySnapshot::from_items(&items);
        let plan = plan(ImportStrategy::Increment, &snapshot, &[row("A", 5)]);
        assert_eq!(plan.entries[0].row.quantidade, i64::MAX);
    }

    #[test]
    fn decrement_floors_at_zero_and_skips_missing() {
        let items = inventory();
        let snapshot = InventorySnapshot::from_items(&items);
        let plan = plan(
            ImportStrategy::Decrement,
            &snapshot,
            &[row("A", 2), row("C", 5), row("B", 50)],
        );

        assert_eq!(applied_quantities(&plan), vec![("A".to_string(), 8), ("B".to_string(), 0)]);
        assert_eq!(plan.skipped_count(), 1);
        assert_eq!(plan.entries[1].disposition, Disposition::Skip);
        assert_eq!(plan.counts(), PlanCounts { created: 0, modified: 2 });
    }

    #[test]
    fn insert_only_on_existing_skus_is_an_empty_plan() {
        let items = inventory();
        let snapshot = InventorySnapshot::from_items(&items);
        let plan = plan(ImportStrategy::InsertOnly, &snapshot, &[row("A", 1), row("B", 1)]);

        assert!(plan.is_empty());
        assert_eq!(plan.skipped_count(), 2);
        assert!(plan.rows_to_write().is_empty());
    }

    #[test]
    fn update_only_keeps_existing_and_sets_verbatim() {
        let items = inventory();
        let snapshot = InventorySnapshot::from_items(&items);
        let plan = plan(ImportStrategy::UpdateOnly, &snapshot, &[row("A", 1), row("Z", 9)]);

        assert_eq!(applied_quantities(&plan), vec![("A".to_string(), 1)]);
        assert_eq!(plan.counts(), PlanCounts { created: 0, modified: 1 });
    }

    #[test]
    fn replace_all_applies_everything_as_new() {
        let items = inventory();
        let snapshot = InventorySnapshot::from_items(&items);
        let plan = plan(ImportStrategy::ReplaceAll, &snapshot, &[row("A", 1), row("X", 2)]);

        assert_eq!(plan.applied_count(), 2);
        assert!(plan.applied().all(|e| e.classification == Classification::Create));
        assert_eq!(applied_quantities(&plan), vec![("A".to_string(), 1), ("X".to_string(), 2)]);
    }

    #[test]
    fn duplicate_new_skus_are_both_counted_as_created() {
        let snapshot = InventorySnapshot::default();
        let plan = plan(ImportStrategy::Set, &snapshot, &[row("N", 1), row("N", 4)]);

        assert_eq!(plan.counts(), PlanCounts { created: 2, modified: 0 });
        // ...mas só a última ocorrência é gravada
        assert_eq!(plan.rows_to_write(), vec![row("N", 4)]);
    }

    #[test]
    fn rows_to_write_follows_last_occurrence_order() {
        let snapshot = InventorySnapshot::default();
        let plan = plan(
            ImportStrategy::Set,
            &snapshot,
            &[row("A", 1), row("B", 1), row("A", 7)],
        );
        let skus: Vec<_> = plan.rows_to_write().into_iter().map(|r| (r.sku, r.quantidade)).collect();
        assert_eq!(skus, vec![("B".to_string(), 1), ("A".to_string(), 7)]);
    }

    #[test]
    fn increment_duplicates_are_computed_against_the_snapshot() {
        let items = inventory();
        let snapshot = InventorySnapshot::from_items(&items);
        let plan = plan(ImportStrategy::Increment, &snapshot, &[row("A", 2), row("A", 3)]);
        // 10 + 3, não 10 + 2 + 3
        assert_eq!(plan.rows_to_write()[0].quantidade, 13);
    }

    #[test]
    fn planner_keeps_input_order_and_metadata() {
        let items = inventory();
        let snapshot = InventorySnapshot::from_items(&items);
        let mut incoming = row("B", 1);
        incoming.nome = "Novo nome".into();
        incoming.descricao = Some("nova".into());
        let plan = plan(ImportStrategy::Increment, &snapshot, &[incoming, row("A", 1)]);

        assert_eq!(plan.entries[0].row.nome, "Novo nome");
        assert_eq!(plan.entries[0].row.descricao.as_deref(), Some("nova"));
        assert_eq!(plan.entries[0].row.quantidade, 4);
        assert_eq!(plan.entries[1].row.sku, "A");
    }

    #[test]
    fn snapshot_is_case_sensitive() {
        let items = vec![item("abc", 1)];
        let snapshot = InventorySnapshot::from_items(&items);
        assert!(snapshot.contains("abc"));
        assert!(!snapshot.contains("ABC"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn every_strategy_on_empty_input_is_empty() {
        let items = inventory();
        let snapshot = InventorySnapshot::from_items(&items);
        for strategy in ImportStrategy::ALL {
            assert!(plan(strategy, &snapshot, &[]).is_empty(), "{strategy}");
        }
    }
}
