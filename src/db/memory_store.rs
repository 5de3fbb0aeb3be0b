// src/db/memory_store.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StockStore,
    models::stock::{ImportRow, StockItem},
};

/// Estoque em memória (STORE_BACKEND=memory e testes).
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    items: RwLock<HashMap<String, StockItem>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<StockItem>) -> Self {
        let map = items.into_iter().map(|i| (i.sku.clone(), i)).collect();
        Self {
            items: RwLock::new(map),
        }
    }

    fn write_row(map: &mut HashMap<String, StockItem>, row: &ImportRow) -> StockItem {
        let now = Utc::now();
        let item = map
            .entry(row.sku.clone())
            .and_modify(|existing| {
                existing.nome = row.nome.clone();
                existing.descricao = row.descricao.clone();
                existing.local = row.local.clone();
                existing.quantidade = row.quantidade;
                existing.updated_at = now;
            })
            .or_insert_with(|| StockItem {
                item_id: Uuid::new_v4(),
                sku: row.sku.clone(),
                nome: row.nome.clone(),
                descricao: row.descricao.clone(),
                local: row.local.clone(),
                quantidade: row.quantidade,
                created_at: now,
                updated_at: now,
            });
        item.clone()
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn select_all(&self) -> Result<Vec<StockItem>, AppError> {
        let items = self.items.read().await;
        let mut list: Vec<StockItem> = items.values().cloned().collect();
        list.sort_by(|a, b| a.nome.cmp(&b.nome).then_with(|| a.sku.cmp(&b.sku)));
        Ok(list)
    }

    async fn upsert(&self, rows: &[ImportRow]) -> Result<Vec<StockItem>, AppError> {
        let mut items = self.items.write().await;
        Ok(rows.iter().map(|row| Self::write_row(&mut items, row)).collect())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let mut items = self.items.write().await;
        let removed = items.len() as u64;
        items.clear();
        Ok(removed)
    }

    // Monta a nova base à parte e troca de uma vez, sob o lock de escrita.
    async fn replace_all(&self, rows: &[ImportRow]) -> Result<Vec<StockItem>, AppError> {
        let mut fresh = HashMap::with_capacity(rows.len());
        let saved = rows
            .iter()
            .map(|row| Self::write_row(&mut fresh, row))
            .collect();

        *self.items.write().await = fresh;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sku: &str, nome: &str, quantidade: i64) -> ImportRow {
        ImportRow {
            sku: sku.into(),
            nome: nome.into(),
            descricao: None,
            local: "L1".into(),
            quantidade,
        }
    }

    #[tokio::test]
    async fn upsert_keeps_identity_of_existing_sku() {
        let store = InMemoryStockStore::new();
        let first = store.upsert(&[row("A", "Alfa", 1)]).await.unwrap();
        let second = store.upsert(&[row("A", "Alfa 2", 9)]).await.unwrap();

        assert_eq!(first[0].item_id, second[0].item_id);
        assert_eq!(first[0].created_at, second[0].created_at);
        assert_eq!(second[0].nome, "Alfa 2");
        assert_eq!(second[0].quantidade, 9);
        assert_eq!(store.select_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn select_all_is_ordered_by_nome() {
        let store = InMemoryStockStore::new();
        store
            .upsert(&[row("1", "Porca", 1), row("2", "Arruela", 1), row("3", "Mola", 1)])
            .await
            .unwrap();

        let nomes: Vec<String> = store.select_all().await.unwrap().into_iter().map(|i| i.nome).collect();
        assert_eq!(nomes, vec!["Arruela", "Mola", "Porca"]);
    }

    #[tokio::test]
    async fn replace_all_swaps_the_whole_base() {
        let store = InMemoryStockStore::new();
        store.upsert(&[row("A", "A", 1), row("B", "B", 1)]).await.unwrap();

        store.replace_all(&[row("C", "C", 3)]).await.unwrap();

        let items = store.select_all().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sku, "C");
    }

    #[tokio::test]
    async fn delete_all_reports_removed_count() {
        let store = InMemoryStockStore::new();
        store.upsert(&[row("A", "A", 1), row("B", "B", 1)]).await.unwrap();
        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.select_all().await.unwrap().is_empty());
    }
}
