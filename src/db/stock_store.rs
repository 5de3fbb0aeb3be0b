// src/db/stock_store.rs

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::stock::{ImportRow, StockItem},
};

/// Contrato do armazenamento usado pela importação.
///
/// O motor de reconciliação só conhece estas quatro operações; o transporte
/// (Postgres, memória) fica escondido atrás do trait.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Todo o estoque, ordenado por nome (e SKU para desempate).
    async fn select_all(&self) -> Result<Vec<StockItem>, AppError>;

    /// Insere ou sobrescreve por SKU e devolve as linhas como ficaram
    /// gravadas. Lista vazia é um no-op.
    async fn upsert(&self, rows: &[ImportRow]) -> Result<Vec<StockItem>, AppError>;

    /// Remove todas as linhas. Devolve quantas saíram.
    async fn delete_all(&self) -> Result<u64, AppError>;

    /// Troca a base inteira pelas linhas informadas.
    ///
    /// Padrão: duas chamadas separadas (apaga, depois grava). Se a remoção
    /// falhar, a gravação não acontece; se a gravação falhar, o estoque fica
    /// vazio. Quem consegue fazer a troca de forma atômica deve sobrescrever.
    async fn replace_all(&self, rows: &[ImportRow]) -> Result<Vec<StockItem>, AppError> {
        let removed = self.delete_all().await?;
        tracing::debug!("Base de estoque apagada ({} itens), gravando {} linhas", removed, rows.len());
        self.upsert(rows).await
    }
}
