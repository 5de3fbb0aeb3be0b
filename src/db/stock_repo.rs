// src/db/stock_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::StockStore,
    models::stock::{ImportRow, StockItem},
};

// Postgres aceita no máximo 65535 binds por comando; 5 colunas por linha.
const UPSERT_CHUNK_SIZE: usize = 1000;

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura"
    // ---

    pub async fn get_all_items<'e, E>(&self, executor: E) -> Result<Vec<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM estoque ORDER BY nome ASC, sku ASC",
        )
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---
    // Recebem o executor para poderem rodar dentro de uma transação.

    /// UPSERT por SKU de um bloco de linhas.
    /// Se o SKU já existe (ON CONFLICT), sobrescreve os campos e a quantidade.
    async fn upsert_chunk<'e, E>(
        &self,
        executor: E,
        rows: &[ImportRow],
    ) -> Result<Vec<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO estoque (sku, nome, descricao, local, quantidade) ");
        builder.push_values(rows, |mut b, row| {
            b.push_bind(row.sku.clone())
                .push_bind(row.nome.clone())
                .push_bind(row.descricao.clone())
                .push_bind(row.local.clone())
                .push_bind(row.quantidade);
        });
        builder.push(
            r#"
            ON CONFLICT (sku)
            DO UPDATE SET
                nome = EXCLUDED.nome,
                descricao = EXCLUDED.descricao,
                local = EXCLUDED.local,
                quantidade = EXCLUDED.quantidade,
                updated_at = NOW()
            RETURNING *
            "#,
        );

        let items = builder
            .build_query_as::<StockItem>()
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn delete_all_items<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM estoque WHERE sku IS NOT NULL")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl StockStore for StockRepository {
    async fn select_all(&self) -> Result<Vec<StockItem>, AppError> {
        self.get_all_items(&self.pool).await
    }

    // Blocos dentro de uma única transação: o lote inteiro entra ou nada entra.
    async fn upsert(&self, rows: &[ImportRow]) -> Result<Vec<StockItem>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());
        for chunk in rows.chunks(UPSERT_CHUNK_SIZE) {
            saved.extend(self.upsert_chunk(&mut *tx, chunk).await?);
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        self.delete_all_items(&self.pool).await
    }

    // Aqui a troca é atômica: DELETE + INSERT na mesma transação, então
    // ninguém vê o estoque vazio no meio do caminho.
    async fn replace_all(&self, rows: &[ImportRow]) -> Result<Vec<StockItem>, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = self.delete_all_items(&mut *tx).await?;
        let mut saved = Vec::with_capacity(rows.len());
        for chunk in rows.chunks(UPSERT_CHUNK_SIZE) {
            saved.extend(self.upsert_chunk(&mut *tx, chunk).await?);
        }

        tx.commit().await?;
        tracing::info!("♻️ Estoque substituído: {} removidos, {} gravados", removed, saved.len());
        Ok(saved)
    }
}
