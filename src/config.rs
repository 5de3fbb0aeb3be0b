// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{InMemoryStockStore, StockRepository, StockStore},
    services::StockService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
    pub server_addr: String,
    // Pede confirmação antes de cada ajuste manual de +1/-1
    pub confirm_adjustments: bool,
}

impl Config {
    /// Lê o `.env` (se existir) e as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Recebe a fonte das variáveis para poder ser testado sem mexer no ambiente.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(anyhow!("STORE_BACKEND inválido: '{other}' (use postgres ou memory)")),
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL deve ser definida quando STORE_BACKEND=postgres"));
        }

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.trim().parse().context("DATABASE_MAX_CONNECTIONS deve ser um número")?,
            None => 5,
        };

        let acquire_secs: u64 = match lookup("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            Some(v) => v.trim().parse().context("DATABASE_ACQUIRE_TIMEOUT_SECS deve ser um número")?,
            None => 3,
        };

        let confirm_adjustments = match lookup("STOCK_CONFIRM_ADJUSTMENTS") {
            Some(v) => parse_flag(&v)
                .ok_or_else(|| anyhow!("STOCK_CONFIRM_ADJUSTMENTS inválido: '{v}'"))?,
            None => true,
        };

        Ok(Self {
            store_backend,
            database_url,
            database_max_connections,
            database_acquire_timeout: Duration::from_secs(acquire_secs),
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            confirm_adjustments,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "sim" | "yes" => Some(true),
        "0" | "false" | "nao" | "não" | "no" => Some(false),
        _ => None,
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    // Só existe com STORE_BACKEND=postgres (usado para as migrações)
    pub db_pool: Option<PgPool>,
    pub stock_service: StockService,
    pub i18n_store: Arc<I18nStore>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        // --- Monta o gráfico de dependências ---
        match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .clone()
                    .context("DATABASE_URL deve ser definida")?;

                let db_pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .acquire_timeout(config.database_acquire_timeout)
                    .connect(&database_url)
                    .await?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                let store = Arc::new(StockRepository::new(db_pool.clone()));
                let mut state = Self::with_store(store, config);
                state.db_pool = Some(db_pool);
                Ok(state)
            }
            StoreBackend::Memory => {
                tracing::warn!("⚠️ Usando estoque em memória: nada será persistido");
                Ok(Self::with_store(Arc::new(InMemoryStockStore::new()), config))
            }
        }
    }

    /// Estado sem pool, com o store informado (backend em memória e testes).
    pub fn with_store(store: Arc<dyn StockStore>, config: Config) -> Self {
        let stock_service = StockService::new(store, config.confirm_adjustments);
        Self {
            config: Arc::new(config),
            db_pool: None,
            stock_service,
            i18n_store: Arc::new(I18nStore::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_with_database_url() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x/y")])).unwrap();

        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert!(config.confirm_adjustments);
    }

    #[test]
    fn postgres_without_url_fails() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn memory_backend_needs_no_url() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("STOCK_CONFIRM_ADJUSTMENTS", "false"),
            ("SERVER_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(!config.confirm_adjustments);
        assert_eq!(config.server_addr, "127.0.0.1:8080");
    }

    #[test]
    fn rejects_unknown_backend_and_bad_numbers() {
        assert!(Config::from_lookup(lookup_from(&[("STORE_BACKEND", "redis")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("DATABASE_MAX_CONNECTIONS", "muitas"),
        ]))
        .is_err());
    }
}
