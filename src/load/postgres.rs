//! # PostgreSQL Loader
//!
//! Carga na tabela `clientes` via sqlx. Cada transação prepara o INSERT uma
//! única vez e reutiliza o statement para todas as linhas.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode, PgStatement};
use sqlx::{Executor, Postgres, Statement, Transaction};
use std::str::FromStr;
use std::time::Duration;
use crate::config::DatabaseConfig;
use crate::error::{ConfigError, ETLError, LoadError, Result};
use crate::traits::{LoadTransaction, Loader};
use crate::types::CustomerRecord;

pub const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS clientes (
        id SERIAL PRIMARY KEY,
        cpf TEXT,
        private BOOLEAN,
        incompleto BOOLEAN,
        data_ultima_compra DATE,
        ticket_medio NUMERIC,
        ticket_ultima_compra NUMERIC,
        loja_mais_frequente TEXT,
        loja_ultima_compra TEXT,
        cpf_valido BOOLEAN,
        cnpj_valido BOOLEAN
    )
"#;

pub const INSERT_SQL: &str = r#"
    INSERT INTO clientes (
        cpf, private, incompleto, data_ultima_compra, ticket_medio, ticket_ultima_compra,
        loja_mais_frequente, loja_ultima_compra, cpf_valido, cnpj_valido
    ) VALUES ($1, $2, $3, $4, $5::FLOAT8, $6::FLOAT8, $7, $8, $9, $10)
"#;

/// Carregador PostgreSQL
#[derive(Debug, Clone)]
pub struct PgLoader {
    pool: PgPool,
}

impl PgLoader {
    /// Cria o pool sem conectar; a conexão acontece no primeiro `ping`
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let ssl_mode = PgSslMode::from_str(&config.ssl_mode).map_err(|_| {
            ETLError::Config(ConfigError::InvalidValue {
                param: "database.ssl_mode".to_string(),
                value: config.ssl_mode.clone(),
            })
        })?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name)
            .ssl_mode(ssl_mode);

        // Carga sequencial: uma conexão basta
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Loader for PgLoader {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.pool
            .execute(CREATE_TABLE_SQL)
            .await
            .map_err(|e| LoadError::Schema(e.to_string()))?;
        tracing::info!("Tabela clientes pronta");
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn LoadTransaction>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| LoadError::Transaction(e.to_string()))?;

        let insert = (&mut *tx)
            .prepare(INSERT_SQL)
            .await
            .map_err(|e| LoadError::Prepare(e.to_string()))?;

        Ok(Box::new(PgTransaction { tx, insert }))
    }
}

/// Transação aberta com o INSERT preparado; o drop sem commit desfaz tudo
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
    insert: PgStatement<'static>,
}

#[async_trait]
impl LoadTransaction for PgTransaction {
    async fn insert(&mut self, record: &CustomerRecord) -> Result<()> {
        self.insert
            .query()
            .bind(record.document.clone())
            .bind(record.is_private)
            .bind(record.is_incomplete)
            .bind(record.last_purchase_date)
            .bind(record.average_ticket)
            .bind(record.last_purchase_ticket)
            .bind(record.most_frequent_store.clone())
            .bind(record.last_purchase_store.clone())
            .bind(record.document_valid)
            .bind(record.store_document_valid)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let PgTransaction { tx, .. } = *self;
        tx.commit()
            .await
            .map_err(|e| LoadError::Commit(e.to_string()))?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let PgTransaction { tx, .. } = *self;
        tx.rollback()
            .await
            .map_err(|e| LoadError::Rollback(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ETLConfig;

    async fn count_rows(pool: &PgPool) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clientes")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_invalid_ssl_mode() {
        let mut config = DatabaseConfig::default();
        config.ssl_mode = "talvez".to_string();
        assert!(matches!(
            PgLoader::connect_lazy(&config),
            Err(ETLError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[tokio::test]
    async fn test_connect_lazy_does_not_connect() {
        let mut config = DatabaseConfig::default();
        config.host = "host-inexistente.invalid".to_string();
        assert!(PgLoader::connect_lazy(&config).is_ok());
    }

    #[tokio::test]
    #[ignore] // Requer PostgreSQL (variáveis DB_*)
    async fn test_insert_is_rolled_back() {
        let config = ETLConfig::from_env().unwrap();
        let loader = PgLoader::connect_lazy(&config.database).unwrap();
        loader.ping().await.unwrap();
        loader.ensure_schema().await.unwrap();

        let before = count_rows(loader.pool()).await;

        let record = CustomerRecord {
            document: "529.982.247-25".to_string(),
            is_private: true,
            is_incomplete: false,
            last_purchase_date: chrono::NaiveDate::from_ymd_opt(2023, 5, 17),
            average_ticket: Some(1234.56),
            last_purchase_ticket: None,
            most_frequent_store: "LOJA".to_string(),
            last_purchase_store: "LOJA".to_string(),
            document_valid: true,
            store_document_valid: false,
        };

        let mut tx = loader.begin().await.unwrap();
        tx.insert(&record).await.unwrap();
        tx.insert(&record).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(count_rows(loader.pool()).await, before);
    }
}
