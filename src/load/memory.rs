//! # Memory Loader
//!
//! Destino transacional em memória.
//! Especialmente útil para testes: registros ficam pendentes na transação e
//! só chegam ao armazenamento compartilhado no commit.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use crate::error::{ETLError, LoadError, Result};
use crate::traits::{LoadTransaction, Loader};
use crate::types::CustomerRecord;

type Check = Arc<dyn Fn(&CustomerRecord) -> bool + Send + Sync>;

/// Restrição nomeada avaliada a cada inserção
#[derive(Clone)]
struct Constraint {
    name: String,
    check: Check,
}

#[derive(Default)]
struct MemoryState {
    committed: Vec<CustomerRecord>,
    schema_ready: bool,
    failing_pings: usize,
    pings: usize,
    fail_commit: bool,
    commits: usize,
    rollbacks: usize,
}

/// Carregador que acumula registros confirmados em memória
///
/// ```rust
/// use carga_clientes::load::memory::MemoryLoader;
///
/// let loader = MemoryLoader::new()
///     .with_unique_documents()
///     .with_constraint("cpf_valido", |r| r.document_valid);
/// ```
#[derive(Clone, Default)]
pub struct MemoryLoader {
    state: Arc<Mutex<MemoryState>>,
    constraints: Vec<Constraint>,
    unique_documents: bool,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejeita a inserção quando `check` devolve false
    pub fn with_constraint<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&CustomerRecord) -> bool + Send + Sync + 'static,
    {
        self.constraints.push(Constraint {
            name: name.into(),
            check: Arc::new(check),
        });
        self
    }

    /// Equivalente a um índice único sobre `cpf`
    pub fn with_unique_documents(mut self) -> Self {
        self.unique_documents = true;
        self
    }

    /// As primeiras `count` chamadas a `ping` falham
    pub fn with_failing_pings(self, count: usize) -> Self {
        self.lock().failing_pings = count;
        self
    }

    /// O commit falha e descarta a transação
    pub fn with_failing_commit(self) -> Self {
        self.lock().fail_commit = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // Um teste que entrou em pânico com o lock não invalida o estado
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cópia dos registros confirmados
    pub fn committed(&self) -> Vec<CustomerRecord> {
        self.lock().committed.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().committed.is_empty()
    }

    pub fn schema_ready(&self) -> bool {
        self.lock().schema_ready
    }

    pub fn ping_count(&self) -> usize {
        self.lock().pings
    }

    pub fn commit_count(&self) -> usize {
        self.lock().commits
    }

    pub fn rollback_count(&self) -> usize {
        self.lock().rollbacks
    }
}

#[async_trait]
impl Loader for MemoryLoader {
    async fn ping(&self) -> Result<()> {
        let mut state = self.lock();
        state.pings += 1;
        if state.failing_pings > 0 {
            state.failing_pings -= 1;
            return Err(ETLError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "conexão recusada",
            )));
        }
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.lock().schema_ready = true;
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn LoadTransaction>> {
        Ok(Box::new(MemoryTransaction {
            loader: self.clone(),
            staged: Vec::new(),
        }))
    }
}

/// Transação em memória; descartada se não houver commit
pub struct MemoryTransaction {
    loader: MemoryLoader,
    staged: Vec<CustomerRecord>,
}

#[async_trait]
impl LoadTransaction for MemoryTransaction {
    async fn insert(&mut self, record: &CustomerRecord) -> Result<()> {
        for constraint in &self.loader.constraints {
            if !(constraint.check)(record) {
                return Err(ETLError::Load(LoadError::ConstraintViolation {
                    constraint: constraint.name.clone(),
                    message: format!("registro {} rejeitado", record.document),
                }));
            }
        }

        if self.loader.unique_documents {
            let duplicated = self.staged.iter().any(|r| r.document == record.document)
                || self
                    .loader
                    .lock()
                    .committed
                    .iter()
                    .any(|r| r.document == record.document);
            if duplicated {
                return Err(ETLError::Load(LoadError::ConstraintViolation {
                    constraint: "clientes_cpf_key".to_string(),
                    message: format!("cpf {} duplicado", record.document),
                }));
            }
        }

        self.staged.push(record.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut state = self.loader.lock();
        if state.fail_commit {
            state.rollbacks += 1;
            return Err(ETLError::Load(LoadError::Commit(
                "falha simulada no commit".to_string(),
            )));
        }
        state.committed.extend(self.staged);
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.loader.lock().rollbacks += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RetryConfig;

    fn record(document: &str) -> CustomerRecord {
        CustomerRecord {
            document: document.to_string(),
            is_private: false,
            is_incomplete: false,
            last_purchase_date: None,
            average_ticket: None,
            last_purchase_ticket: None,
            most_frequent_store: "LOJA".to_string(),
            last_purchase_store: "LOJA".to_string(),
            document_valid: true,
            store_document_valid: false,
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_staged_rows() {
        let loader = MemoryLoader::new();
        let mut tx = loader.begin().await.unwrap();
        tx.insert(&record("1")).await.unwrap();
        tx.insert(&record("2")).await.unwrap();
        assert!(loader.is_empty());

        tx.commit().await.unwrap();
        assert_eq!(loader.len(), 2);
        assert_eq!(loader.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_rows() {
        let loader = MemoryLoader::new();
        let mut tx = loader.begin().await.unwrap();
        tx.insert(&record("1")).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(loader.is_empty());
        assert_eq!(loader.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_unique_documents() {
        let loader = MemoryLoader::new().with_unique_documents();
        let mut tx = loader.begin().await.unwrap();
        tx.insert(&record("1")).await.unwrap();

        let err = tx.insert(&record("1")).await.unwrap_err();
        assert!(matches!(
            err,
            ETLError::Load(LoadError::ConstraintViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_named_constraint() {
        let loader = MemoryLoader::new().with_constraint("cpf_nao_vazio", |r| !r.document.is_empty());
        let mut tx = loader.begin().await.unwrap();

        match tx.insert(&record("")).await {
            Err(ETLError::Load(LoadError::ConstraintViolation { constraint, .. })) => {
                assert_eq!(constraint, "cpf_nao_vazio");
            }
            other => panic!("resultado inesperado: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ping_with_retry_recovers() {
        let loader = MemoryLoader::new().with_failing_pings(2);
        let retry = RetryConfig { max_attempts: 3, delay_ms: 0 };

        loader.ping_with_retry(&retry).await.unwrap();
        assert_eq!(loader.ping_count(), 3);
    }

    #[tokio::test]
    async fn test_ping_with_retry_gives_up() {
        let loader = MemoryLoader::new().with_failing_pings(5);
        let retry = RetryConfig { max_attempts: 3, delay_ms: 0 };

        let err = loader.ping_with_retry(&retry).await.unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(
            err,
            ETLError::Load(LoadError::Connection { attempts: 3, .. })
        ));
        assert_eq!(loader.ping_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_commit() {
        let loader = MemoryLoader::new().with_failing_commit();
        let mut tx = loader.begin().await.unwrap();
        tx.insert(&record("1")).await.unwrap();

        assert!(tx.commit().await.is_err());
        assert!(loader.is_empty());
    }
}
