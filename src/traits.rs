use async_trait::async_trait;
use futures::stream::BoxStream;
use crate::error::{ETLError, LoadError, Result};
use crate::types::{CustomerRecord, PipelineEvent};

/// Fluxo de linhas brutas, sem o terminador `\n` / `\r\n`
pub type LineStream = BoxStream<'static, Result<Vec<u8>>>;

/// Fonte das linhas de entrada
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Abre a fonte para leitura e devolve suas linhas em ordem
    async fn open(&self) -> Result<LineStream>;

    /// Descrição da fonte para logs
    fn describe(&self) -> String;
}

/// Destino transacional dos registros
#[async_trait]
pub trait Loader: Send + Sync {
    /// Verifica se o destino responde
    async fn ping(&self) -> Result<()>;

    /// Repete `ping` até `max_attempts` vezes com intervalo fixo
    async fn ping_with_retry(&self, retry: &RetryConfig) -> Result<()> {
        let mut last_error = String::new();
        for attempt in 1..=retry.max_attempts {
            match self.ping().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        tentativa = attempt,
                        max = retry.max_attempts,
                        erro = %e,
                        "Banco de dados não está pronto. Aguardando..."
                    );
                    last_error = e.to_string();
                }
            }
            if attempt < retry.max_attempts {
                tokio::time::sleep(std::time::Duration::from_millis(retry.delay_ms)).await;
            }
        }

        Err(ETLError::Load(LoadError::Connection {
            attempts: retry.max_attempts,
            message: last_error,
        }))
    }

    /// Cria a tabela de destino se ela não existir
    async fn ensure_schema(&self) -> Result<()>;

    /// Abre uma transação com a inserção já preparada
    async fn begin(&self) -> Result<Box<dyn LoadTransaction>>;
}

/// Transação de carga aberta por um `Loader`
#[async_trait]
pub trait LoadTransaction: Send {
    /// Insere um registro na transação corrente
    async fn insert(&mut self, record: &CustomerRecord) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Configuração de retry da verificação inicial de conexão
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay_ms: 5000,
        }
    }
}

/// Trait para emissão de eventos do pipeline
#[async_trait]
pub trait EventEmitter: Send + Sync {
    /// Emite um evento do pipeline
    async fn emit(&self, event: PipelineEvent) -> Result<()>;
}
