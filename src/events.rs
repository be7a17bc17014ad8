//! Eventos do ciclo de vida da carga

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::traits::EventEmitter;
use crate::types::{PipelineEvent, PipelineState};
use tracing::{debug, error, info};

/// EventEmitter que registra os eventos no log
#[derive(Debug, Clone, Default)]
pub struct LoggingEventEmitter;

impl LoggingEventEmitter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventEmitter for LoggingEventEmitter {
    async fn emit(&self, event: PipelineEvent) -> Result<()> {
        match event {
            PipelineEvent::Started { pipeline_id, source, .. } => {
                info!(pipeline_id = %pipeline_id, arquivo = %source, "Carga iniciada");
            }
            PipelineEvent::StateChanged {
                pipeline_id,
                old_state,
                new_state,
                ..
            } => {
                debug!(
                    pipeline_id = %pipeline_id,
                    old_state = %old_state,
                    new_state = %new_state,
                    "Estado da carga alterado"
                );
            }
            PipelineEvent::Progress { pipeline_id, rows_inserted, .. } => {
                info!(pipeline_id = %pipeline_id, rows_inserted, "Linhas inseridas na transação");
            }
            PipelineEvent::Error { pipeline_id, line, error, .. } => {
                error!(
                    pipeline_id = %pipeline_id,
                    linha = ?line,
                    error = %error,
                    "Erro na carga"
                );
            }
            PipelineEvent::Completed { pipeline_id, result, .. } => {
                info!(
                    pipeline_id = %pipeline_id,
                    lines_read = result.lines_read,
                    rows_inserted = result.rows_inserted,
                    invalid_documents = result.invalid_documents,
                    fields_nulled = result.fields_nulled,
                    execution_time_ms = result.execution_time_ms,
                    "Carga concluída"
                );
            }
        }

        Ok(())
    }
}

/// EventEmitter que armazena eventos em memória para testes
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventEmitter {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl InMemoryEventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retorna todos os eventos capturados
    pub fn get_events(&self) -> Vec<PipelineEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Sequência de estados percorrida pela carga
    pub fn states(&self) -> Vec<PipelineState> {
        self.get_events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::StateChanged { new_state, .. } => Some(new_state),
                _ => None,
            })
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }
}

#[async_trait]
impl EventEmitter for InMemoryEventEmitter {
    async fn emit(&self, event: PipelineEvent) -> Result<()> {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[tokio::test]
    async fn test_logging_event_emitter() {
        let emitter = LoggingEventEmitter::new();

        let event = PipelineEvent::Error {
            pipeline_id: "carga-teste".to_string(),
            line: Some(3),
            error: "boom".to_string(),
            timestamp: SystemTime::now(),
        };

        assert!(emitter.emit(event).await.is_ok());
    }

    #[tokio::test]
    async fn test_in_memory_event_emitter_states() {
        let emitter = InMemoryEventEmitter::new();

        emitter
            .emit(PipelineEvent::Started {
                pipeline_id: "carga-teste".to_string(),
                source: "base.txt".to_string(),
                timestamp: SystemTime::now(),
            })
            .await
            .unwrap();
        emitter
            .emit(PipelineEvent::StateChanged {
                pipeline_id: "carga-teste".to_string(),
                old_state: PipelineState::Idle,
                new_state: PipelineState::TransactionOpen,
                timestamp: SystemTime::now(),
            })
            .await
            .unwrap();

        assert_eq!(emitter.event_count(), 2);
        assert_eq!(emitter.states(), vec![PipelineState::TransactionOpen]);
    }
}
