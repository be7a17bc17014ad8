use futures::StreamExt;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use crate::config::PipelineConfig;
use crate::error::{ETLError, LoadError, Result};
use crate::events::LoggingEventEmitter;
use crate::extract::fixed_width::parse_line;
use crate::traits::{EventEmitter, Extractor, LineStream, LoadTransaction, Loader};
use crate::transform::record::build_record;
use crate::types::{PipelineEvent, PipelineResult, PipelineState};

/// Falha dentro do laço de linhas, com a linha que a causou
type RowFailure = (Option<usize>, ETLError);

/// Pipeline de carga de um arquivo em uma única transação
///
/// Estados: `Idle → TransactionOpen → Loading → Committed | RolledBack`.
/// `execute` consome o pipeline; uma nova carga exige um novo pipeline.
pub struct Pipeline<E, L> {
    extractor: E,
    loader: L,
    config: PipelineConfig,
    state: PipelineState,
    event_emitter: Arc<dyn EventEmitter>,
    pipeline_id: String,
}

impl Pipeline<(), ()> {
    /// Cria um novo builder de pipeline
    pub fn builder() -> PipelineBuilder<(), ()> {
        PipelineBuilder::new()
    }
}

impl<E, L> Pipeline<E, L>
where
    E: Extractor,
    L: Loader,
{
    /// Retorna o ID do pipeline
    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    /// Retorna o estado atual do pipeline
    pub fn current_state(&self) -> &PipelineState {
        &self.state
    }

    /// Altera o estado do pipeline e emite evento
    async fn set_state(&mut self, new_state: PipelineState) -> Result<()> {
        let old_state = std::mem::replace(&mut self.state, new_state.clone());

        let event = PipelineEvent::StateChanged {
            pipeline_id: self.pipeline_id.clone(),
            old_state,
            new_state,
            timestamp: SystemTime::now(),
        };

        self.event_emitter.emit(event).await
    }

    /// Emite sem propagar falhas do emitter; usado nos caminhos de erro
    async fn notify(&self, event: PipelineEvent) {
        if let Err(e) = self.event_emitter.emit(event).await {
            tracing::warn!(erro = %e, "Falha ao emitir evento do pipeline");
        }
    }

    async fn report_error(&self, line: Option<usize>, error: &ETLError) {
        self.notify(PipelineEvent::Error {
            pipeline_id: self.pipeline_id.clone(),
            line,
            error: error.to_string(),
            timestamp: SystemTime::now(),
        })
        .await;
    }

    /// Executa a carga completa do arquivo
    pub async fn execute(mut self) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let mut result = PipelineResult::new();

        self.event_emitter
            .emit(PipelineEvent::Started {
                pipeline_id: self.pipeline_id.clone(),
                source: self.extractor.describe(),
                timestamp: SystemTime::now(),
            })
            .await?;

        let mut lines = match self.extractor.open().await {
            Ok(lines) => lines,
            Err(e) => {
                self.report_error(None, &e).await;
                return Err(e);
            }
        };

        let mut tx = match self.loader.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                self.report_error(None, &e).await;
                return Err(e);
            }
        };
        self.set_state(PipelineState::TransactionOpen).await?;
        self.set_state(PipelineState::Loading).await?;

        let loaded = self.load_rows(&mut lines, tx.as_mut(), &mut result).await;
        drop(lines);
        if let Err((line, error)) = loaded {
            return Err(self.abort(tx, line, error).await);
        }

        if let Err(e) = tx.commit().await {
            self.report_error(None, &e).await;
            let _ = self.set_state(PipelineState::RolledBack(e.to_string())).await;
            return Err(e);
        }
        self.set_state(PipelineState::Committed).await?;

        result.execution_time_ms = start_time.elapsed().as_millis() as u64;

        self.notify(PipelineEvent::Completed {
            pipeline_id: self.pipeline_id.clone(),
            result: result.clone(),
            timestamp: SystemTime::now(),
        })
        .await;

        tracing::info!(
            "Carga confirmada - {} registros inseridos em {}ms",
            result.rows_inserted,
            result.execution_time_ms
        );

        Ok(result)
    }

    /// Laço de linhas: a primeira linha é o cabeçalho e não é validada
    async fn load_rows(
        &self,
        lines: &mut LineStream,
        tx: &mut dyn LoadTransaction,
        result: &mut PipelineResult,
    ) -> std::result::Result<(), RowFailure> {
        let mut line_number = 0usize;

        while let Some(line) = lines.next().await {
            line_number += 1;
            let line = line.map_err(|e| (Some(line_number), e))?;
            if line_number == 1 {
                continue;
            }
            result.lines_read += 1;

            let raw = parse_line(&line, line_number).map_err(|e| (Some(line_number), e))?;

            let span = tracing::debug_span!("linha", numero = line_number);
            let transformed = span.in_scope(|| build_record(raw));
            result.fields_nulled += transformed.nulled_fields.len();
            if !transformed.record.document_valid {
                result.invalid_documents += 1;
            }

            if let Err(e) = tx.insert(&transformed.record).await {
                let rejected = ETLError::Load(LoadError::RowRejected {
                    line: line_number,
                    reason: e.to_string(),
                });
                return Err((Some(line_number), rejected));
            }
            result.rows_inserted += 1;

            let interval = self.config.progress_interval;
            if interval > 0 && result.rows_inserted % interval == 0 {
                self.notify(PipelineEvent::Progress {
                    pipeline_id: self.pipeline_id.clone(),
                    rows_inserted: result.rows_inserted,
                    timestamp: SystemTime::now(),
                })
                .await;
            }
        }

        Ok(())
    }

    /// Desfaz a transação inteira e devolve o erro original
    async fn abort(
        &mut self,
        tx: Box<dyn LoadTransaction>,
        line: Option<usize>,
        error: ETLError,
    ) -> ETLError {
        if let Err(e) = tx.rollback().await {
            tracing::error!(erro = %e, "Falha ao desfazer a transação");
        }

        self.report_error(line, &error).await;
        if let Err(e) = self.set_state(PipelineState::RolledBack(error.to_string())).await {
            tracing::warn!(erro = %e, "Falha ao emitir evento do pipeline");
        }

        error
    }
}

/// Builder para criação de pipelines
pub struct PipelineBuilder<E, L> {
    extractor: E,
    loader: L,
    config: PipelineConfig,
    event_emitter: Option<Arc<dyn EventEmitter>>,
}

impl PipelineBuilder<(), ()> {
    /// Cria um novo builder
    pub fn new() -> Self {
        Self {
            extractor: (),
            loader: (),
            config: PipelineConfig::default(),
            event_emitter: None,
        }
    }
}

impl<E, L> PipelineBuilder<E, L> {
    /// Define o extrator
    pub fn extract<NewE: Extractor>(self, extractor: NewE) -> PipelineBuilder<NewE, L> {
        PipelineBuilder {
            extractor,
            loader: self.loader,
            config: self.config,
            event_emitter: self.event_emitter,
        }
    }

    /// Define o carregador
    pub fn load<NewL: Loader>(self, loader: NewL) -> PipelineBuilder<E, NewL> {
        PipelineBuilder {
            extractor: self.extractor,
            loader,
            config: self.config,
            event_emitter: self.event_emitter,
        }
    }

    /// Define a configuração
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Define o intervalo dos eventos de progresso
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Define o event emitter
    pub fn event_emitter<T: EventEmitter + 'static>(mut self, emitter: T) -> Self {
        self.event_emitter = Some(Arc::new(emitter));
        self
    }
}

impl<E, L> PipelineBuilder<E, L>
where
    E: Extractor,
    L: Loader,
{
    /// Constrói o pipeline
    pub fn build(self) -> Pipeline<E, L> {
        let millis = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        Pipeline {
            extractor: self.extractor,
            loader: self.loader,
            config: self.config,
            state: PipelineState::default(),
            event_emitter: self
                .event_emitter
                .unwrap_or_else(|| Arc::new(LoggingEventEmitter::default())),
            pipeline_id: format!("carga-{}-{}", std::process::id(), millis),
        }
    }
}

impl Default for PipelineBuilder<(), ()> {
    fn default() -> Self {
        Self::new()
    }
}
