use chrono::NaiveDate;
use serde::Serialize;

/// Campos brutos de uma linha de largura fixa, já aparados
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    pub document: String,
    pub is_private: bool,
    pub is_incomplete: bool,
    pub last_purchase_date: String,
    pub average_ticket: String,
    pub last_purchase_ticket: String,
    pub most_frequent_store: String,
    pub last_purchase_store: String,
}

/// Registro de cliente persistido na tabela `clientes`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub document: String,
    pub is_private: bool,
    pub is_incomplete: bool,
    pub last_purchase_date: Option<NaiveDate>,
    pub average_ticket: Option<f64>,
    pub last_purchase_ticket: Option<f64>,
    pub most_frequent_store: String,
    pub last_purchase_store: String,
    /// Dígitos verificadores de `document`
    pub document_valid: bool,
    /// Dígitos verificadores aplicados às duas lojas (coluna `cnpj_valido`)
    pub store_document_valid: bool,
}

/// Resumo de uma carga concluída
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineResult {
    /// Linhas de dados lidas (sem o cabeçalho)
    pub lines_read: usize,
    pub rows_inserted: usize,
    /// Registros cujo documento falhou na validação
    pub invalid_documents: usize,
    /// Campos de data/decimal malformados gravados como NULL
    pub fields_nulled: usize,
    pub execution_time_ms: u64,
}

impl PipelineResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_warnings(&self) -> bool {
        self.fields_nulled > 0
    }
}

/// Estados do pipeline de carga
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    TransactionOpen,
    Loading,
    Committed,
    RolledBack(String),
}

impl PipelineState {
    /// Committed e RolledBack são finais
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Committed | PipelineState::RolledBack(_))
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "Ocioso"),
            PipelineState::TransactionOpen => write!(f, "Transação aberta"),
            PipelineState::Loading => write!(f, "Carregando"),
            PipelineState::Committed => write!(f, "Confirmado"),
            PipelineState::RolledBack(reason) => write!(f, "Desfeito: {}", reason),
        }
    }
}

/// Eventos do pipeline para monitoramento externo
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Started {
        pipeline_id: String,
        source: String,
        timestamp: std::time::SystemTime,
    },
    StateChanged {
        pipeline_id: String,
        old_state: PipelineState,
        new_state: PipelineState,
        timestamp: std::time::SystemTime,
    },
    /// Progresso periódico do laço de inserção
    Progress {
        pipeline_id: String,
        rows_inserted: usize,
        timestamp: std::time::SystemTime,
    },
    Error {
        pipeline_id: String,
        line: Option<usize>,
        error: String,
        timestamp: std::time::SystemTime,
    },
    Completed {
        pipeline_id: String,
        result: PipelineResult,
        timestamp: std::time::SystemTime,
    },
}
