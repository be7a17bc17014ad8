use thiserror::Error;

/// Tipo Result principal da biblioteca
pub type Result<T> = std::result::Result<T, ETLError>;

/// Erro principal da carga de clientes
#[derive(Error, Debug)]
pub enum ETLError {
    #[error("Erro de extração: {0}")]
    Extract(#[from] ExtractError),

    #[error("Erro de carga: {0}")]
    Load(#[from] LoadError),

    #[error("Erro de configuração: {0}")]
    Config(#[from] ConfigError),

    #[error("Erro de pipeline: {0}")]
    Pipeline(String),

    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Erros relacionados à leitura do arquivo de entrada
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("Não foi possível abrir {path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Falha ao ler a linha {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Linha {line} fora do layout: exige {required} bytes, possui {actual}")]
    OutOfRange {
        line: usize,
        required: usize,
        actual: usize,
    },
}

/// Falhas de conversão de campo; nunca abortam a carga, o campo vira NULL
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Data inválida '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Decimal inválido '{value}': {reason}")]
    InvalidDecimal { value: String, reason: String },
}

/// Erros relacionados ao banco de destino
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Não foi possível conectar ao banco após {attempts} tentativas: {message}")]
    Connection { attempts: usize, message: String },

    #[error("Falha ao criar a tabela: {0}")]
    Schema(String),

    #[error("Falha ao iniciar a transação: {0}")]
    Transaction(String),

    #[error("Falha ao preparar a inserção: {0}")]
    Prepare(String),

    #[error("Falha na inserção: {0}")]
    Insert(String),

    #[error("Violação da restrição {constraint}: {message}")]
    ConstraintViolation { constraint: String, message: String },

    #[error("Linha {line} rejeitada, transação desfeita: {reason}")]
    RowRejected { line: usize, reason: String },

    #[error("Falha no commit: {0}")]
    Commit(String),

    #[error("Falha no rollback: {0}")]
    Rollback(String),
}

/// Erros relacionados à configuração
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parâmetro obrigatório ausente: {0}")]
    MissingRequiredParameter(String),

    #[error("Valor inválido para {param}: {value}")]
    InvalidValue { param: String, value: String },

    #[error("Erro de parsing de configuração: {0}")]
    ParseError(String),
}

impl ETLError {
    /// Verifica se o erro é recuperável (só a conexão inicial é repetida)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ETLError::Load(LoadError::Connection { .. }))
    }

    /// Retorna o código de erro
    pub fn error_code(&self) -> &'static str {
        match self {
            ETLError::Extract(ExtractError::OutOfRange { .. }) => "OUT_OF_RANGE",
            ETLError::Extract(_) => "EXTRACT_ERROR",
            ETLError::Load(LoadError::Connection { .. }) => "CONNECTION_ERROR",
            ETLError::Load(LoadError::Commit(_)) => "COMMIT_ERROR",
            ETLError::Load(_) => "LOAD_ERROR",
            ETLError::Config(_) => "CONFIG_ERROR",
            ETLError::Pipeline(_) => "PIPELINE_ERROR",
            ETLError::Io(_) => "IO_ERROR",
        }
    }
}

impl From<config::ConfigError> for ETLError {
    fn from(err: config::ConfigError) -> Self {
        ETLError::Config(ConfigError::ParseError(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for ETLError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().map(str::to_string);
                match constraint {
                    Some(constraint) => ETLError::Load(LoadError::ConstraintViolation {
                        constraint,
                        message: db_err.message().to_string(),
                    }),
                    None => ETLError::Load(LoadError::Insert(db_err.to_string())),
                }
            }
            sqlx::Error::Io(io_err) => ETLError::Io(io_err),
            _ => ETLError::Pipeline(err.to_string()),
        }
    }
}
