use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{ConfigError, ETLError};
use crate::traits::RetryConfig;

/// Configuração principal da carga
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ETLConfig {
    pub database: DatabaseConfig,
    pub input: InputConfig,
    pub retry: RetryConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityConfig,
}

/// Conexão com o PostgreSQL
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// disable, prefer, require...
    pub ssl_mode: String,
    pub connect_timeout_seconds: u64,
}

/// Arquivo de entrada
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub file_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// A cada quantas linhas inseridas um evento de progresso é emitido
    pub progress_interval: usize,
}

/// Configuração de observabilidade
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Formato de log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(ConfigError::InvalidValue {
                param: "log_format".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "postgres".to_string(),
            ssl_mode: "disable".to_string(),
            connect_timeout_seconds: 30,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            file_path: "base_teste.txt".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            progress_interval: 1000,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ETLError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            ETLError::Config(ConfigError::InvalidValue {
                param: name.to_string(),
                value: raw,
            })
        }),
        Err(_) => Ok(None),
    }
}

impl ETLConfig {
    /// Cria um novo builder para configuração
    pub fn builder() -> ETLConfigBuilder {
        ETLConfigBuilder::default()
    }

    /// Carrega configuração do ambiente
    ///
    /// Variáveis do banco: `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`,
    /// `DB_NAME`, `DB_SSLMODE`. Demais: `ETL_INPUT_FILE`,
    /// `ETL_PING_ATTEMPTS`, `ETL_PING_DELAY_MS`, `ETL_PROGRESS_INTERVAL`,
    /// `ETL_LOG_LEVEL`, `ETL_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, ETLError> {
        let mut builder = Self::builder();

        if let Ok(host) = std::env::var("DB_HOST") {
            builder = builder.db_host(host);
        }
        if let Some(port) = parse_env::<u16>("DB_PORT")? {
            builder = builder.db_port(port);
        }
        if let Ok(user) = std::env::var("DB_USER") {
            builder = builder.db_user(user);
        }
        if let Ok(password) = std::env::var("DB_PASSWORD") {
            builder = builder.db_password(password);
        }
        if let Ok(name) = std::env::var("DB_NAME") {
            builder = builder.db_name(name);
        }
        if let Ok(ssl_mode) = std::env::var("DB_SSLMODE") {
            builder = builder.ssl_mode(ssl_mode);
        }

        if let Ok(path) = std::env::var("ETL_INPUT_FILE") {
            builder = builder.input_file(path);
        }
        if let Some(attempts) = parse_env::<usize>("ETL_PING_ATTEMPTS")? {
            builder = builder.ping_attempts(attempts);
        }
        if let Some(delay) = parse_env::<u64>("ETL_PING_DELAY_MS")? {
            builder = builder.ping_delay_ms(delay);
        }
        if let Some(interval) = parse_env::<usize>("ETL_PROGRESS_INTERVAL")? {
            builder = builder.progress_interval(interval);
        }

        if let Ok(level) = std::env::var("ETL_LOG_LEVEL") {
            builder = builder.log_level(level);
        }
        if let Ok(format) = std::env::var("ETL_LOG_FORMAT") {
            builder = builder.log_format(format.parse()?);
        }

        builder.build()
    }

    /// Carrega configuração de arquivo
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ETLError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;

        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Carrega configuração de string TOML
    pub fn from_toml(toml_str: &str) -> Result<Self, ETLError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml))
            .build()?;

        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Valida a configuração
    pub fn validate(&self) -> Result<(), ETLError> {
        let invalid = |param: &str, value: String| {
            Err(ETLError::Config(ConfigError::InvalidValue {
                param: param.to_string(),
                value,
            }))
        };

        if self.database.host.trim().is_empty() {
            return Err(ETLError::Config(ConfigError::MissingRequiredParameter(
                "database.host".to_string(),
            )));
        }
        if self.database.port == 0 {
            return invalid("database.port", "0".to_string());
        }
        if self.input.file_path.trim().is_empty() {
            return Err(ETLError::Config(ConfigError::MissingRequiredParameter(
                "input.file_path".to_string(),
            )));
        }
        if self.retry.max_attempts == 0 {
            return invalid("retry.max_attempts", "0".to_string());
        }
        if self.pipeline.progress_interval == 0 {
            return invalid("pipeline.progress_interval", "0".to_string());
        }

        Ok(())
    }
}

/// Builder para configuração da carga
#[derive(Default)]
pub struct ETLConfigBuilder {
    config: ETLConfig,
}

impl ETLConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn db_host(mut self, host: impl Into<String>) -> Self {
        self.config.database.host = host.into();
        self
    }

    pub fn db_port(mut self, port: u16) -> Self {
        self.config.database.port = port;
        self
    }

    pub fn db_user(mut self, user: impl Into<String>) -> Self {
        self.config.database.user = user.into();
        self
    }

    pub fn db_password(mut self, password: impl Into<String>) -> Self {
        self.config.database.password = password.into();
        self
    }

    pub fn db_name(mut self, name: impl Into<String>) -> Self {
        self.config.database.name = name.into();
        self
    }

    pub fn ssl_mode(mut self, ssl_mode: impl Into<String>) -> Self {
        self.config.database.ssl_mode = ssl_mode.into();
        self
    }

    pub fn input_file(mut self, path: impl Into<String>) -> Self {
        self.config.input.file_path = path.into();
        self
    }

    pub fn ping_attempts(mut self, attempts: usize) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    pub fn ping_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.retry.delay_ms = delay_ms;
        self
    }

    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.config.pipeline.progress_interval = interval;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.observability.log_level = level.into();
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.observability.log_format = format;
        self
    }

    pub fn build(self) -> Result<ETLConfig, ETLError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
