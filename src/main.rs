use anyhow::Context;
use carga_clientes::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Carrega o arquivo de clientes no PostgreSQL
#[derive(Debug, Parser)]
#[command(name = "carga-clientes", version, about)]
struct Cli {
    /// Arquivo de entrada (padrão: ETL_INPUT_FILE ou base_teste.txt)
    #[arg(short, long)]
    arquivo: Option<PathBuf>,

    /// Arquivo de configuração TOML; sem ele a configuração vem do ambiente
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_logging(config: &ETLConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.observability.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ETLConfig> {
    let mut config = match &cli.config {
        Some(path) => ETLConfig::from_file(path)
            .with_context(|| format!("Falha ao ler {}", path.display()))?,
        None => ETLConfig::from_env().context("Configuração inválida no ambiente")?,
    };

    if let Some(path) = &cli.arquivo {
        config.input.file_path = path.display().to_string();
    }

    Ok(config)
}

async fn run(config: ETLConfig) -> anyhow::Result<PipelineResult> {
    let loader = PgLoader::connect_lazy(&config.database)?;

    loader
        .ping_with_retry(&config.retry)
        .await
        .context("Não foi possível conectar ao PostgreSQL")?;
    println!("Conectado ao banco de dados com sucesso!");

    loader
        .ensure_schema()
        .await
        .context("Falha ao criar a tabela clientes")?;

    let result = Pipeline::builder()
        .extract(FileExtractor::new(&config.input.file_path))
        .load(loader)
        .config(config.pipeline.clone())
        .build()
        .execute()
        .await
        .with_context(|| format!("Carga de {} abortada", config.input.file_path))?;

    Ok(result)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    match run(config).await {
        Ok(result) => {
            println!("Dados carregados com sucesso!");
            println!(
                "   - Registros inseridos: {} ({} documentos inválidos, {} campos nulos)",
                result.rows_inserted, result.invalid_documents, result.fields_nulled
            );
            if result.has_warnings() {
                tracing::warn!(
                    campos_nulos = result.fields_nulled,
                    "Carga confirmada com campos convertidos para NULL"
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = e
                .downcast_ref::<ETLError>()
                .map(ETLError::error_code)
                .unwrap_or("GENERIC_ERROR");
            tracing::error!(codigo = code, "{:#}", e);
            ExitCode::FAILURE
        }
    }
}
