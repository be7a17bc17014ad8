//! # Carga de Clientes
//!
//! Carga de arquivos de largura fixa com registros de compras de clientes
//! para a tabela `clientes` do PostgreSQL, em uma única transação.
//!
//! ## Características Principais
//!
//! - 🔒 **Tudo ou nada**: o arquivo inteiro é confirmado ou nada é gravado
//! - 🧾 **CPF/CNPJ**: validação dos dígitos verificadores
//! - 🔤 **Higienização**: texto em caixa alta e sem acentos
//! - 🕳️ **NULL tolerante**: datas e decimais malformados viram NULL com aviso
//!
//! ## Exemplo Rápido
//!
//! ```rust,no_run
//! use carga_clientes::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let loader = MemoryLoader::new();
//!
//!     let result = Pipeline::builder()
//!         .extract(FileExtractor::new("base_teste.txt"))
//!         .load(loader.clone())
//!         .build()
//!         .execute()
//!         .await?;
//!
//!     println!("{} registros inseridos", result.rows_inserted);
//!     Ok(())
//! }
//! ```
//!
//! ## Arquitetura
//!
//! ### Extract
//! Leitura do arquivo linha a linha e fatiamento no layout de largura fixa.
//!
//! ### Transform
//! Higienização de texto, validação de documentos e conversão de campos.
//!
//! ### Load
//! Destinos transacionais: PostgreSQL (feature `database`) e memória.

pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod traits;
pub mod transform;
pub mod types;

// Re-exports para facilitar o uso
pub use config::ETLConfig;
pub use error::{ETLError, Result};
pub use pipeline::Pipeline;
pub use traits::*;
pub use types::{CustomerRecord, PipelineEvent, PipelineResult, PipelineState, RawRecord};

/// Prelude com imports mais comuns
pub mod prelude {
    pub use crate::config::{ETLConfig, LogFormat};
    pub use crate::error::{ETLError, Result};
    pub use crate::events::{InMemoryEventEmitter, LoggingEventEmitter};
    pub use crate::extract::file::FileExtractor;
    pub use crate::extract::fixed_width::{parse_line, MIN_LINE_WIDTH};
    pub use crate::load::memory::MemoryLoader;
    pub use crate::pipeline::Pipeline;
    pub use crate::traits::{EventEmitter, Extractor, LoadTransaction, Loader, RetryConfig};
    pub use crate::transform::coerce::{coerce_date, coerce_decimal};
    pub use crate::transform::document::{is_valid_document, DocumentKind};
    pub use crate::transform::normalize::normalize;
    pub use crate::types::{CustomerRecord, PipelineResult, PipelineState};

    #[cfg(feature = "database")]
    pub use crate::load::postgres::PgLoader;
}

/// Informações sobre a versão da biblioteca
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Informações sobre a biblioteca
pub fn about() -> &'static str {
    env!("CARGO_PKG_DESCRIPTION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_about() {
        assert!(about().contains("CPF"));
    }
}
