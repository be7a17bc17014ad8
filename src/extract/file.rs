//! # File Extractor
//!
//! Leitura sequencial do arquivo de entrada, linha a linha, como bytes.
//! O layout é medido em bytes, então as linhas não passam por decodificação
//! aqui.

use async_trait::async_trait;
use futures::stream;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use crate::error::{ETLError, ExtractError, Result};
use crate::traits::{Extractor, LineStream};

/// Extrator para arquivos texto de largura fixa
#[derive(Debug, Clone)]
pub struct FileExtractor {
    file_path: PathBuf,
}

impl FileExtractor {
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Remove `\n` e um `\r` anterior, se houver
fn strip_line_ending(mut line: Vec<u8>) -> Vec<u8> {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    line
}

#[async_trait]
impl Extractor for FileExtractor {
    async fn open(&self) -> Result<LineStream> {
        let path = self.file_path.display().to_string();
        let file = File::open(&self.file_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractError::FileNotFound(path.clone())
            } else {
                ExtractError::FileOpen {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        let reader = BufReader::new(file);
        let lines = stream::unfold(Some((reader, 0usize)), |state| async move {
            let (mut reader, read) = state?;
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => None,
                Ok(_) => Some((Ok(strip_line_ending(buf)), Some((reader, read + 1)))),
                Err(e) => {
                    let err = ExtractError::Read {
                        line: read + 1,
                        source: e,
                    };
                    Some((Err(ETLError::from(err)), None))
                }
            }
        });

        Ok(Box::pin(lines))
    }

    fn describe(&self) -> String {
        self.file_path.display().to_string()
    }
}
