//! # Layout de largura fixa
//!
//! Fatia uma linha do arquivo de clientes nas posições (em bytes) do layout:
//!
//! | campo                  | bytes       |
//! |------------------------|-------------|
//! | CPF/CNPJ               | `[0, 18)`   |
//! | PRIVATE                | `[19, 30)`  |
//! | INCOMPLETO             | `[31, 42)`  |
//! | DATA DA ÚLTIMA COMPRA  | `[43, 64)`  |
//! | TICKET MÉDIO           | `[65, 86)`  |
//! | TICKET DA ÚLTIMA COMPRA| `[87, 110)` |
//! | LOJA MAIS FREQUENTE    | `[111, 130)`|
//! | LOJA DA ÚLTIMA COMPRA  | `[130, fim)`|

use std::ops::Range;
use crate::error::{ExtractError, Result};
use crate::types::RawRecord;

/// Largura mínima de uma linha de dados
pub const MIN_LINE_WIDTH: usize = 131;

const DOCUMENT: Range<usize> = 0..18;
const PRIVATE_FLAG: Range<usize> = 19..30;
const INCOMPLETE_FLAG: Range<usize> = 31..42;
const LAST_PURCHASE_DATE: Range<usize> = 43..64;
const AVERAGE_TICKET: Range<usize> = 65..86;
const LAST_PURCHASE_TICKET: Range<usize> = 87..110;
const MOST_FREQUENT_STORE: Range<usize> = 111..130;
const LAST_PURCHASE_STORE_START: usize = 130;

/// Extrai os campos de uma linha; `line_number` conta a partir de 1
pub fn parse_line(line: &[u8], line_number: usize) -> Result<RawRecord> {
    if line.len() < MIN_LINE_WIDTH {
        return Err(out_of_range(line, line_number).into());
    }

    let field = |range: Range<usize>| -> Result<String> {
        line.get(range)
            .map(trimmed)
            .ok_or_else(|| out_of_range(line, line_number).into())
    };

    Ok(RawRecord {
        document: field(DOCUMENT)?,
        is_private: field(PRIVATE_FLAG)? == "1",
        is_incomplete: field(INCOMPLETE_FLAG)? == "1",
        last_purchase_date: field(LAST_PURCHASE_DATE)?,
        average_ticket: field(AVERAGE_TICKET)?,
        last_purchase_ticket: field(LAST_PURCHASE_TICKET)?,
        most_frequent_store: field(MOST_FREQUENT_STORE)?,
        last_purchase_store: field(LAST_PURCHASE_STORE_START..line.len())?,
    })
}

fn trimmed(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

fn out_of_range(line: &[u8], line_number: usize) -> ExtractError {
    ExtractError::OutOfRange {
        line: line_number,
        required: MIN_LINE_WIDTH,
        actual: line.len(),
    }
}

/// Monta uma linha no layout; usado por testes e benchmarks
///
/// Os sete primeiros campos são truncados à largura da coluna. O último é
/// anexado inteiro a partir do byte 130, então a linha tem
/// `max(130 + len(último), MIN_LINE_WIDTH)` bytes.
pub fn format_line(fields: [&str; 8]) -> String {
    let spans = [
        DOCUMENT,
        PRIVATE_FLAG,
        INCOMPLETE_FLAG,
        LAST_PURCHASE_DATE,
        AVERAGE_TICKET,
        LAST_PURCHASE_TICKET,
        MOST_FREQUENT_STORE,
    ];

    let mut line = vec![b' '; LAST_PURCHASE_STORE_START];
    for (span, value) in spans.iter().zip(fields.iter()) {
        let bytes = value.as_bytes();
        let n = bytes.len().min(span.end - span.start);
        line[span.start..span.start + n].copy_from_slice(&bytes[..n]);
    }
    line.extend_from_slice(fields[7].as_bytes());
    if line.len() < MIN_LINE_WIDTH {
        line.resize(MIN_LINE_WIDTH, b' ');
    }

    String::from_utf8_lossy(&line).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ETLError;

    fn sample() -> String {
        format_line([
            "041.091.641-25",
            "1",
            "0",
            "2012-12-12",
            "1234,56",
            "NULL",
            "LOJA CENTRO",
            "LOJA NORTE",
        ])
    }

    #[test]
    fn test_format_line_width() {
        assert_eq!(sample().len(), LAST_PURCHASE_STORE_START + "LOJA NORTE".len());

        let padded = format_line(["x", "1", "0", "", "", "", "", ""]);
        assert_eq!(padded.len(), MIN_LINE_WIDTH);
        assert!(parse_line(padded.as_bytes(), 2).is_ok());
    }

    #[test]
    fn test_parse_line() {
        let record = parse_line(sample().as_bytes(), 2).unwrap();
        assert_eq!(record.document, "041.091.641-25");
        assert!(record.is_private);
        assert!(!record.is_incomplete);
        assert_eq!(record.last_purchase_date, "2012-12-12");
        assert_eq!(record.average_ticket, "1234,56");
        assert_eq!(record.last_purchase_ticket, "NULL");
        assert_eq!(record.most_frequent_store, "LOJA CENTRO");
        assert_eq!(record.last_purchase_store, "LOJA NORTE");
    }

    #[test]
    fn test_last_field_runs_to_end_of_line() {
        let line = format!("{}  COM SUFIXO LONGO", sample().trim_end());
        let record = parse_line(line.as_bytes(), 2).unwrap();
        assert_eq!(record.last_purchase_store, "LOJA NORTE  COM SUFIXO LONGO");
    }

    #[test]
    fn test_flags_require_exact_one() {
        let line = format_line(["x", "01", "true", "", "", "", "", ""]);
        let record = parse_line(line.as_bytes(), 2).unwrap();
        assert!(!record.is_private);
        assert!(!record.is_incomplete);
    }

    #[test]
    fn test_short_line_is_out_of_range() {
        let err = parse_line(b"12345678901 1 0", 7).unwrap_err();
        match err {
            ETLError::Extract(ExtractError::OutOfRange { line, required, actual }) => {
                assert_eq!(line, 7);
                assert_eq!(required, MIN_LINE_WIDTH);
                assert_eq!(actual, 15);
            }
            other => panic!("erro inesperado: {:?}", other),
        }

        let full = sample();
        let almost = &full.as_bytes()[..MIN_LINE_WIDTH - 1];
        assert!(matches!(
            parse_line(almost, 2),
            Err(ETLError::Extract(ExtractError::OutOfRange { actual: 130, .. }))
        ));
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let mut line = sample().into_bytes();
        // "é" ocupando os bytes 129 e 130, cortado pelo limite do campo
        line[129] = 0xC3;
        line[130] = 0xA9;
        let record = parse_line(&line, 2).unwrap();
        assert!(record.most_frequent_store.starts_with("LOJA CENTRO"));
    }
}
