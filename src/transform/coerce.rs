//! # Conversão de campos
//!
//! Datas e decimais do arquivo chegam como texto. Valores sentinela viram
//! NULL; valores malformados também viram NULL, com um aviso no log, e o
//! registro segue para a carga.

use chrono::NaiveDate;
use crate::error::TransformError;

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_NULLS: [&str; 3] = ["", "NULL", "0"];
const DECIMAL_NULLS: [&str; 3] = ["", "NULL", "NU"];

/// Converte `YYYY-MM-DD`, distinguindo sentinela (`Ok(None)`) de erro
pub fn try_coerce_date(raw: &str) -> Result<Option<NaiveDate>, TransformError> {
    if DATE_NULLS.contains(&raw) {
        return Ok(None);
    }

    // `%Y-%m-%d` do chrono aceita sinal e componentes sem zero à esquerda
    if !has_date_shape(raw) {
        return Err(TransformError::InvalidDate {
            value: raw.to_string(),
            reason: "formato esperado AAAA-MM-DD".to_string(),
        });
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|e| TransformError::InvalidDate {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn has_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Converte um decimal com vírgula ou ponto
pub fn try_coerce_decimal(raw: &str) -> Result<Option<f64>, TransformError> {
    if DECIMAL_NULLS.contains(&raw) {
        return Ok(None);
    }

    raw.replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|e| TransformError::InvalidDecimal {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Resolve a conversão de uma coluna: erro vira NULL com aviso no log.
/// O `bool` indica se o valor foi descartado.
pub fn coerce_column<T>(
    column: &str,
    converted: Result<Option<T>, TransformError>,
) -> (Option<T>, bool) {
    match converted {
        Ok(value) => (value, false),
        Err(e) => {
            tracing::warn!(campo = column, erro = %e, "Valor será definido como NULL.");
            (None, true)
        }
    }
}

/// Como `try_coerce_date`, mas nunca falha
pub fn coerce_date(raw: &str) -> Option<NaiveDate> {
    coerce_column("data", try_coerce_date(raw)).0
}

/// Como `try_coerce_decimal`, mas nunca falha
pub fn coerce_decimal(raw: &str) -> Option<f64> {
    coerce_column("decimal", try_coerce_decimal(raw)).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_sentinels() {
        assert_eq!(coerce_date("NULL"), None);
        assert_eq!(coerce_date(""), None);
        assert_eq!(coerce_date("0"), None);
        assert_eq!(try_coerce_date("0"), Ok(None));
    }

    #[test]
    fn test_date_parse() {
        assert_eq!(coerce_date("2023-05-17"), NaiveDate::from_ymd_opt(2023, 5, 17));
    }

    #[test]
    fn test_date_wrong_format_is_null() {
        assert_eq!(coerce_date("17/05/2023"), None);
        assert!(matches!(
            try_coerce_date("17/05/2023"),
            Err(TransformError::InvalidDate { .. })
        ));
        assert!(try_coerce_date("2023-02-30").is_err());
    }

    #[test]
    fn test_date_requires_zero_padded_layout() {
        assert_eq!(coerce_date("2023-5-7"), None);
        assert!(try_coerce_date("+2023-05-17").is_err());
        assert!(try_coerce_date("2023-05-17 ").is_err());
        assert!(try_coerce_date("02023-05-17").is_err());
        assert_eq!(coerce_date("2023-05-07"), NaiveDate::from_ymd_opt(2023, 5, 7));
    }

    #[test]
    fn test_coerce_column_reports_discarded_value() {
        assert_eq!(coerce_column("ticket_medio", try_coerce_decimal("abc")), (None, true));
        assert_eq!(coerce_column("ticket_medio", try_coerce_decimal("NU")), (None, false));
        assert_eq!(coerce_column("ticket_medio", try_coerce_decimal("2,5")), (Some(2.5), false));
    }

    #[test]
    fn test_decimal_sentinels() {
        assert_eq!(coerce_decimal("NU"), None);
        assert_eq!(coerce_decimal("NULL"), None);
        assert_eq!(coerce_decimal(""), None);
    }

    #[test]
    fn test_decimal_comma_and_point() {
        assert_eq!(coerce_decimal("1234,56"), Some(1234.56));
        assert_eq!(coerce_decimal("0.5"), Some(0.5));
        assert_eq!(coerce_decimal("-7"), Some(-7.0));
    }

    #[test]
    fn test_decimal_malformed_is_null() {
        assert_eq!(coerce_decimal("abc"), None);
        assert_eq!(coerce_decimal("1.234,56"), None);
        assert!(matches!(
            try_coerce_decimal("abc"),
            Err(TransformError::InvalidDecimal { .. })
        ));
    }

    #[test]
    fn test_sentinels_are_type_specific() {
        // "NU" só é sentinela para decimais, "0" só para datas
        assert!(try_coerce_date("NU").is_err());
        assert_eq!(try_coerce_decimal("0"), Ok(Some(0.0)));
    }
}
