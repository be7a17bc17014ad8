//! # Montagem do registro
//!
//! Junta higienização, validação de documentos e conversão de campos em um
//! `CustomerRecord` pronto para inserção.

use crate::error::TransformError;
use crate::transform::coerce::{coerce_column, try_coerce_date, try_coerce_decimal};
use crate::transform::document::is_valid_document;
use crate::transform::normalize::normalize;
use crate::types::{CustomerRecord, RawRecord};

/// Resultado da montagem de um registro
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub record: CustomerRecord,
    /// Campos malformados gravados como NULL
    pub nulled_fields: Vec<&'static str>,
}

/// Higieniza, valida e converte os campos brutos de uma linha
pub fn build_record(raw: RawRecord) -> Transformed {
    let mut nulled_fields = Vec::new();

    let document = normalize(&raw.document);
    let most_frequent_store = normalize(&raw.most_frequent_store);
    let last_purchase_store = normalize(&raw.last_purchase_store);

    let document_valid = is_valid_document(&document);
    // cnpj_valido: as colunas de loja são texto livre, mas a checagem
    // legada é feita sobre os dois nomes de loja.
    let store_document_valid =
        is_valid_document(&most_frequent_store) && is_valid_document(&last_purchase_store);

    let last_purchase_date = column(
        "data_ultima_compra",
        try_coerce_date(&raw.last_purchase_date),
        &mut nulled_fields,
    );
    let average_ticket = column(
        "ticket_medio",
        try_coerce_decimal(&raw.average_ticket),
        &mut nulled_fields,
    );
    let last_purchase_ticket = column(
        "ticket_ultima_compra",
        try_coerce_decimal(&raw.last_purchase_ticket),
        &mut nulled_fields,
    );

    Transformed {
        record: CustomerRecord {
            document,
            is_private: raw.is_private,
            is_incomplete: raw.is_incomplete,
            last_purchase_date,
            average_ticket,
            last_purchase_ticket,
            most_frequent_store,
            last_purchase_store,
            document_valid,
            store_document_valid,
        },
        nulled_fields,
    }
}

fn column<T>(
    name: &'static str,
    converted: Result<Option<T>, TransformError>,
    nulled_fields: &mut Vec<&'static str>,
) -> Option<T> {
    let (value, discarded) = coerce_column(name, converted);
    if discarded {
        nulled_fields.push(name);
    }
    value
}
