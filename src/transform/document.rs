//! # Validação de CPF/CNPJ
//!
//! Cálculo dos dígitos verificadores de documentos brasileiros. O documento
//! é reduzido aos seus dígitos antes da validação, então máscaras como
//! `529.982.247-25` ou `11.222.333/0001-81` são aceitas.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^0-9]").expect("padrão de não-dígitos é válido")
});

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Tipo de documento, decidido pela quantidade de dígitos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Cpf,
    Cnpj,
    Unknown,
}

impl DocumentKind {
    pub fn classify(raw: &str) -> Self {
        match only_digits(raw).len() {
            CPF_LEN => DocumentKind::Cpf,
            CNPJ_LEN => DocumentKind::Cnpj,
            _ => DocumentKind::Unknown,
        }
    }
}

/// Remove tudo que não for dígito ASCII
pub fn only_digits(raw: &str) -> String {
    NON_DIGIT.replace_all(raw, "").into_owned()
}

/// Valida um CPF ou CNPJ; qualquer outro tamanho é inválido
pub fn is_valid_document(raw: &str) -> bool {
    let digits = only_digits(raw);
    match digits.len() {
        CPF_LEN => cpf_digits_match(&to_digits(&digits)),
        CNPJ_LEN => cnpj_digits_match(&to_digits(&digits)),
        _ => false,
    }
}

pub fn is_valid_cpf(raw: &str) -> bool {
    let digits = only_digits(raw);
    digits.len() == CPF_LEN && cpf_digits_match(&to_digits(&digits))
}

pub fn is_valid_cnpj(raw: &str) -> bool {
    let digits = only_digits(raw);
    digits.len() == CNPJ_LEN && cnpj_digits_match(&to_digits(&digits))
}

fn to_digits(digits: &str) -> Vec<u32> {
    digits.bytes().map(|b| u32::from(b - b'0')).collect()
}

/// Resto < 2 vira dígito 0; caso contrário 11 - resto
fn check_digit(sum: u32) -> u32 {
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

fn cpf_digits_match(d: &[u32]) -> bool {
    let first: u32 = (0..9).map(|i| d[i] * (10 - i as u32)).sum();
    let second: u32 = (0..10).map(|i| d[i] * (11 - i as u32)).sum();
    d[9] == check_digit(first) && d[10] == check_digit(second)
}

fn cnpj_digits_match(d: &[u32]) -> bool {
    let weighted = |weights: &[u32]| -> u32 {
        weights.iter().zip(d).map(|(w, digit)| w * digit).sum()
    };
    d[12] == check_digit(weighted(&CNPJ_FIRST_WEIGHTS))
        && d[13] == check_digit(weighted(&CNPJ_SECOND_WEIGHTS))
}
