//! # Higienização de texto
//!
//! Converte campos livres para maiúsculas e remove os acentos do português.

/// Caixa alta seguida da remoção de acentos
///
/// ```rust
/// use carga_clientes::transform::normalize::normalize;
///
/// assert_eq!(normalize("joão"), "JOAO");
/// assert_eq!(normalize("Padaria São Tomé 2"), "PADARIA SAO TOME 2");
/// ```
pub fn normalize(text: &str) -> String {
    text.to_uppercase().chars().map(fold_accent).collect()
}

/// Mapeia uma letra acentuada para sua forma maiúscula sem acento
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' | 'Ç' => 'C',
        other => other,
    }
}
