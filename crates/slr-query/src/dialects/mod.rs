//! Estrategias de dialecto: una implementación por gramática de búsqueda.
//!
//! Cada dialecto es un valor sin estado que implementa tres operaciones
//! puras (`format_term`, `join_or`, `join_and`). `format_not` tiene una
//! implementación por defecto y sólo se sobreescribe cuando el motor usa una
//! sintaxis propia para exclusiones.
//!
//! Las reglas compartidas (escape, comillas, agrupación OR) viven como
//! funciones libres en este módulo; los dialectos las componen en vez de
//! heredar de una base común.

mod arxiv;
mod plain;
mod pubmed;
mod scopus;

pub use arxiv::ArxivDialect;
pub use plain::{CrossRefDialect, OpenAlexDialect, SemanticScholarDialect};
pub use pubmed::PubMedDialect;
pub use scopus::ScopusDialect;

use crate::model::SearchTerm;

/// Gramática booleana de un motor bibliográfico.
pub trait Dialect: Send + Sync {
    /// Decora un término (calificador de campo, comillas).
    fn format_term(&self, term: &SearchTerm) -> String;

    /// Une términos ya formateados con el OR del dialecto.
    fn join_or(&self, terms: &[String]) -> String;

    /// Une grupos OR con el AND del dialecto.
    fn join_and(&self, groups: &[String]) -> String;

    /// Cláusula de exclusión. Por defecto: `NOT (a OR b)`.
    fn format_not(&self, terms: &[String]) -> String {
        let group = self.join_or(terms);
        if group.is_empty() {
            String::new()
        } else {
            format!("NOT {group}")
        }
    }
}

/// Escapa comillas dobles literales.
pub fn escape_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// Texto del término listo para insertar: normalizado, escapado y entre
/// comillas cuando es una frase.
pub fn render_text(term: &SearchTerm) -> String {
    let clean = escape_quotes(&term.normalized_text());
    if term.is_phrase() {
        format!("\"{clean}\"")
    } else {
        clean
    }
}

/// `a OR b OR c` sin envoltorio.
pub fn or_inner(terms: &[String]) -> String {
    terms.join(" OR ")
}

/// Grupo OR con paréntesis sólo cuando hay más de un término.
pub fn or_group(terms: &[String]) -> String {
    match terms {
        [] => String::new(),
        [single] => single.clone(),
        _ => format!("({})", or_inner(terms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_escaped_before_quoting() {
        let t = SearchTerm::new("the \"hard\" problem");
        assert_eq!(render_text(&t), "\"the \\\"hard\\\" problem\"");
        let single = SearchTerm::new("O\"Neil");
        assert_eq!(render_text(&single), "O\\\"Neil");
    }

    #[test]
    fn or_group_wraps_only_multiple_terms() {
        assert_eq!(or_group(&[]), "");
        assert_eq!(or_group(&["a".to_string()]), "a");
        assert_eq!(or_group(&["a".to_string(), "b".to_string()]), "(a OR b)");
    }
}
