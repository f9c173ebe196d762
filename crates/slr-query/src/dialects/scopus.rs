use super::{or_inner, render_text, Dialect};
use crate::model::SearchTerm;

/// Scopus. Cada grupo OR va dentro de un único `TITLE-ABS-KEY(...)` en lugar
/// de envolver término a término.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopusDialect;

impl Dialect for ScopusDialect {
    fn format_term(&self, term: &SearchTerm) -> String {
        render_text(term)
    }

    fn join_or(&self, terms: &[String]) -> String {
        if terms.is_empty() {
            return String::new();
        }
        format!("TITLE-ABS-KEY({})", or_inner(terms))
    }

    fn join_and(&self, groups: &[String]) -> String {
        groups.join(" AND ")
    }

    fn format_not(&self, terms: &[String]) -> String {
        if terms.is_empty() {
            return String::new();
        }
        format!("AND NOT TITLE-ABS-KEY({})", or_inner(terms))
    }
}
