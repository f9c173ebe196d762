use super::{or_group, render_text, Dialect};
use crate::model::SearchTerm;

/// API de arXiv. No hay vocabulario controlado: todos los términos se buscan
/// con el prefijo `all:`. La exclusión usa el operador `ANDNOT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArxivDialect;

impl Dialect for ArxivDialect {
    fn format_term(&self, term: &SearchTerm) -> String {
        format!("all:{}", render_text(term))
    }

    fn join_or(&self, terms: &[String]) -> String {
        or_group(terms)
    }

    fn join_and(&self, groups: &[String]) -> String {
        groups.join(" AND ")
    }

    fn format_not(&self, terms: &[String]) -> String {
        let group = self.join_or(terms);
        if group.is_empty() {
            String::new()
        } else {
            format!("ANDNOT {group}")
        }
    }
}
