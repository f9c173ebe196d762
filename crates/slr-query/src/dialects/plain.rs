//! Motores con booleano "plano": frases entre comillas, sin calificadores de
//! campo en la cadena (los filtros de campo van como parámetros de la API).

use super::{or_group, render_text, Dialect};
use crate::model::SearchTerm;

/// OpenAlex (parámetro `search`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAlexDialect;

/// Semantic Scholar (búsqueda por palabras clave).
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticScholarDialect;

/// CrossRef. Su motor es difuso; el AND explícito mantiene la cadena legible.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossRefDialect;

macro_rules! plain_boolean_dialect {
    ($($name:ident),+ $(,)?) => {
        $(
            impl Dialect for $name {
                fn format_term(&self, term: &SearchTerm) -> String {
                    render_text(term)
                }

                fn join_or(&self, terms: &[String]) -> String {
                    or_group(terms)
                }

                fn join_and(&self, groups: &[String]) -> String {
                    groups.join(" AND ")
                }
            }
        )+
    };
}

plain_boolean_dialect!(OpenAlexDialect, SemanticScholarDialect, CrossRefDialect);
