use super::{or_group, render_text, Dialect};
use crate::model::{FieldTag, SearchTerm};

/// PubMed / MEDLINE.
///
/// Calificadores entre corchetes (`[Title/Abstract]`, `[MeSH Terms]`,
/// `[All Fields]`); cada bloque en su propia línea separado por `AND`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PubMedDialect;

impl Dialect for PubMedDialect {
    fn format_term(&self, term: &SearchTerm) -> String {
        let base = render_text(term);
        let tag = match term.field_tag {
            FieldTag::Keyword => "[Title/Abstract]",
            FieldTag::ControlledVocab => "[MeSH Terms]",
            FieldTag::AllFields => "[All Fields]",
        };
        format!("{base}{tag}")
    }

    fn join_or(&self, terms: &[String]) -> String {
        or_group(terms)
    }

    fn join_and(&self, groups: &[String]) -> String {
        groups.join("\nAND\n")
    }
}
