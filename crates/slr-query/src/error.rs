//! Errores de síntesis de consultas. Siempre síncronos: renderizar es puro y
//! barato, así que se falla de inmediato.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum QueryError {
    #[error("concept block '{label}' has no search terms")]
    EmptyConceptBlock { label: String },
    #[error("concept block '{label}' contains a blank search term")]
    BlankTerm { label: String },
    #[error("unsupported dialect '{name}' (supported: {supported})")]
    UnsupportedDialect { name: String, supported: String },
    #[error("query plan has no concept blocks")]
    EmptyQueryPlan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = QueryError::EmptyConceptBlock { label: "Outcome".into() };
        assert_eq!(e.to_string(), "concept block 'Outcome' has no search terms");
        let e = QueryError::UnsupportedDialect { name: "unknown-db".into(),
                                                 supported: "pubmed, scopus".into() };
        assert_eq!(e.to_string(), "unsupported dialect 'unknown-db' (supported: pubmed, scopus)");
    }
}
