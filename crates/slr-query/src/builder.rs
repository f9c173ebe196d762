//! `SyntaxBuilder`: renderiza un `QueryPlan` con un dialecto concreto.
//!
//! El registro de dialectos es cerrado y estático; `get_builder` resuelve el
//! nombre sin distinguir mayúsculas. Añadir un dialecto nuevo sólo requiere
//! implementar `Dialect` y añadir una entrada a `REGISTRY`.

use log::warn;

use crate::dialects::{ArxivDialect, CrossRefDialect, Dialect, OpenAlexDialect, PubMedDialect, ScopusDialect,
                      SemanticScholarDialect};
use crate::error::QueryError;
use crate::model::QueryPlan;

static REGISTRY: [(&str, &dyn Dialect); 6] = [("pubmed", &PubMedDialect),
                                              ("scopus", &ScopusDialect),
                                              ("arxiv", &ArxivDialect),
                                              ("openalex", &OpenAlexDialect),
                                              ("semanticscholar", &SemanticScholarDialect),
                                              ("crossref", &CrossRefDialect)];

/// Nombres canónicos de los dialectos registrados, en orden de registro.
pub fn supported_dialects() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}

/// Resuelve un dialecto por nombre (case-insensitive).
pub fn get_builder(name: &str) -> Result<SyntaxBuilder, QueryError> {
    let wanted = name.trim().to_ascii_lowercase();
    match REGISTRY.iter().find(|(n, _)| *n == wanted) {
        Some((n, dialect)) => Ok(SyntaxBuilder::with_dialect(*n, *dialect)),
        None => {
            warn!("dialect '{}' is not registered", name);
            Err(QueryError::UnsupportedDialect { name: name.to_string(),
                                                 supported: supported_dialects().join(", ") })
        }
    }
}

/// Traductor puro `QueryPlan -> String` para un dialecto.
#[derive(Clone, Copy)]
pub struct SyntaxBuilder {
    name: &'static str,
    dialect: &'static dyn Dialect,
}

impl std::fmt::Debug for SyntaxBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxBuilder").field("dialect", &self.name).finish()
    }
}

impl SyntaxBuilder {
    /// Construye un builder para un dialecto fuera del registro cerrado.
    pub fn with_dialect(name: &'static str, dialect: &'static dyn Dialect) -> Self {
        Self { name, dialect }
    }

    pub fn dialect_name(&self) -> &'static str {
        self.name
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect
    }

    /// Renderiza el plan completo.
    ///
    /// Todos los bloques se validan antes de formatear nada: un bloque sin
    /// términos (o con un término en blanco) aborta sin salida parcial.
    /// Los términos excluidos de todos los bloques se añaden al final con
    /// `format_not`.
    pub fn build(&self, plan: &QueryPlan) -> Result<String, QueryError> {
        validate_plan(plan)?;

        let groups: Vec<String> = plan.blocks
                                      .iter()
                                      .map(|block| {
                                          let terms: Vec<String> =
                                              block.terms.iter().map(|t| self.dialect.format_term(t)).collect();
                                          self.dialect.join_or(&terms)
                                      })
                                      .collect();
        let main = self.dialect.join_and(&groups);

        let excluded: Vec<String> = plan.blocks
                                        .iter()
                                        .flat_map(|b| b.excluded.iter())
                                        .filter(|t| !t.is_blank())
                                        .map(|t| self.dialect.format_term(t))
                                        .collect();
        if excluded.is_empty() {
            return Ok(main);
        }
        let not_clause = self.dialect.format_not(&excluded);
        if not_clause.is_empty() {
            Ok(main)
        } else {
            Ok(format!("{main} {not_clause}"))
        }
    }
}

fn validate_plan(plan: &QueryPlan) -> Result<(), QueryError> {
    if plan.blocks.is_empty() {
        return Err(QueryError::EmptyQueryPlan);
    }
    for block in &plan.blocks {
        if block.is_empty() {
            return Err(QueryError::EmptyConceptBlock { label: block.label.clone() });
        }
        if block.terms.iter().any(|t| t.is_blank()) {
            return Err(QueryError::BlankTerm { label: block.label.clone() });
        }
    }
    Ok(())
}
