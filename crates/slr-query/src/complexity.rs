//! Análisis heurístico de complejidad de una consulta renderizada.
//!
//! Factores: número de bloques (más bloques = más restrictiva), términos por
//! bloque (más sinónimos = menos restrictiva), términos excluidos y longitud
//! de la cadena final (límites prácticos de algunos motores).

use serde::{Deserialize, Serialize};

use crate::model::QueryPlan;

pub const PUBMED_MAX_CHARS: usize = 4000;
pub const SCOPUS_SOFT_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    VeryBroad,
    Broad,
    Moderate,
    ModerateBroad,
    Balanced,
    Narrow,
    VeryNarrow,
}

impl ComplexityLevel {
    pub fn is_broad(&self) -> bool {
        matches!(self, ComplexityLevel::VeryBroad | ComplexityLevel::Broad)
    }

    pub fn is_narrow(&self) -> bool {
        matches!(self, ComplexityLevel::VeryNarrow | ComplexityLevel::Narrow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLevel::VeryBroad => "very_broad",
            ComplexityLevel::Broad => "broad",
            ComplexityLevel::Moderate => "moderate",
            ComplexityLevel::ModerateBroad => "moderate_broad",
            ComplexityLevel::Balanced => "balanced",
            ComplexityLevel::Narrow => "narrow",
            ComplexityLevel::VeryNarrow => "very_narrow",
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityReport {
    pub complexity_level: ComplexityLevel,
    pub total_terms: usize,
    pub num_blocks: usize,
    /// Redondeado a un decimal.
    pub avg_terms_per_block: f64,
    pub excluded_terms: usize,
    pub query_length: usize,
    pub expected_results: String,
    pub guidance: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Calcula el informe para `query` (ya renderizada con `dialect`).
pub fn analyze(plan: &QueryPlan, dialect: &str, query: &str) -> ComplexityReport {
    let total_terms = plan.total_terms();
    let num_blocks = plan.blocks.len();
    let excluded_terms = plan.excluded_terms();
    let query_length = query.chars().count();
    let avg = total_terms as f64 / num_blocks.max(1) as f64;

    let (level, expected, guidance) = match num_blocks {
        0 | 1 if avg > 15.0 => (ComplexityLevel::VeryBroad,
                                "10,000+",
                                "Single concept with many synonyms - may return thousands of results. Consider adding more concept blocks to narrow scope."),
        0 | 1 if avg > 8.0 => (ComplexityLevel::Broad,
                               "1,000-10,000",
                               "Single concept block - results may be too broad. Consider adding outcome or population filters."),
        0 | 1 => (ComplexityLevel::Moderate, "100-1,000", "Single focused concept - good for exploratory searches."),
        n if n >= 6 => (ComplexityLevel::VeryNarrow,
                        "< 50",
                        "Many concept blocks with AND logic - may miss relevant studies. Consider combining related concepts."),
        n if n >= 4 => (ComplexityLevel::Narrow,
                        "50-500",
                        "Highly specific query - good for precise topics. Verify all blocks are essential."),
        _ if avg > 10.0 => (ComplexityLevel::ModerateBroad,
                            "500-5,000",
                            "Good balance - multiple concepts with rich synonyms. May need manual screening."),
        _ => (ComplexityLevel::Balanced,
              "100-1,000",
              "Well-balanced query - recommended complexity for systematic reviews."),
    };
    let mut guidance = guidance.to_string();
    if excluded_terms > 5 {
        guidance.push_str(&format!(" Note: {excluded_terms} excluded terms will further narrow results."));
    }

    let mut warnings = Vec::new();
    match dialect.to_ascii_lowercase().as_str() {
        "pubmed" if query_length > PUBMED_MAX_CHARS => warnings.push(format!(
            "Query exceeds PubMed's {PUBMED_MAX_CHARS} character limit ({query_length} chars). Simplify query or split into multiple searches."
        )),
        "scopus" if query_length > SCOPUS_SOFT_MAX_CHARS => warnings.push(format!(
            "Query is very long ({query_length} chars) - may cause Scopus UI issues. Consider simplifying."
        )),
        _ => {}
    }

    ComplexityReport { complexity_level: level,
                       total_terms,
                       num_blocks,
                       avg_terms_per_block: (avg * 10.0).round() / 10.0,
                       excluded_terms,
                       query_length,
                       expected_results: expected.to_string(),
                       guidance,
                       warnings }
}
