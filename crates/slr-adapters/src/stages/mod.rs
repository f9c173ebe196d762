//! Handlers de los stages incluidos y el registro por defecto.
//!
//! Grafo (requiere -> produce):
//! - project-setup: - -> ProjectContext
//! - problem-framing: ProjectContext -> ProblemFraming, ConceptModel
//! - research-questions: ProblemFraming, ConceptModel -> ResearchQuestionSet
//! - search-concept-expansion: ConceptModel, ResearchQuestionSet -> SearchConceptBlocks
//! - database-query-plan: SearchConceptBlocks -> DatabaseQueryPlan
//! - screening-criteria: ProblemFraming, ConceptModel, ResearchQuestionSet (+ DatabaseQueryPlan opcional) -> ScreeningCriteria
//! - strategy-export: todo lo anterior -> StrategyExportBundle

pub mod export;
pub mod generated;
pub mod query_plan;
pub mod screening;

use std::sync::Arc;

use slr_core::{ArtifactKind, ContentGenerator, PipelineError, StageDefinition, StageRegistry};

pub use export::StrategyExportStage;
pub use generated::GeneratedStage;
pub use query_plan::DatabaseQueryPlanStage;
pub use screening::ScreeningCriteriaStage;

pub const PROJECT_SETUP: &str = "project-setup";
pub const PROBLEM_FRAMING: &str = "problem-framing";
pub const RESEARCH_QUESTIONS: &str = "research-questions";
pub const SEARCH_CONCEPT_EXPANSION: &str = "search-concept-expansion";
pub const DATABASE_QUERY_PLAN: &str = "database-query-plan";
pub const SCREENING_CRITERIA: &str = "screening-criteria";
pub const STRATEGY_EXPORT: &str = "strategy-export";

/// Definiciones de los siete stages en orden de pipeline.
pub fn builtin_definitions() -> Vec<StageDefinition> {
    use ArtifactKind::*;
    vec![StageDefinition::new(PROJECT_SETUP).produces(&[ProjectContext]),
         StageDefinition::new(PROBLEM_FRAMING).requires(&[ProjectContext])
                                              .produces(&[ProblemFraming, ConceptModel]),
         StageDefinition::new(RESEARCH_QUESTIONS).requires(&[ProblemFraming, ConceptModel])
                                                 .produces(&[ResearchQuestionSet]),
         StageDefinition::new(SEARCH_CONCEPT_EXPANSION).requires(&[ConceptModel, ResearchQuestionSet])
                                                       .produces(&[SearchConceptBlocks]),
         StageDefinition::new(DATABASE_QUERY_PLAN).requires(&[SearchConceptBlocks])
                                                  .produces(&[DatabaseQueryPlan]),
         StageDefinition::new(SCREENING_CRITERIA).requires(&[ProblemFraming, ConceptModel, ResearchQuestionSet])
                                                 .optional(&[DatabaseQueryPlan])
                                                 .produces(&[ScreeningCriteria]),
         StageDefinition::new(STRATEGY_EXPORT).requires(&[ProjectContext,
                                                          ProblemFraming,
                                                          ConceptModel,
                                                          ResearchQuestionSet,
                                                          SearchConceptBlocks,
                                                          DatabaseQueryPlan,
                                                          ScreeningCriteria])
                                              .produces(&[StrategyExportBundle]),]
}

/// Registro validado con los siete stages. Los stages de texto libre usan
/// `generator`; el plan de consultas, el cribado y la exportación son
/// deterministas.
pub fn default_registry(generator: Arc<dyn ContentGenerator>,
                        default_databases: Vec<String>)
                        -> Result<StageRegistry, PipelineError> {
    let mut builder = StageRegistry::builder();
    for def in builtin_definitions() {
        let name = def.name.clone();
        builder = match name.as_str() {
            PROJECT_SETUP => builder.bootstrap(def, GeneratedStage::new(Arc::clone(&generator))),
            DATABASE_QUERY_PLAN => builder.stage(def, DatabaseQueryPlanStage::new(default_databases.clone())),
            SCREENING_CRITERIA => builder.stage(def, ScreeningCriteriaStage),
            STRATEGY_EXPORT => builder.stage(def, StrategyExportStage),
            _ => builder.stage(def, GeneratedStage::new(Arc::clone(&generator))),
        };
    }
    builder.build()
}
