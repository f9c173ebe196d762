//! slr-adapters: handlers de los siete stages incluidos y el generador local
//! `HeuristicGenerator`.
//!
//! `default_registry` conecta ambos en un `StageRegistry` validado listo para
//! `PipelineController`.
pub mod generator;
pub mod stages;
pub mod text;

pub use generator::HeuristicGenerator;
pub use stages::{builtin_definitions, default_registry, DatabaseQueryPlanStage, GeneratedStage, ScreeningCriteriaStage,
                 StrategyExportStage, DATABASE_QUERY_PLAN, PROBLEM_FRAMING, PROJECT_SETUP, RESEARCH_QUESTIONS,
                 SCREENING_CRITERIA, SEARCH_CONCEPT_EXPANSION, STRATEGY_EXPORT};
