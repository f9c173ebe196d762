//! Modelo de artifacts: kinds cerrados, registro persistido, esquemas de
//! payload y fusión de ediciones.

pub mod artifact;
pub mod edits;
pub mod kind;
pub mod payloads;
pub mod typed_artifact;

pub use artifact::{ApprovalStatus, Artifact};
pub use edits::merge_edits;
pub use kind::{ArtifactKind, UnknownArtifactKind};
pub use payloads::{Concept, ConceptModel, ConceptRelation, DatabaseQuery, DatabaseQueryPlan, ProblemFraming,
                   ProjectContext, QuestionPriority, ResearchQuestion, ResearchQuestionSet, ScreeningCriteria,
                   SearchConceptBlock, SearchConceptBlocks, StrategyExportBundle};
pub use typed_artifact::{ArtifactDecodeError, ArtifactSpec};
