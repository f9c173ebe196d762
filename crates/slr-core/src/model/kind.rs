//! Tipos cerrados de artifact conocidos en compilación.
//!
//! El nombre canónico (`as_str`) es el que se persiste en disco y el que
//! acepta la CLI; `FromStr` admite además alias kebab/snake
//! (`problem-framing`, `problem_framing`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payloads::{ConceptModel, DatabaseQueryPlan, ProblemFraming, ProjectContext, ResearchQuestionSet,
                      ScreeningCriteria, SearchConceptBlocks, StrategyExportBundle};
use super::typed_artifact::{ArtifactDecodeError, ArtifactSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArtifactKind {
    ProjectContext,
    ProblemFraming,
    ConceptModel,
    ResearchQuestionSet,
    SearchConceptBlocks,
    DatabaseQueryPlan,
    ScreeningCriteria,
    StrategyExportBundle,
}

impl ArtifactKind {
    /// Todos los kinds en orden de pipeline.
    pub const ALL: [ArtifactKind; 8] = [ArtifactKind::ProjectContext,
                                        ArtifactKind::ProblemFraming,
                                        ArtifactKind::ConceptModel,
                                        ArtifactKind::ResearchQuestionSet,
                                        ArtifactKind::SearchConceptBlocks,
                                        ArtifactKind::DatabaseQueryPlan,
                                        ArtifactKind::ScreeningCriteria,
                                        ArtifactKind::StrategyExportBundle];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::ProjectContext => "ProjectContext",
            ArtifactKind::ProblemFraming => "ProblemFraming",
            ArtifactKind::ConceptModel => "ConceptModel",
            ArtifactKind::ResearchQuestionSet => "ResearchQuestionSet",
            ArtifactKind::SearchConceptBlocks => "SearchConceptBlocks",
            ArtifactKind::DatabaseQueryPlan => "DatabaseQueryPlan",
            ArtifactKind::ScreeningCriteria => "ScreeningCriteria",
            ArtifactKind::StrategyExportBundle => "StrategyExportBundle",
        }
    }

    /// Valida un payload contra el esquema de su kind.
    pub fn validate_payload(&self, payload: &Value) -> Result<(), ArtifactDecodeError> {
        match self {
            ArtifactKind::ProjectContext => ProjectContext::from_payload(payload).map(drop),
            ArtifactKind::ProblemFraming => ProblemFraming::from_payload(payload).map(drop),
            ArtifactKind::ConceptModel => ConceptModel::from_payload(payload).map(drop),
            ArtifactKind::ResearchQuestionSet => ResearchQuestionSet::from_payload(payload).map(drop),
            ArtifactKind::SearchConceptBlocks => SearchConceptBlocks::from_payload(payload).map(drop),
            ArtifactKind::DatabaseQueryPlan => DatabaseQueryPlan::from_payload(payload).map(drop),
            ArtifactKind::ScreeningCriteria => ScreeningCriteria::from_payload(payload).map(drop),
            ArtifactKind::StrategyExportBundle => StrategyExportBundle::from_payload(payload).map(drop),
        }
    }

    /// Valida y re-codifica el payload con el struct de su kind: todos los
    /// campos del esquema presentes (los opcionales como `null` o su valor por
    /// defecto). Dos payloads equivalentes quedan idénticos y con el mismo hash.
    pub fn normalize_payload(&self, payload: &Value) -> Result<Value, ArtifactDecodeError> {
        match self {
            ArtifactKind::ProjectContext => normalized::<ProjectContext>(payload),
            ArtifactKind::ProblemFraming => normalized::<ProblemFraming>(payload),
            ArtifactKind::ConceptModel => normalized::<ConceptModel>(payload),
            ArtifactKind::ResearchQuestionSet => normalized::<ResearchQuestionSet>(payload),
            ArtifactKind::SearchConceptBlocks => normalized::<SearchConceptBlocks>(payload),
            ArtifactKind::DatabaseQueryPlan => normalized::<DatabaseQueryPlan>(payload),
            ArtifactKind::ScreeningCriteria => normalized::<ScreeningCriteria>(payload),
            ArtifactKind::StrategyExportBundle => normalized::<StrategyExportBundle>(payload),
        }
    }
}

fn normalized<T: ArtifactSpec>(payload: &Value) -> Result<Value, ArtifactDecodeError> {
    T::from_payload(payload)?.to_payload()
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nombre de kind no reconocido.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown artifact kind '{0}'")]
pub struct UnknownArtifactKind(pub String);

impl FromStr for ArtifactKind {
    type Err = UnknownArtifactKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s.trim()
                              .chars()
                              .filter(|c| *c != '-' && *c != '_')
                              .map(|c| c.to_ascii_lowercase())
                              .collect();
        ArtifactKind::ALL.iter()
                         .copied()
                         .find(|k| k.as_str().to_ascii_lowercase() == folded)
                         .ok_or_else(|| UnknownArtifactKind(s.to_string()))
    }
}
