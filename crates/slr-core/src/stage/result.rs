use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::ArtifactKind;

/// Resultado transitorio de una ejecución de stage. Nunca se persiste tal
/// cual: el llamador guarda sus drafts a través de `ArtifactManager`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage_name: String,
    pub project_id: String,
    pub draft_artifacts: BTreeMap<ArtifactKind, Value>,
    pub validation_errors: Vec<String>,
    #[serde(default)]
    pub prompts: Vec<String>,
    #[serde(default)]
    pub extra_data: Map<String, Value>,
}

impl StageResult {
    pub fn failed(stage: &str, project_id: &str, errors: Vec<String>) -> Self {
        Self { stage_name: stage.to_string(),
               project_id: project_id.to_string(),
               draft_artifacts: BTreeMap::new(),
               validation_errors: errors,
               prompts: Vec::new(),
               extra_data: Map::new() }
    }

    pub fn is_success(&self) -> bool {
        self.validation_errors.is_empty() && !self.draft_artifacts.is_empty()
    }

    pub fn draft(&self, kind: ArtifactKind) -> Option<&Value> {
        self.draft_artifacts.get(&kind)
    }
}
