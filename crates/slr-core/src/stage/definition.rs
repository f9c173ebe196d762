use serde::{Deserialize, Serialize};

use crate::model::ArtifactKind;

/// Declaración estática de un stage: qué necesita aprobado y qué produce.
/// Inmutable una vez registrada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub name: String,
    pub required_artifact_kinds: Vec<ArtifactKind>,
    /// Se pasan al handler si están aprobados; nunca bloquean.
    #[serde(default)]
    pub optional_artifact_kinds: Vec<ArtifactKind>,
    pub produces: Vec<ArtifactKind>,
}

impl StageDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               required_artifact_kinds: Vec::new(),
               optional_artifact_kinds: Vec::new(),
               produces: Vec::new() }
    }

    pub fn requires(mut self, kinds: &[ArtifactKind]) -> Self {
        self.required_artifact_kinds.extend_from_slice(kinds);
        self
    }

    pub fn optional(mut self, kinds: &[ArtifactKind]) -> Self {
        self.optional_artifact_kinds.extend_from_slice(kinds);
        self
    }

    pub fn produces(mut self, kinds: &[ArtifactKind]) -> Self {
        self.produces.extend_from_slice(kinds);
        self
    }

    pub fn is_bootstrap(&self) -> bool {
        self.required_artifact_kinds.is_empty()
    }
}
