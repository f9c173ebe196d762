//! Taxonomía de errores del pipeline.
//!
//! - `PipelineError`: errores que se propagan al llamador (recuperables o de
//!   configuración). Cada variante lleva el contexto estructurado necesario
//!   para construir un mensaje preciso sin parsear strings.
//! - `GenerationError`: fallos de un handler / generador de contenido. El
//!   orquestador los captura y los convierte en `validation_errors`.
//! - `StoreError`: fallos de durabilidad. Siempre fatales para la petición.

use slr_query::QueryError;
use thiserror::Error;

use crate::model::ArtifactKind;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("artifact {kind} not found for project '{project_id}'")]
    ArtifactNotFound { project_id: String, kind: ArtifactKind },
    #[error("project '{project_id}' not found")]
    ProjectNotFound { project_id: String },
    #[error("stage '{stage}' requires approved artifacts: {}", join_kinds(.missing))]
    PrerequisiteNotMet { stage: String, missing: Vec<ArtifactKind> },
    #[error("stage '{name}' is not registered")]
    StageNotRegistered { name: String },
    #[error("stage '{name}' is already registered")]
    StageAlreadyRegistered { name: String },
    #[error("artifact {kind} is produced by both '{first}' and '{second}'")]
    DuplicateProducer { kind: ArtifactKind, first: String, second: String },
    #[error("invalid stage graph: {0}")]
    InvalidStageGraph(String),
    #[error("cannot edit field '{field}' of {kind}: {reason}")]
    InvalidEdit { kind: ArtifactKind, field: String, reason: String },
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: ArtifactKind, reason: String },
    /// Fallo del store. Los drafts de un stage se validan todos antes de
    /// escribir, pero si la escritura del segundo kind falla el primero ya
    /// quedó re-drafteado: el stage debe volver a ejecutarse.
    #[error(transparent)]
    Persistence(#[from] StoreError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl PipelineError {
    /// Errores que el usuario puede corregir (aprobar, editar, elegir otro
    /// nombre) frente a fallos de configuración o durabilidad.
    pub fn is_recoverable(&self) -> bool {
        matches!(self,
                 PipelineError::ArtifactNotFound { .. }
                 | PipelineError::ProjectNotFound { .. }
                 | PipelineError::PrerequisiteNotMet { .. }
                 | PipelineError::InvalidEdit { .. }
                 | PipelineError::InvalidPayload { .. }
                 | PipelineError::Query(_))
    }
}

fn join_kinds(kinds: &[ArtifactKind]) -> String {
    kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generation failed in stage '{stage}': {cause}")]
    Failed { stage: String, cause: String },
    #[error("stage '{stage}' could not decode approved {kind}: {reason}")]
    BadContext { stage: String, kind: ArtifactKind, reason: String },
    #[error("stage '{stage}' produced invalid output: {reason}")]
    InvalidOutput { stage: String, reason: String },
}

impl GenerationError {
    pub fn failed(stage: impl Into<String>, cause: impl ToString) -> Self {
        GenerationError::Failed { stage: stage.into(), cause: cause.to_string() }
    }

    pub fn stage(&self) -> &str {
        match self {
            GenerationError::Failed { stage, .. }
            | GenerationError::BadContext { stage, .. }
            | GenerationError::InvalidOutput { stage, .. } => stage,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("persistence I/O failure at {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("failed to serialize {kind}: {reason}")]
    Serialization { kind: ArtifactKind, reason: String },
    #[error("corrupted artifact record at {path}: {reason}")]
    Corrupted { path: String, reason: String },
    #[error("invalid project id '{project_id}'")]
    InvalidProjectId { project_id: String },
}
