//! Errores de persistencia en disco.
//! Se traducen a `StoreError` del core en la frontera del trait.

use std::io;

use slr_core::{ArtifactKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot serialize {kind}: {source}")]
    Serialize {
        kind: ArtifactKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("corrupted record at {path}: {reason}")]
    Corrupted { path: String, reason: String },
    #[error("invalid project id '{0}'")]
    InvalidProjectId(String),
}

impl PersistenceError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: io::Error) -> Self {
        Self::Io { path: path.as_ref().display().to_string(),
                   source }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Io { path, source } => StoreError::Io { path,
                                                                      reason: source.to_string() },
            PersistenceError::Serialize { kind, source } => StoreError::Serialization { kind,
                                                                                        reason: source.to_string() },
            PersistenceError::Corrupted { path, reason } => StoreError::Corrupted { path, reason },
            PersistenceError::InvalidProjectId(project_id) => StoreError::InvalidProjectId { project_id },
        }
    }
}
