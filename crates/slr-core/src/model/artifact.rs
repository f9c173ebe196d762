//! Registro persistido de un artifact.
//!
//! Hay un único registro por (proyecto, kind): aprobar o regenerar lo
//! sobreescribe en el sitio, sin historial de versiones.
//! - `hash` es blake3 sobre el JSON canónico del payload; se recalcula en
//!   cada escritura.
//! - `user_notes` guarda la nota de la última aprobación.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ArtifactDecodeError, ArtifactKind, ArtifactSpec};
use crate::hashing::hash_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Draft,
    Approved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub status: ApprovalStatus,
    pub payload: Value,
    pub hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub user_notes: Option<String>,
}

impl Artifact {
    /// Nuevo registro en estado DRAFT.
    pub fn draft(kind: ArtifactKind, payload: Value) -> Self {
        let now = Utc::now();
        Self { kind,
               status: ApprovalStatus::Draft,
               hash: hash_value(&payload),
               payload,
               created_at: now,
               updated_at: now,
               user_notes: None }
    }

    /// Reemplaza el payload de un registro existente volviendo a DRAFT.
    /// Conserva `created_at`.
    pub(crate) fn redraft(self, payload: Value) -> Self {
        Self { hash: hash_value(&payload),
               payload,
               status: ApprovalStatus::Draft,
               updated_at: Utc::now(),
               user_notes: None,
               ..self }
    }

    /// Transición DRAFT -> APPROVED con el payload final (ya fusionado).
    pub(crate) fn approved(self, payload: Value, note: Option<String>) -> Self {
        Self { hash: hash_value(&payload),
               payload,
               status: ApprovalStatus::Approved,
               updated_at: Utc::now(),
               user_notes: note,
               ..self }
    }

    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }

    /// Decodifica el payload como su struct tipado.
    pub fn decode<T: ArtifactSpec>(&self) -> Result<T, ArtifactDecodeError> {
        T::from_artifact(self)
    }
}
