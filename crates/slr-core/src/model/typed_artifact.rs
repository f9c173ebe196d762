//! Tipado fuerte de payloads: cada kind tiene un struct con su esquema y
//! validaciones ligeras. El núcleo almacena JSON; este trait es el único
//! contrato de (de)serialización por kind.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{Artifact, ArtifactKind};

/// Errores posibles al decodificar un payload tipado.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactDecodeError {
    #[error("expected {expected} artifact, found {found}")]
    KindMismatch { expected: ArtifactKind, found: ArtifactKind },
    #[error("payload does not match schema: {0}")]
    Deserialize(String),
    #[error("payload failed validation: {0}")]
    Validation(String),
    #[error("payload could not be serialized: {0}")]
    Serialize(String),
}

/// Especificación de un payload tipado.
pub trait ArtifactSpec: Sized + Serialize + DeserializeOwned + Clone {
    /// Kind asociado.
    const KIND: ArtifactKind;

    /// Validación semántica ligera (sin efectos secundarios). Opcional.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Serializa a JSON validando antes.
    fn to_payload(&self) -> Result<Value, ArtifactDecodeError> {
        self.validate().map_err(ArtifactDecodeError::Validation)?;
        serde_json::to_value(self).map_err(|e| ArtifactDecodeError::Serialize(e.to_string()))
    }

    /// Decodifica un payload neutro y lo valida.
    fn from_payload(payload: &Value) -> Result<Self, ArtifactDecodeError> {
        let decoded = Self::deserialize(payload).map_err(|e| ArtifactDecodeError::Deserialize(e.to_string()))?;
        decoded.validate().map_err(ArtifactDecodeError::Validation)?;
        Ok(decoded)
    }

    /// Decodifica desde un artifact verificando el kind.
    fn from_artifact(a: &Artifact) -> Result<Self, ArtifactDecodeError> {
        if a.kind != Self::KIND {
            return Err(ArtifactDecodeError::KindMismatch { expected: Self::KIND, found: a.kind });
        }
        Self::from_payload(&a.payload)
    }
}
