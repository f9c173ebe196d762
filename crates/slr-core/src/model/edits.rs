//! Fusión de ediciones humanas sobre un payload en DRAFT.
//!
//! Merge "shallow": cada clave de `edits` reemplaza por completo la clave
//! homónima del payload actual. El payload actual se normaliza primero, así
//! que el conjunto de claves aceptadas es el del esquema del kind aunque el
//! draft guardado omitiera campos opcionales. El resultado se vuelve a validar
//! y normalizar antes de aceptarse.

use serde_json::{Map, Value};

use super::{ArtifactDecodeError, ArtifactKind};
use crate::errors::PipelineError;

/// Aplica `edits` sobre `current` y valida el resultado.
///
/// `edits` debe ser un objeto JSON (o `null`, equivalente a "sin cambios").
pub fn merge_edits(kind: ArtifactKind, current: &Value, edits: &Value) -> Result<Value, PipelineError> {
    let edits: &Map<String, Value> = match edits {
        Value::Null => return Ok(current.clone()),
        Value::Object(map) => map,
        _ => {
            return Err(PipelineError::InvalidEdit { kind,
                                                    field: "<root>".into(),
                                                    reason: "edits must be a JSON object".into() })
        }
    };
    let invalid = |e: ArtifactDecodeError| PipelineError::InvalidPayload { kind, reason: e.to_string() };
    let Value::Object(base) = kind.normalize_payload(current).map_err(invalid)? else {
        return Err(PipelineError::InvalidPayload { kind,
                                                   reason: "stored payload is not a JSON object".into() });
    };

    let mut out = base.clone();
    for (field, value) in edits {
        if !base.contains_key(field) {
            return Err(PipelineError::InvalidEdit { kind,
                                                    field: field.clone(),
                                                    reason: "unknown field".into() });
        }
        out.insert(field.clone(), value.clone());
    }
    kind.normalize_payload(&Value::Object(out)).map_err(invalid)
}
