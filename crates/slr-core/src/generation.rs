//! Colaborador opaco de generación de contenido.
//!
//! Puede ser un modelo remoto o una heurística local. Es responsable de sus
//! propios timeouts y reintentos; cualquier fallo debe llegar como
//! `GenerationError`, nunca como pánico. No se asume idempotencia.

use serde_json::Value;

use crate::errors::GenerationError;
use crate::stage::StageContext;

pub trait ContentGenerator: Send + Sync {
    /// Identificador del generador (queda en los `extra_data` del resultado).
    fn name(&self) -> &str;

    /// Genera el contenido de `ctx.stage` a partir del contexto aprobado.
    fn generate(&self, ctx: &StageContext) -> Result<Value, GenerationError>;
}
