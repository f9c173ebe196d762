use crate::errors::GenerationError;

use super::{StageContext, StageOutput};

/// Lógica de un stage. Debe ser libre de efectos sobre el estado persistido:
/// sólo devuelve drafts.
pub trait StageHandler: Send + Sync {
    fn run(&self, ctx: &StageContext) -> Result<StageOutput, GenerationError>;
}

impl<F> StageHandler for F where F: Fn(&StageContext) -> Result<StageOutput, GenerationError> + Send + Sync
{
    fn run(&self, ctx: &StageContext) -> Result<StageOutput, GenerationError> {
        self(ctx)
    }
}
