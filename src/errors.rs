use slr_core::PipelineError;
use thiserror::Error;

/// Errores de arranque y de cableado de la aplicación.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid configuration {var}: {reason}")]
    Config { var: String, reason: String },
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
