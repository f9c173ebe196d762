//! slrflow: estrategia de búsqueda para revisiones sistemáticas con
//! aprobación humana en cada stage.
//!
//! Este crate sólo cablea los miembros del workspace:
//! - `slr_query`: síntesis de consultas booleanas multi-dialecto.
//! - `slr_core`: artifacts, stages, navegación y controlador.
//! - `slr_persistence`: store JSON en disco.
//! - `slr_adapters`: stages incluidos y generador heurístico.

pub mod config;
pub mod errors;

use std::sync::Arc;

use log::info;
use slr_adapters::{default_registry, HeuristicGenerator};
use slr_core::PipelineController;
use slr_persistence::FileArtifactStore;

pub use config::AppConfig;
pub use errors::AppError;
pub use slr_adapters;
pub use slr_core;
pub use slr_persistence;
pub use slr_query;

pub type FileController = PipelineController<FileArtifactStore>;

/// Controlador con store en disco, los siete stages incluidos y el
/// generador heurístico.
pub fn build_controller(config: &AppConfig) -> Result<FileController, AppError> {
    let store = FileArtifactStore::from_config(&config.store);
    let registry = default_registry(Arc::new(HeuristicGenerator::new()), config.default_databases.clone())?;
    info!("pipeline ready: {} stages, data dir {}",
          registry.len(),
          store.base_dir().display());
    Ok(PipelineController::new(store, registry)?)
}
