//! slr-core: pipeline HITL de artifacts por stages.
//!
//! Cada stage produce drafts que una persona aprueba (o edita y aprueba)
//! antes de que los stages dependientes puedan ejecutarse. Este crate no sabe
//! nada de disco ni de generación de contenido: recibe un `ArtifactStore` y
//! un `StageRegistry` con los handlers ya construidos.
pub mod controller;
pub mod errors;
pub mod generation;
pub mod hashing;
pub mod locks;
pub mod manager;
pub mod model;
pub mod navigator;
pub mod orchestrator;
pub mod stage;
pub mod store;

pub use controller::{PipelineController, ProjectStart};
pub use errors::{GenerationError, PipelineError, StoreError};
pub use generation::ContentGenerator;
pub use locks::{ProjectGuard, ProjectLocks};
pub use manager::ArtifactManager;
pub use model::{ApprovalStatus, Artifact, ArtifactKind, ArtifactSpec};
pub use navigator::{ProjectNavigator, ProjectStatus, StageState};
pub use orchestrator::StageOrchestrator;
pub use stage::{StageContext, StageDefinition, StageHandler, StageOutput, StageRegistry, StageResult};
pub use store::{ArtifactStore, InMemoryArtifactStore};
