//! Stages: definición declarativa, handler, contexto/resultado y registro.

pub mod context;
pub mod definition;
pub mod handler;
pub mod registry;
pub mod result;

pub use context::{StageContext, StageOutput};
pub use definition::StageDefinition;
pub use handler::StageHandler;
pub use registry::{RegisteredStage, StageRegistry, StageRegistryBuilder};
pub use result::StageResult;
