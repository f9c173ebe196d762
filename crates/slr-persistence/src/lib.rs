//! slr-persistence
//!
//! Implementación durable de `ArtifactStore` sobre el sistema de ficheros:
//! un JSON por (proyecto, kind) en `<data_dir>/<project_id>/<Kind>.json`.
//!
//! Módulos:
//! - `file_store`: store con escritura atómica (temporal + rename).
//! - `config`: carga de configuración desde .env / entorno.
//! - `error`: errores de I/O y su traducción a `StoreError`.

pub mod config;
pub mod error;
pub mod file_store;

pub use config::{init_dotenv, StoreConfig};
pub use error::PersistenceError;
pub use file_store::FileArtifactStore;
