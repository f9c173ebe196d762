//! Configuración de la aplicación desde variables de entorno (.env opcional).
//!
//! - `SLRFLOW_DATA_DIR`: raíz del store en disco (por defecto `./data`).
//! - `SLRFLOW_DEFAULT_DATABASES`: dialectos que renderiza database-query-plan
//!   cuando el llamador no pide ninguno.
//!
//! Un valor inválido es un error de configuración al arrancar, nunca un panic.

use std::env;
use std::path::PathBuf;

use slr_persistence::{init_dotenv, StoreConfig};
use slr_query::get_builder;

use crate::errors::AppError;

pub const DEFAULT_DATABASES_VAR: &str = "SLRFLOW_DEFAULT_DATABASES";
pub const DEFAULT_DATABASES: &str = "openalex,arxiv,pubmed,scopus";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub default_databases: Vec<String>,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>, default_databases: Vec<String>) -> Self {
        Self { store: StoreConfig::new(data_dir),
               default_databases }
    }

    pub fn from_env() -> Result<Self, AppError> {
        init_dotenv();
        let raw = env::var(DEFAULT_DATABASES_VAR).ok()
                                                 .filter(|v| !v.trim().is_empty())
                                                 .unwrap_or_else(|| DEFAULT_DATABASES.to_string());
        Ok(Self { store: StoreConfig::from_env(),
                  default_databases: parse_databases(&raw)? })
    }
}

/// Lista separada por comas de dialectos registrados, normalizada a
/// minúsculas y sin repetir.
pub fn parse_databases(raw: &str) -> Result<Vec<String>, AppError> {
    let mut out: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let builder = get_builder(name).map_err(|e| AppError::Config { var: DEFAULT_DATABASES_VAR.into(),
                                                                       reason: e.to_string() })?;
        let canonical = builder.dialect_name().to_string();
        if !out.contains(&canonical) {
            out.push(canonical);
        }
    }
    if out.is_empty() {
        return Err(AppError::Config { var: DEFAULT_DATABASES_VAR.into(),
                                      reason: "no database names given".into() });
    }
    Ok(out)
}
