//! `FileArtifactStore`: un fichero JSON por artifact.
//!
//! Cada escritura va a un temporal oculto en el mismo directorio, se
//! sincroniza y se renombra sobre el destino. El rename es atómico dentro de
//! un mismo sistema de ficheros, así que un lector ve el registro anterior o
//! el nuevo, nunca uno truncado.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;
use slr_core::{Artifact, ArtifactKind, ArtifactStore, StoreError};
use tempfile::Builder;

use crate::config::StoreConfig;
use crate::error::PersistenceError;

const RECORD_EXT: &str = "json";

#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    base: PathBuf,
}

impl FileArtifactStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn from_config(cfg: &StoreConfig) -> Self {
        Self::new(cfg.data_dir.clone())
    }

    /// Store en `SLRFLOW_DATA_DIR` (o `./data`).
    pub fn from_env() -> Self {
        Self::from_config(&StoreConfig::from_env())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Ruta del registro de `kind` para el proyecto.
    pub fn artifact_path(&self, project_id: &str, kind: ArtifactKind) -> Result<PathBuf, PersistenceError> {
        Ok(self.project_dir(project_id)?.join(format!("{}.{RECORD_EXT}", kind.as_str())))
    }

    fn project_dir(&self, project_id: &str) -> Result<PathBuf, PersistenceError> {
        validate_project_id(project_id)?;
        Ok(self.base.join(project_id))
    }

    fn read(&self, project_id: &str, kind: ArtifactKind) -> Result<Option<Artifact>, PersistenceError> {
        let path = self.artifact_path(project_id, kind)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(&path, e)),
        };
        let artifact: Artifact =
            serde_json::from_str(&raw).map_err(|e| PersistenceError::Corrupted { path: path.display().to_string(),
                                                                                   reason: e.to_string() })?;
        if artifact.kind != kind {
            return Err(PersistenceError::Corrupted { path: path.display().to_string(),
                                                     reason: format!("expected kind {kind}, found {}", artifact.kind) });
        }
        Ok(Some(artifact))
    }

    fn write(&self, project_id: &str, artifact: &Artifact) -> Result<(), PersistenceError> {
        let dir = self.project_dir(project_id)?;
        let path = self.artifact_path(project_id, artifact.kind)?;
        fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;

        let mut tmp = Builder::new().prefix(".")
                                    .suffix(".tmp")
                                    .tempfile_in(&dir)
                                    .map_err(|e| PersistenceError::io(&dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, artifact).map_err(|e| PersistenceError::Serialize { kind: artifact.kind,
                                                                                                    source: e })?;
        tmp.write_all(b"\n").map_err(|e| PersistenceError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| PersistenceError::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| PersistenceError::io(&path, e.error))?;
        debug!("wrote {} ({:?})", path.display(), artifact.status);
        Ok(())
    }

    fn projects(&self) -> Result<Vec<String>, PersistenceError> {
        let entries = match fs::read_dir(&self.base) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&self.base, e)),
        };
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PersistenceError::io(&self.base, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if validate_project_id(&name).is_ok() && has_records(&path)? {
                out.push(name);
            }
        }
        out.sort();
        Ok(out)
    }
}

fn has_records(dir: &Path) -> Result<bool, PersistenceError> {
    for entry in fs::read_dir(dir).map_err(|e| PersistenceError::io(dir, e))? {
        let path = entry.map_err(|e| PersistenceError::io(dir, e))?.path();
        let visible = path.file_name()
                          .and_then(|n| n.to_str())
                          .is_some_and(|n| !n.starts_with('.'));
        if visible && path.extension().is_some_and(|ext| ext == RECORD_EXT) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Un id de proyecto es un único componente de ruta.
fn validate_project_id(project_id: &str) -> Result<(), PersistenceError> {
    let invalid = project_id.trim().is_empty()
                  || project_id.contains(['/', '\\', '\0'])
                  || project_id.contains("..")
                  || project_id.starts_with('.');
    if invalid {
        return Err(PersistenceError::InvalidProjectId(project_id.to_string()));
    }
    Ok(())
}

impl ArtifactStore for FileArtifactStore {
    fn load(&self, project_id: &str, kind: ArtifactKind) -> Result<Option<Artifact>, StoreError> {
        Ok(self.read(project_id, kind)?)
    }

    fn save(&self, project_id: &str, artifact: &Artifact) -> Result<(), StoreError> {
        Ok(self.write(project_id, artifact)?)
    }

    fn list_projects(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.projects()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_ids_must_be_single_path_components() {
        for bad in ["", "  ", "a/b", "a\\b", "..", "x..y", ".hidden"] {
            assert!(validate_project_id(bad).is_err(), "{bad:?} should be rejected");
        }
        for good in ["project_1a2b3c4d", "my-review", "Review 2024"] {
            assert!(validate_project_id(good).is_ok(), "{good:?} should be accepted");
        }
    }

    #[test]
    fn record_path_uses_canonical_kind_name() {
        let store = FileArtifactStore::new("/data");
        let p = store.artifact_path("project_x", ArtifactKind::SearchConceptBlocks).expect("path");
        assert_eq!(p, PathBuf::from("/data/project_x/SearchConceptBlocks.json"));
    }
}
