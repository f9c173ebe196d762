//! Contrato de persistencia de artifacts.
//!
//! El store no sabe nada del pipeline: guarda y lee registros completos por
//! (proyecto, kind). Sólo `ArtifactManager` llama a `save`. Cada `save` es una
//! transacción completa: un lector nunca observa un registro a medio
//! escribir.

use std::collections::BTreeSet;

use dashmap::DashMap;

use crate::errors::StoreError;
use crate::model::{Artifact, ArtifactKind};

pub trait ArtifactStore: Send + Sync {
    /// Registro actual o `None` si el kind nunca se produjo.
    fn load(&self, project_id: &str, kind: ArtifactKind) -> Result<Option<Artifact>, StoreError>;
    /// Crea o sobreescribe el registro de `artifact.kind`.
    fn save(&self, project_id: &str, artifact: &Artifact) -> Result<(), StoreError>;
    /// Ids de proyecto con al menos un artifact, ordenados.
    fn list_projects(&self) -> Result<Vec<String>, StoreError>;
    fn exists(&self, project_id: &str, kind: ArtifactKind) -> Result<bool, StoreError> {
        Ok(self.load(project_id, kind)?.is_some())
    }
}

/// Store en memoria (tests, demos). Cada entrada se reemplaza entera, así que
/// la escritura es atómica para los lectores.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    inner: DashMap<(String, ArtifactKind), Artifact>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn load(&self, project_id: &str, kind: ArtifactKind) -> Result<Option<Artifact>, StoreError> {
        Ok(self.inner.get(&(project_id.to_string(), kind)).map(|e| e.value().clone()))
    }

    fn save(&self, project_id: &str, artifact: &Artifact) -> Result<(), StoreError> {
        if project_id.trim().is_empty() {
            return Err(StoreError::InvalidProjectId { project_id: project_id.to_string() });
        }
        self.inner.insert((project_id.to_string(), artifact.kind), artifact.clone());
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<String>, StoreError> {
        let ids: BTreeSet<String> = self.inner.iter().map(|e| e.key().0.clone()).collect();
        Ok(ids.into_iter().collect())
    }

    fn exists(&self, project_id: &str, kind: ArtifactKind) -> Result<bool, StoreError> {
        Ok(self.inner.contains_key(&(project_id.to_string(), kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn save_overwrites_single_record_per_kind() {
        let store = InMemoryArtifactStore::new();
        store.save("p1", &Artifact::draft(ArtifactKind::ProjectContext, json!({"v": 1}))).expect("save");
        store.save("p1", &Artifact::draft(ArtifactKind::ProjectContext, json!({"v": 2}))).expect("save");
        store.save("p0", &Artifact::draft(ArtifactKind::ProjectContext, json!({"v": 3}))).expect("save");
        assert_eq!(store.len(), 2);
        let got = store.load("p1", ArtifactKind::ProjectContext).expect("load").expect("present");
        assert_eq!(got.payload, json!({"v": 2}));
        assert_eq!(store.list_projects().expect("list"), vec!["p0".to_string(), "p1".to_string()]);
        assert!(!store.exists("p1", ArtifactKind::ConceptModel).expect("exists"));
    }
}
