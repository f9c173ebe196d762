//! `ArtifactManager`: semántica de aprobación sobre un `ArtifactStore`.
//!
//! Es el único componente que llama a `ArtifactStore::save`. Cada mutación se
//! persiste de inmediato y se ejecuta bajo el candado del proyecto. Las
//! variantes `*_in` reciben un `ProjectGuard` ya tomado (p. ej. por el
//! controlador mientras ejecuta un stage y guarda sus drafts).

use std::collections::BTreeMap;

use log::{debug, info};
use serde_json::Value;

use crate::errors::PipelineError;
use crate::locks::{ProjectGuard, ProjectLocks};
use crate::model::{merge_edits, ApprovalStatus, Artifact, ArtifactKind};
use crate::store::ArtifactStore;

pub struct ArtifactManager<S: ArtifactStore> {
    store: S,
    locks: ProjectLocks,
}

impl<S: ArtifactStore> ArtifactManager<S> {
    pub fn new(store: S) -> Self {
        Self { store,
               locks: ProjectLocks::new() }
    }

    /// Toma el candado del proyecto.
    pub fn lock(&self, project_id: &str) -> ProjectGuard<'_> {
        self.locks.lock(project_id)
    }

    pub fn get(&self, project_id: &str, kind: ArtifactKind) -> Result<Artifact, PipelineError> {
        self.store
            .load(project_id, kind)?
            .ok_or_else(|| PipelineError::ArtifactNotFound { project_id: project_id.to_string(), kind })
    }

    pub fn find(&self, project_id: &str, kind: ArtifactKind) -> Result<Option<Artifact>, PipelineError> {
        Ok(self.store.load(project_id, kind)?)
    }

    /// Crea o sobreescribe el artifact como DRAFT.
    pub fn save(&self, project_id: &str, kind: ArtifactKind, payload: Value) -> Result<Artifact, PipelineError> {
        let guard = self.lock(project_id);
        self.save_in(&guard, kind, payload)
    }

    pub fn save_in(&self, guard: &ProjectGuard<'_>, kind: ArtifactKind, payload: Value) -> Result<Artifact, PipelineError> {
        let mut saved = self.save_all_in(guard, &BTreeMap::from([(kind, payload)]))?;
        saved.pop().ok_or_else(|| PipelineError::ArtifactNotFound { project_id: guard.project_id().to_string(), kind })
    }

    /// Guarda varios drafts de un mismo stage. Todos se validan y normalizan
    /// antes de escribir el primero: un payload inválido no deja nada escrito.
    /// Un fallo de I/O a mitad sí puede dejar escritos los anteriores (ver
    /// `PipelineError::Persistence`).
    pub fn save_all_in(&self,
                       guard: &ProjectGuard<'_>,
                       drafts: &BTreeMap<ArtifactKind, Value>)
                       -> Result<Vec<Artifact>, PipelineError> {
        debug_assert!(guard.belongs_to(&self.locks), "guard from a different lock table");
        let project_id = guard.project_id();
        let mut pending = Vec::with_capacity(drafts.len());
        for (&kind, payload) in drafts {
            let payload = kind.normalize_payload(payload)
                              .map_err(|e| PipelineError::InvalidPayload { kind, reason: e.to_string() })?;
            pending.push(match self.store.load(project_id, kind)? {
                             Some(existing) => existing.redraft(payload),
                             None => Artifact::draft(kind, payload),
                         });
        }
        for artifact in &pending {
            self.store.save(project_id, artifact)?;
            debug!("saved draft {} for project '{}' (hash {})", artifact.kind, project_id, artifact.hash);
        }
        Ok(pending)
    }

    /// Fusiona `edits` sobre el payload actual y marca APPROVED.
    pub fn approve(&self,
                   project_id: &str,
                   kind: ArtifactKind,
                   edits: Option<&Value>,
                   note: Option<&str>)
                   -> Result<Artifact, PipelineError> {
        let guard = self.lock(project_id);
        self.approve_in(&guard, kind, edits, note)
    }

    pub fn approve_in(&self,
                      guard: &ProjectGuard<'_>,
                      kind: ArtifactKind,
                      edits: Option<&Value>,
                      note: Option<&str>)
                      -> Result<Artifact, PipelineError> {
        debug_assert!(guard.belongs_to(&self.locks), "guard from a different lock table");
        let project_id = guard.project_id();
        let current = self.get(project_id, kind)?;
        let payload = match edits {
            Some(edits) => merge_edits(kind, &current.payload, edits)?,
            None => current.payload.clone(),
        };
        let approved = current.approved(payload, note.map(str::to_string));
        self.store.save(project_id, &approved)?;
        info!("approved {} for project '{}'", kind, project_id);
        Ok(approved)
    }

    pub fn list_projects(&self) -> Result<Vec<String>, PipelineError> {
        Ok(self.store.list_projects()?)
    }

    /// Estado de cada kind existente en el proyecto.
    pub fn statuses(&self, project_id: &str) -> Result<BTreeMap<ArtifactKind, ApprovalStatus>, PipelineError> {
        let mut out = BTreeMap::new();
        for kind in ArtifactKind::ALL {
            if let Some(a) = self.store.load(project_id, kind)? {
                out.insert(kind, a.status);
            }
        }
        Ok(out)
    }

    pub fn is_approved(&self, project_id: &str, kind: ArtifactKind) -> Result<bool, PipelineError> {
        Ok(self.store.load(project_id, kind)?.is_some_and(|a| a.is_approved()))
    }

    /// Payloads aprobados de `kinds`. Los que faltan (o siguen en DRAFT) se
    /// devuelven aparte, en el orden pedido.
    pub fn approved_payloads(&self,
                             project_id: &str,
                             kinds: &[ArtifactKind])
                             -> Result<(BTreeMap<ArtifactKind, Value>, Vec<ArtifactKind>), PipelineError> {
        let mut approved = BTreeMap::new();
        let mut missing = Vec::new();
        for &kind in kinds {
            match self.store.load(project_id, kind)? {
                Some(a) if a.is_approved() => {
                    approved.insert(kind, a.payload);
                }
                _ => missing.push(kind),
            }
        }
        Ok((approved, missing))
    }
}
