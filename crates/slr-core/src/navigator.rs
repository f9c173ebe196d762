//! `ProjectNavigator`: vista de sólo lectura del avance de un proyecto.
//!
//! El estado de cada stage no se guarda; se deriva de los estados de los
//! artifacts en cada consulta.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::manager::ArtifactManager;
use crate::model::{ApprovalStatus, ArtifactKind};
use crate::stage::{StageDefinition, StageRegistry};
use crate::store::ArtifactStore;

/// LOCKED -> AVAILABLE -> DRAFT_PRODUCED -> APPROVED. Re-ejecutar un stage
/// aprobado lo devuelve a DRAFT_PRODUCED y deja LOCKED a los que dependen de
/// él, aunque sus propios artifacts sigan aprobados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageState {
    Locked,
    Available,
    DraftProduced,
    Approved,
}

impl StageState {
    /// Ejecutable ahora y todavía no completado.
    pub fn is_next(&self) -> bool {
        matches!(self, StageState::Available | StageState::DraftProduced)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub project_id: String,
    pub completed: usize,
    pub total: usize,
    /// Porcentaje redondeado a un decimal.
    pub percent: f64,
    pub stage_states: IndexMap<String, StageState>,
    pub next_stages: Vec<String>,
    pub is_complete: bool,
}

pub struct ProjectNavigator<S: ArtifactStore> {
    manager: Arc<ArtifactManager<S>>,
    registry: Arc<StageRegistry>,
}

impl<S: ArtifactStore> Clone for ProjectNavigator<S> {
    fn clone(&self) -> Self {
        Self { manager: Arc::clone(&self.manager),
               registry: Arc::clone(&self.registry) }
    }
}

impl<S: ArtifactStore> ProjectNavigator<S> {
    pub fn new(manager: Arc<ArtifactManager<S>>, registry: Arc<StageRegistry>) -> Self {
        Self { manager, registry }
    }

    /// Stages con todos sus requisitos aprobados cuyos productos aún no lo
    /// están, en orden de registro.
    pub fn next_available_stages(&self, project_id: &str) -> Result<Vec<String>, PipelineError> {
        Ok(self.stage_states(project_id)?
               .into_iter()
               .filter(|(_, state)| state.is_next())
               .map(|(name, _)| name)
               .collect())
    }

    pub fn project_status(&self, project_id: &str) -> Result<ProjectStatus, PipelineError> {
        let stage_states = self.stage_states(project_id)?;
        let total = stage_states.len();
        let completed = stage_states.values().filter(|s| **s == StageState::Approved).count();
        let percent = if total == 0 {
            0.0
        } else {
            (completed as f64 * 1000.0 / total as f64).round() / 10.0
        };
        let next_stages = stage_states.iter()
                                      .filter(|(_, s)| s.is_next())
                                      .map(|(name, _)| name.clone())
                                      .collect();
        Ok(ProjectStatus { project_id: project_id.to_string(),
                           completed,
                           total,
                           percent,
                           next_stages,
                           is_complete: total > 0 && completed == total,
                           stage_states })
    }

    /// Estado de cada stage registrado. `ProjectNotFound` si el proyecto no
    /// tiene ningún artifact.
    pub fn stage_states(&self, project_id: &str) -> Result<IndexMap<String, StageState>, PipelineError> {
        let statuses = self.manager.statuses(project_id)?;
        if statuses.is_empty() {
            return Err(PipelineError::ProjectNotFound { project_id: project_id.to_string() });
        }
        Ok(self.registry
               .definitions()
               .map(|def| (def.name.clone(), derive_state(def, &statuses)))
               .collect())
    }

    /// Comprobación pura previa a `run_stage`: `Ok` si todos los kinds
    /// requeridos están aprobados.
    pub fn validate_stage_transition(&self, project_id: &str, name: &str) -> Result<(), PipelineError> {
        let def = self.registry.definition(name)?;
        let statuses = self.manager.statuses(project_id)?;
        let missing: Vec<ArtifactKind> = def.required_artifact_kinds
                                            .iter()
                                            .copied()
                                            .filter(|k| statuses.get(k) != Some(&ApprovalStatus::Approved))
                                            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::PrerequisiteNotMet { stage: name.to_string(),
                                                    missing })
        }
    }
}

fn derive_state(def: &StageDefinition, statuses: &BTreeMap<ArtifactKind, ApprovalStatus>) -> StageState {
    let approved = |k: &ArtifactKind| statuses.get(k) == Some(&ApprovalStatus::Approved);
    if !def.required_artifact_kinds.iter().all(approved) {
        StageState::Locked
    } else if !def.produces.is_empty() && def.produces.iter().all(approved) {
        StageState::Approved
    } else if def.produces.iter().any(|k| statuses.contains_key(k)) {
        StageState::DraftProduced
    } else {
        StageState::Available
    }
}
