//! `StageOrchestrator`: ejecuta stages registrados sobre el estado aprobado
//! de un proyecto.
//!
//! No persiste nada. Comprueba prerequisitos, arma el `StageContext`, invoca
//! el handler y valida lo que devuelve. Los fallos del handler se convierten
//! en `validation_errors`; nunca escapan como error y nunca tocan artifacts
//! aprobados.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::locks::ProjectGuard;
use crate::manager::ArtifactManager;
use crate::model::ArtifactKind;
use crate::stage::{RegisteredStage, StageContext, StageDefinition, StageOutput, StageRegistry, StageResult};
use crate::store::ArtifactStore;

pub struct StageOrchestrator<S: ArtifactStore> {
    manager: Arc<ArtifactManager<S>>,
    registry: Arc<StageRegistry>,
}

impl<S: ArtifactStore> Clone for StageOrchestrator<S> {
    fn clone(&self) -> Self {
        Self { manager: Arc::clone(&self.manager),
               registry: Arc::clone(&self.registry) }
    }
}

impl<S: ArtifactStore> StageOrchestrator<S> {
    pub fn new(manager: Arc<ArtifactManager<S>>, registry: Arc<StageRegistry>) -> Self {
        Self { manager, registry }
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    pub fn manager(&self) -> &ArtifactManager<S> {
        &self.manager
    }

    /// Definición registrada de `name`.
    pub fn stage_definition(&self, name: &str) -> Result<&StageDefinition, PipelineError> {
        self.registry.definition(name)
    }

    /// Id opaco para un proyecto nuevo: `project_` + 8 hex.
    pub fn new_project_id() -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("project_{}", &hex[..8])
    }

    /// Sintetiza un id y ejecuta el stage bootstrap con `raw_idea`.
    pub fn start_project(&self, raw_idea: &str) -> Result<StageResult, PipelineError> {
        let project_id = Self::new_project_id();
        let guard = self.manager.lock(&project_id);
        self.start_project_in(&guard, raw_idea)
    }

    pub fn start_project_in(&self, guard: &ProjectGuard<'_>, raw_idea: &str) -> Result<StageResult, PipelineError> {
        let name = self.registry
                       .bootstrap()
                       .ok_or_else(|| PipelineError::InvalidStageGraph("no bootstrap stage designated".into()))?;
        let project_id = guard.project_id();
        if raw_idea.trim().is_empty() {
            return Ok(StageResult::failed(name, project_id, vec!["raw_idea must not be empty".into()]));
        }
        info!("starting project '{}' with stage '{}'", project_id, name);
        let mut params = Map::new();
        params.insert("raw_idea".into(), json!(raw_idea));
        self.run_stage_in(guard, name, params)
    }

    pub fn run_stage(&self, name: &str, project_id: &str) -> Result<StageResult, PipelineError> {
        self.run_stage_with(name, project_id, Map::new())
    }

    /// Igual que `run_stage` con parámetros extra para el handler.
    pub fn run_stage_with(&self,
                          name: &str,
                          project_id: &str,
                          params: Map<String, Value>)
                          -> Result<StageResult, PipelineError> {
        let guard = self.manager.lock(project_id);
        self.run_stage_in(&guard, name, params)
    }

    /// Ejecuta `name` con el candado del proyecto ya tomado.
    ///
    /// Errores: `StageNotRegistered`, `PrerequisiteNotMet` (con todos los
    /// kinds que faltan) o fallos del store. Cualquier otro problema queda en
    /// `StageResult::validation_errors`.
    pub fn run_stage_in(&self,
                        guard: &ProjectGuard<'_>,
                        name: &str,
                        params: Map<String, Value>)
                        -> Result<StageResult, PipelineError> {
        let project_id = guard.project_id();
        let RegisteredStage { definition, handler } = self.registry.get(name)?;

        let (mut approved, missing) = self.manager.approved_payloads(project_id, &definition.required_artifact_kinds)?;
        if !missing.is_empty() {
            debug!("stage '{}' blocked for project '{}': missing {:?}", name, project_id, missing);
            return Err(PipelineError::PrerequisiteNotMet { stage: name.to_string(),
                                                           missing });
        }
        let (optional, _) = self.manager.approved_payloads(project_id, &definition.optional_artifact_kinds)?;
        approved.extend(optional);

        let ctx = StageContext { stage: name.to_string(),
                                 project_id: project_id.to_string(),
                                 approved,
                                 params };
        debug!("running stage '{}' for project '{}'", name, project_id);
        match handler.run(&ctx) {
            Ok(output) => Ok(check_output(definition, project_id, output)),
            Err(e) => {
                warn!("stage '{}' failed for project '{}': {}", name, project_id, e);
                Ok(StageResult::failed(name, project_id, vec![e.to_string()]))
            }
        }
    }
}

/// Convierte la salida del handler en `StageResult`, descartando los drafts
/// si hay cualquier error.
fn check_output(definition: &StageDefinition, project_id: &str, output: StageOutput) -> StageResult {
    let StageOutput { drafts,
                      mut validation_errors,
                      prompts,
                      extra_data } = output;
    let declared: BTreeSet<ArtifactKind> = definition.produces.iter().copied().collect();

    for (kind, payload) in &drafts {
        if !declared.contains(kind) {
            validation_errors.push(format!("stage '{}' produced undeclared artifact {}", definition.name, kind));
        } else if let Err(e) = kind.validate_payload(payload) {
            validation_errors.push(format!("invalid {kind} draft: {e}"));
        }
    }
    for kind in &definition.produces {
        if !drafts.contains_key(kind) {
            validation_errors.push(format!("stage '{}' did not produce {}", definition.name, kind));
        }
    }

    let draft_artifacts = if validation_errors.is_empty() { drafts } else { Default::default() };
    if !validation_errors.is_empty() {
        warn!("stage '{}' rejected for project '{}': {}",
              definition.name,
              project_id,
              validation_errors.join("; "));
    }
    StageResult { stage_name: definition.name.clone(),
                  project_id: project_id.to_string(),
                  draft_artifacts,
                  validation_errors,
                  prompts,
                  extra_data }
}
