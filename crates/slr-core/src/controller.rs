//! `PipelineController`: fachada que usan la CLI y los tests end-to-end.
//!
//! Delegación pura en `ArtifactManager`, `StageOrchestrator` y
//! `ProjectNavigator`. Lo único que añade es persistir los drafts de un
//! resultado exitoso sin soltar el candado del proyecto entre la ejecución y
//! el guardado.

use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use slr_query::{get_builder, QueryPlan};

use crate::errors::PipelineError;
use crate::locks::ProjectGuard;
use crate::manager::ArtifactManager;
use crate::model::{Artifact, ArtifactKind, SearchConceptBlocks};
use crate::navigator::{ProjectNavigator, ProjectStatus};
use crate::orchestrator::StageOrchestrator;
use crate::stage::{StageDefinition, StageRegistry, StageResult};
use crate::store::ArtifactStore;

/// Resultado de `start_project`: id sintetizado más el resultado del stage
/// bootstrap (con su draft ya guardado si tuvo éxito).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStart {
    pub project_id: String,
    pub result: StageResult,
}

pub struct PipelineController<S: ArtifactStore> {
    manager: Arc<ArtifactManager<S>>,
    orchestrator: StageOrchestrator<S>,
    navigator: ProjectNavigator<S>,
}

impl<S: ArtifactStore> PipelineController<S> {
    /// Valida el grafo de stages y cablea los componentes sobre `store`.
    pub fn new(store: S, registry: StageRegistry) -> Result<Self, PipelineError> {
        registry.validate()?;
        let manager = Arc::new(ArtifactManager::new(store));
        let registry = Arc::new(registry);
        Ok(Self { orchestrator: StageOrchestrator::new(Arc::clone(&manager), Arc::clone(&registry)),
                  navigator: ProjectNavigator::new(Arc::clone(&manager), registry),
                  manager })
    }

    pub fn manager(&self) -> &ArtifactManager<S> {
        &self.manager
    }

    pub fn orchestrator(&self) -> &StageOrchestrator<S> {
        &self.orchestrator
    }

    pub fn navigator(&self) -> &ProjectNavigator<S> {
        &self.navigator
    }

    pub fn start_project(&self, raw_idea: &str) -> Result<ProjectStart, PipelineError> {
        let project_id = StageOrchestrator::<S>::new_project_id();
        let guard = self.manager.lock(&project_id);
        let result = self.orchestrator.start_project_in(&guard, raw_idea)?;
        self.persist_drafts(&guard, &result)?;
        Ok(ProjectStart { project_id, result })
    }

    pub fn run_stage(&self, project_id: &str, stage: &str) -> Result<StageResult, PipelineError> {
        self.run_stage_with(project_id, stage, Map::new())
    }

    pub fn run_stage_with(&self,
                          project_id: &str,
                          stage: &str,
                          params: Map<String, Value>)
                          -> Result<StageResult, PipelineError> {
        self.navigator.validate_stage_transition(project_id, stage)?;
        let guard = self.manager.lock(project_id);
        let result = self.orchestrator.run_stage_in(&guard, stage, params)?;
        self.persist_drafts(&guard, &result)?;
        Ok(result)
    }

    pub fn approve_artifact(&self,
                            project_id: &str,
                            kind: ArtifactKind,
                            edits: Option<&Value>,
                            note: Option<&str>)
                            -> Result<Artifact, PipelineError> {
        self.manager.approve(project_id, kind, edits, note)
    }

    pub fn get_artifact(&self, project_id: &str, kind: ArtifactKind) -> Result<Artifact, PipelineError> {
        self.manager.get(project_id, kind)
    }

    pub fn get_project_status(&self, project_id: &str) -> Result<ProjectStatus, PipelineError> {
        self.navigator.project_status(project_id)
    }

    pub fn get_next_available_stages(&self, project_id: &str) -> Result<Vec<String>, PipelineError> {
        self.navigator.next_available_stages(project_id)
    }

    pub fn validate_stage_transition(&self, project_id: &str, stage: &str) -> Result<(), PipelineError> {
        self.navigator.validate_stage_transition(project_id, stage)
    }

    pub fn get_stage_definition(&self, stage: &str) -> Result<&StageDefinition, PipelineError> {
        self.orchestrator.stage_definition(stage)
    }

    pub fn stage_definitions(&self) -> Vec<StageDefinition> {
        self.orchestrator.registry().definitions().cloned().collect()
    }

    pub fn list_projects(&self) -> Result<Vec<String>, PipelineError> {
        self.manager.list_projects()
    }

    /// Renderiza `plan` con el dialecto `dialect`.
    pub fn build_query(&self, dialect: &str, plan: &QueryPlan) -> Result<String, PipelineError> {
        Ok(get_builder(dialect)?.build(plan)?)
    }

    /// Renderiza los `SearchConceptBlocks` aprobados del proyecto.
    pub fn build_project_query(&self, project_id: &str, dialect: &str) -> Result<String, PipelineError> {
        let builder = get_builder(dialect)?;
        let artifact = self.manager.get(project_id, ArtifactKind::SearchConceptBlocks)?;
        if !artifact.is_approved() {
            return Err(PipelineError::PrerequisiteNotMet { stage: format!("query:{}", builder.dialect_name()),
                                                           missing: vec![ArtifactKind::SearchConceptBlocks] });
        }
        let blocks: SearchConceptBlocks =
            artifact.decode().map_err(|e| PipelineError::InvalidPayload { kind: ArtifactKind::SearchConceptBlocks,
                                                                          reason: e.to_string() })?;
        Ok(builder.build(&blocks.to_query_plan())?)
    }

    fn persist_drafts(&self, guard: &ProjectGuard<'_>, result: &StageResult) -> Result<(), PipelineError> {
        if !result.validation_errors.is_empty() {
            return Ok(());
        }
        self.manager.save_all_in(guard, &result.draft_artifacts)?;
        info!("stage '{}' produced {} draft(s) for project '{}'",
              result.stage_name,
              result.draft_artifacts.len(),
              result.project_id);
        Ok(())
    }
}
