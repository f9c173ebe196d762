//! Registro explícito de stages (nombre -> definición + handler).
//!
//! Se construye una vez y se inyecta en el orquestador. Registrar dos veces
//! el mismo nombre es un error; `replace` existe para el reemplazo
//! intencional. El orden de registro se conserva y es el que usan el
//! navegador y los informes de estado.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::PipelineError;
use crate::model::ArtifactKind;

use super::{StageDefinition, StageHandler};

#[derive(Clone)]
pub struct RegisteredStage {
    pub definition: StageDefinition,
    pub handler: Arc<dyn StageHandler>,
}

impl fmt::Debug for RegisteredStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredStage").field("definition", &self.definition).finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Clone)]
pub struct StageRegistry {
    stages: IndexMap<String, RegisteredStage>,
    bootstrap: Option<String>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> StageRegistryBuilder {
        StageRegistryBuilder::default()
    }

    pub fn register<H>(&mut self, definition: StageDefinition, handler: H) -> Result<(), PipelineError>
        where H: StageHandler + 'static
    {
        self.register_arc(definition, Arc::new(handler))
    }

    pub fn register_arc(&mut self, definition: StageDefinition, handler: Arc<dyn StageHandler>) -> Result<(), PipelineError> {
        if self.stages.contains_key(&definition.name) {
            return Err(PipelineError::StageAlreadyRegistered { name: definition.name });
        }
        self.check_producers(&definition)?;
        self.stages.insert(definition.name.clone(), RegisteredStage { definition, handler });
        Ok(())
    }

    /// Reemplaza un stage ya registrado conservando su posición. Devuelve la
    /// definición anterior.
    pub fn replace<H>(&mut self, definition: StageDefinition, handler: H) -> Result<StageDefinition, PipelineError>
        where H: StageHandler + 'static
    {
        if !self.stages.contains_key(&definition.name) {
            return Err(PipelineError::StageNotRegistered { name: definition.name });
        }
        self.check_producers(&definition)?;
        let previous = self.stages.insert(definition.name.clone(),
                                          RegisteredStage { definition,
                                                            handler: Arc::new(handler) });
        match previous {
            Some(prev) => Ok(prev.definition),
            None => Err(PipelineError::InvalidStageGraph("replaced stage vanished".into())),
        }
    }

    /// Designa el stage que arranca un proyecto (sin requisitos).
    pub fn set_bootstrap(&mut self, name: &str) -> Result<(), PipelineError> {
        let stage = self.get(name)?;
        if !stage.definition.is_bootstrap() {
            return Err(PipelineError::InvalidStageGraph(format!("bootstrap stage '{name}' must not require artifacts")));
        }
        self.bootstrap = Some(name.to_string());
        Ok(())
    }

    pub fn bootstrap(&self) -> Option<&str> {
        self.bootstrap.as_deref()
    }

    pub fn get(&self, name: &str) -> Result<&RegisteredStage, PipelineError> {
        self.stages.get(name).ok_or_else(|| PipelineError::StageNotRegistered { name: name.to_string() })
    }

    pub fn definition(&self, name: &str) -> Result<&StageDefinition, PipelineError> {
        self.get(name).map(|s| &s.definition)
    }

    /// Definiciones en orden de registro.
    pub fn definitions(&self) -> impl Iterator<Item = &StageDefinition> {
        self.stages.values().map(|s| &s.definition)
    }

    pub fn names(&self) -> Vec<&str> {
        self.stages.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn producer_of(&self, kind: ArtifactKind) -> Option<&StageDefinition> {
        self.definitions().find(|d| d.produces.contains(&kind))
    }

    /// Comprueba que el grafo es un DAG cerrado: hay stage bootstrap, todo kind
    /// requerido tiene productor y no hay ciclos.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.bootstrap.is_none() {
            return Err(PipelineError::InvalidStageGraph("no bootstrap stage designated".into()));
        }
        let mut producers: BTreeMap<ArtifactKind, usize> = BTreeMap::new();
        for (idx, def) in self.definitions().enumerate() {
            for kind in &def.produces {
                producers.insert(*kind, idx);
            }
        }

        let n = self.stages.len();
        let mut indegree = vec![0usize; n];
        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (idx, def) in self.definitions().enumerate() {
            for kind in &def.required_artifact_kinds {
                let Some(&from) = producers.get(kind) else {
                    return Err(PipelineError::InvalidStageGraph(format!("stage '{}' requires {} but no stage produces it",
                                                                        def.name, kind)));
                };
                edges[from].push(idx);
                indegree[idx] += 1;
            }
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|i| indegree[*i] == 0).collect();
        let mut visited = 0;
        while let Some(i) = queue.pop_front() {
            visited += 1;
            for &j in &edges[i] {
                indegree[j] -= 1;
                if indegree[j] == 0 {
                    queue.push_back(j);
                }
            }
        }
        if visited < n {
            let cyclic: Vec<&str> = self.names()
                                        .into_iter()
                                        .enumerate()
                                        .filter(|(i, _)| indegree[*i] > 0)
                                        .map(|(_, name)| name)
                                        .collect();
            return Err(PipelineError::InvalidStageGraph(format!("dependency cycle among: {}", cyclic.join(", "))));
        }
        Ok(())
    }

    fn check_producers(&self, definition: &StageDefinition) -> Result<(), PipelineError> {
        for kind in &definition.produces {
            if let Some(other) = self.producer_of(*kind) {
                if other.name != definition.name {
                    return Err(PipelineError::DuplicateProducer { kind: *kind,
                                                                  first: other.name.clone(),
                                                                  second: definition.name.clone() });
                }
            }
        }
        Ok(())
    }
}

/// Builder encadenable; los errores se acumulan y se devuelven en `build`.
#[derive(Default)]
pub struct StageRegistryBuilder {
    entries: Vec<(StageDefinition, Arc<dyn StageHandler>)>,
    bootstrap: Option<String>,
}

impl StageRegistryBuilder {
    /// Registra el stage de arranque.
    pub fn bootstrap<H>(mut self, definition: StageDefinition, handler: H) -> Self
        where H: StageHandler + 'static
    {
        self.bootstrap = Some(definition.name.clone());
        self.entries.push((definition, Arc::new(handler)));
        self
    }

    pub fn stage<H>(mut self, definition: StageDefinition, handler: H) -> Self
        where H: StageHandler + 'static
    {
        self.entries.push((definition, Arc::new(handler)));
        self
    }

    /// Registra todo y valida el grafo resultante.
    pub fn build(self) -> Result<StageRegistry, PipelineError> {
        let mut registry = StageRegistry::new();
        for (definition, handler) in self.entries {
            registry.register_arc(definition, handler)?;
        }
        if let Some(name) = self.bootstrap {
            registry.set_bootstrap(&name)?;
        }
        registry.validate()?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GenerationError;
    use crate::stage::{StageContext, StageOutput};

    fn noop(_: &StageContext) -> Result<StageOutput, GenerationError> {
        Ok(StageOutput::new())
    }

    fn def(name: &str, requires: &[ArtifactKind], produces: &[ArtifactKind]) -> StageDefinition {
        StageDefinition::new(name).requires(requires).produces(produces)
    }

    #[test]
    fn duplicate_name_is_an_error_and_replace_is_explicit() {
        let mut r = StageRegistry::new();
        r.register(def("a", &[], &[ArtifactKind::ProjectContext]), noop).expect("first");
        let err = r.register(def("a", &[], &[ArtifactKind::ProjectContext]), noop).expect_err("dup");
        assert!(matches!(err, PipelineError::StageAlreadyRegistered { ref name } if name == "a"));
        let prev = r.replace(def("a", &[], &[ArtifactKind::ProjectContext, ArtifactKind::ProblemFraming]), noop)
                    .expect("replace");
        assert_eq!(prev.produces, vec![ArtifactKind::ProjectContext]);
        assert_eq!(r.definition("a").expect("def").produces.len(), 2);
        assert!(r.replace(def("zzz", &[], &[]), noop).is_err());
    }

    #[test]
    fn a_kind_has_a_single_producer() {
        let mut r = StageRegistry::new();
        r.register(def("a", &[], &[ArtifactKind::ProjectContext]), noop).expect("a");
        let err = r.register(def("b", &[], &[ArtifactKind::ProjectContext]), noop).expect_err("dup producer");
        assert!(matches!(err, PipelineError::DuplicateProducer { kind: ArtifactKind::ProjectContext, .. }));
    }

    #[test]
    fn validate_detects_missing_producers_and_cycles() {
        let missing = StageRegistry::builder().bootstrap(def("a", &[], &[ArtifactKind::ProjectContext]), noop)
                                              .stage(def("b", &[ArtifactKind::ConceptModel], &[ArtifactKind::ProblemFraming]), noop)
                                              .build();
        assert!(matches!(missing, Err(PipelineError::InvalidStageGraph(_))));

        let cyclic = StageRegistry::builder().bootstrap(def("a", &[], &[ArtifactKind::ProjectContext]), noop)
                                             .stage(def("b", &[ArtifactKind::ConceptModel], &[ArtifactKind::ProblemFraming]), noop)
                                             .stage(def("c", &[ArtifactKind::ProblemFraming], &[ArtifactKind::ConceptModel]), noop)
                                             .build();
        match cyclic {
            Err(PipelineError::InvalidStageGraph(msg)) => assert!(msg.contains("b") && msg.contains("c")),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn diamond_graph_is_valid_and_keeps_order() {
        let r = StageRegistry::builder().bootstrap(def("root", &[], &[ArtifactKind::ProjectContext]), noop)
                                        .stage(def("left", &[ArtifactKind::ProjectContext], &[ArtifactKind::ProblemFraming]), noop)
                                        .stage(def("right", &[ArtifactKind::ProjectContext], &[ArtifactKind::ConceptModel]), noop)
                                        .stage(def("join",
                                                   &[ArtifactKind::ProblemFraming, ArtifactKind::ConceptModel],
                                                   &[ArtifactKind::ResearchQuestionSet]),
                                               noop)
                                        .build()
                                        .expect("valid dag");
        assert_eq!(r.names(), vec!["root", "left", "right", "join"]);
        assert_eq!(r.bootstrap(), Some("root"));
        assert_eq!(r.producer_of(ArtifactKind::ConceptModel).map(|d| d.name.as_str()), Some("right"));
    }
}
