//! Entrada y salida de un handler de stage.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::GenerationError;
use crate::model::{ArtifactKind, ArtifactSpec};

/// Contexto inmutable que recibe un handler: payloads aprobados de los kinds
/// requeridos (y de los opcionales que estén aprobados) más parámetros libres
/// del llamador.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub stage: String,
    pub project_id: String,
    pub approved: BTreeMap<ArtifactKind, Value>,
    pub params: Map<String, Value>,
}

impl StageContext {
    pub fn new(stage: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self { stage: stage.into(),
               project_id: project_id.into(),
               approved: BTreeMap::new(),
               params: Map::new() }
    }

    /// Payload aprobado decodificado; error si falta.
    pub fn require<T: ArtifactSpec>(&self) -> Result<T, GenerationError> {
        self.optional::<T>()?.ok_or_else(|| GenerationError::BadContext { stage: self.stage.clone(),
                                                                          kind: T::KIND,
                                                                          reason: "not present in approved context".into() })
    }

    /// Payload aprobado decodificado si existe.
    pub fn optional<T: ArtifactSpec>(&self) -> Result<Option<T>, GenerationError> {
        match self.approved.get(&T::KIND) {
            None => Ok(None),
            Some(v) => T::from_payload(v).map(Some).map_err(|e| GenerationError::BadContext { stage: self.stage.clone(),
                                                                                                kind: T::KIND,
                                                                                                reason: e.to_string() }),
        }
    }

    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    pub fn param_bool(&self, name: &str) -> Option<bool> {
        self.params.get(name).and_then(Value::as_bool)
    }

    /// Lista de strings; acepta también un único string separado por comas.
    /// `Err` con un mensaje para el usuario si el parámetro tiene otra forma
    /// o algún elemento no es un string.
    pub fn param_list(&self, name: &str) -> Result<Option<Vec<String>>, String> {
        let malformed = || format!("parameter '{name}' must be a string or a list of strings");
        match self.params.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items.iter()
                                              .map(|v| v.as_str().map(str::to_string).ok_or_else(malformed))
                                              .collect::<Result<Vec<_>, _>>()
                                              .map(Some),
            Some(Value::String(s)) => {
                Ok(Some(s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()))
            }
            Some(_) => Err(malformed()),
        }
    }
}

/// Lo que devuelve un handler exitoso. El orquestador lo valida y lo envuelve
/// en un `StageResult`.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub drafts: BTreeMap<ArtifactKind, Value>,
    /// Problemas del contenido que impiden producir drafts (p. ej. bloques sin
    /// términos). Si no está vacío, los drafts se descartan.
    pub validation_errors: Vec<String>,
    pub prompts: Vec<String>,
    pub extra_data: Map<String, Value>,
}

impl StageOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Añade un draft tipado.
    pub fn with_draft<T: ArtifactSpec>(mut self, stage: &str, payload: &T) -> Result<Self, GenerationError> {
        let value = payload.to_payload().map_err(|e| GenerationError::InvalidOutput { stage: stage.to_string(),
                                                                                       reason: format!("{}: {e}", T::KIND) })?;
        self.drafts.insert(T::KIND, value);
        Ok(self)
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompts.push(prompt.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra_data.insert(key.into(), value);
        self
    }

    pub fn rejected(errors: Vec<String>) -> Self {
        Self { validation_errors: errors, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_params_accept_arrays_and_comma_strings() {
        let mut ctx = StageContext::new("s", "p");
        assert_eq!(ctx.param_list("dbs"), Ok(None));
        ctx.params.insert("dbs".into(), json!("pubmed, scopus,"));
        assert_eq!(ctx.param_list("dbs"), Ok(Some(vec!["pubmed".to_string(), "scopus".to_string()])));
        ctx.params.insert("dbs".into(), json!(["arxiv"]));
        assert_eq!(ctx.param_list("dbs"), Ok(Some(vec!["arxiv".to_string()])));
    }

    #[test]
    fn malformed_list_params_are_errors() {
        let mut ctx = StageContext::new("s", "p");
        ctx.params.insert("dbs".into(), json!([1, "x"]));
        assert!(ctx.param_list("dbs").expect_err("non-string entry").contains("'dbs'"));
        ctx.params.insert("dbs".into(), json!({"a": 1}));
        assert!(ctx.param_list("dbs").is_err());
    }
}
