//! Esquemas de payload por kind.
//!
//! Todos los structs rechazan campos desconocidos y serializan todos sus
//! campos (los `Option` vacíos como `null`), de modo que el conjunto de
//! claves de un payload guardado coincide con el de su esquema.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use slr_query::{ComplexityReport, ConceptBlock, FieldTag, QueryPlan, SearchTerm};

use super::{ArtifactKind, ArtifactSpec};

fn non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

fn unique_ids<'a>(what: &str, ids: impl Iterator<Item = &'a str>) -> Result<BTreeSet<&'a str>, String> {
    let mut seen = BTreeSet::new();
    for id in ids {
        non_empty(&format!("{what} id"), id)?;
        if !seen.insert(id) {
            return Err(format!("duplicate {what} id '{id}'"));
        }
    }
    Ok(seen)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectContext {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub discipline: Option<String>,
    pub subfield: Option<String>,
    pub application_area: Option<String>,
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,
    pub initial_keywords: Vec<String>,
}

impl ArtifactSpec for ProjectContext {
    const KIND: ArtifactKind = ArtifactKind::ProjectContext;

    fn validate(&self) -> Result<(), String> {
        non_empty("id", &self.id)?;
        non_empty("title", &self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemFraming {
    pub project_id: String,
    pub problem_statement: String,
    pub goals: Vec<String>,
    pub scope_in: Vec<String>,
    pub scope_out: Vec<String>,
    pub stakeholders: Vec<String>,
}

impl ArtifactSpec for ProblemFraming {
    const KIND: ArtifactKind = ArtifactKind::ProblemFraming;

    fn validate(&self) -> Result<(), String> {
        non_empty("problem_statement", &self.problem_statement)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Concept {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    /// population, intervention, outcome, context, method, domain_concept...
    pub concept_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConceptRelation {
    pub source_id: String,
    pub target_id: String,
    pub relation_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConceptModel {
    pub project_id: String,
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub relations: Vec<ConceptRelation>,
}

impl ArtifactSpec for ConceptModel {
    const KIND: ArtifactKind = ArtifactKind::ConceptModel;

    fn validate(&self) -> Result<(), String> {
        let ids = unique_ids("concept", self.concepts.iter().map(|c| c.id.as_str()))?;
        for c in &self.concepts {
            non_empty("concept label", &c.label)?;
        }
        for r in &self.relations {
            for end in [&r.source_id, &r.target_id] {
                if !ids.contains(end.as_str()) {
                    return Err(format!("relation references unknown concept '{end}'"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPriority {
    MustHave,
    NiceToHave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchQuestion {
    pub id: String,
    pub text: String,
    pub question_type: String,
    pub linked_concept_ids: Vec<String>,
    pub priority: QuestionPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchQuestionSet {
    pub project_id: String,
    pub questions: Vec<ResearchQuestion>,
}

impl ResearchQuestionSet {
    pub fn primary(&self) -> impl Iterator<Item = &ResearchQuestion> {
        self.questions.iter().filter(|q| q.priority == QuestionPriority::MustHave)
    }
}

impl ArtifactSpec for ResearchQuestionSet {
    const KIND: ArtifactKind = ArtifactKind::ResearchQuestionSet;

    fn validate(&self) -> Result<(), String> {
        unique_ids("question", self.questions.iter().map(|q| q.id.as_str()))?;
        self.questions.iter().try_for_each(|q| non_empty("question text", &q.text))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConceptBlock {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub terms_included: Vec<String>,
    #[serde(default)]
    pub terms_excluded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConceptBlocks {
    pub project_id: String,
    pub blocks: Vec<SearchConceptBlock>,
}

impl SearchConceptBlocks {
    /// Convierte los bloques aprobados al modelo del motor de consultas. Todos
    /// los términos se etiquetan como `keyword`.
    pub fn to_query_plan(&self) -> QueryPlan {
        let blocks = self.blocks
                         .iter()
                         .map(|b| {
                             let mut block = ConceptBlock::new(b.label.clone());
                             block.terms = b.terms_included.iter().map(|t| SearchTerm::new(t.as_str())).collect();
                             for ex in &b.terms_excluded {
                                 block.add_excluded_term(ex.as_str(), FieldTag::Keyword);
                             }
                             block
                         })
                         .collect();
        QueryPlan { blocks }
    }

    /// Etiquetas de bloques sin términos incluidos.
    pub fn empty_blocks(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter(|b| b.terms_included.iter().all(|t| t.trim().is_empty()))
            .map(|b| b.label.as_str())
            .collect()
    }
}

impl ArtifactSpec for SearchConceptBlocks {
    const KIND: ArtifactKind = ArtifactKind::SearchConceptBlocks;

    fn validate(&self) -> Result<(), String> {
        unique_ids("block", self.blocks.iter().map(|b| b.id.as_str()))?;
        self.blocks.iter().try_for_each(|b| non_empty("block label", &b.label))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseQuery {
    pub id: String,
    pub database_name: String,
    pub query_blocks: Vec<String>,
    pub boolean_query_string: String,
    pub notes: Option<String>,
    pub complexity: Option<ComplexityReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseQueryPlan {
    pub project_id: String,
    pub queries: Vec<DatabaseQuery>,
}

impl ArtifactSpec for DatabaseQueryPlan {
    const KIND: ArtifactKind = ArtifactKind::DatabaseQueryPlan;

    fn validate(&self) -> Result<(), String> {
        for q in &self.queries {
            non_empty("database_name", &q.database_name)?;
            non_empty("boolean_query_string", &q.boolean_query_string)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreeningCriteria {
    pub project_id: String,
    pub inclusion_criteria: Vec<String>,
    pub exclusion_criteria: Vec<String>,
}

impl ArtifactSpec for ScreeningCriteria {
    const KIND: ArtifactKind = ArtifactKind::ScreeningCriteria;

    fn validate(&self) -> Result<(), String> {
        if self.inclusion_criteria.is_empty() {
            return Err("at least one inclusion criterion is required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyExportBundle {
    pub project_id: String,
    pub exported_kinds: Vec<ArtifactKind>,
    pub markdown_summary: String,
    pub notes: Option<String>,
}

impl ArtifactSpec for StrategyExportBundle {
    const KIND: ArtifactKind = ArtifactKind::StrategyExportBundle;

    fn validate(&self) -> Result<(), String> {
        non_empty("markdown_summary", &self.markdown_summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_are_rejected() {
        let v = json!({"project_id": "p", "inclusion_criteria": ["a"], "exclusion_criteria": [], "extra": 1});
        assert!(ScreeningCriteria::from_payload(&v).is_err());
    }

    #[test]
    fn concept_relations_must_reference_known_concepts() {
        let v = json!({
            "project_id": "p",
            "concepts": [{"id": "c0", "label": "A", "description": null, "concept_type": "population"}],
            "relations": [{"source_id": "c0", "target_id": "c9", "relation_type": "affects"}]
        });
        let err = ConceptModel::from_payload(&v).expect_err("dangling relation");
        assert!(err.to_string().contains("c9"));
    }

    #[test]
    fn optional_fields_serialize_as_null() {
        let ctx = ProjectContext { id: "p".into(),
                                   title: "T".into(),
                                   short_description: "d".into(),
                                   discipline: None,
                                   subfield: None,
                                   application_area: None,
                                   constraints: BTreeMap::new(),
                                   initial_keywords: vec![] };
        let v = ctx.to_payload().expect("payload");
        assert!(v.as_object().expect("object").contains_key("discipline"));
        assert_eq!(v["discipline"], serde_json::Value::Null);
    }

    #[test]
    fn blocks_convert_to_query_plan_in_order() {
        let blocks = SearchConceptBlocks { project_id: "p".into(),
                                           blocks: vec![SearchConceptBlock { id: "b0".into(),
                                                                             label: "Population".into(),
                                                                             description: None,
                                                                             terms_included: vec!["older adults".into(), "elderly".into()],
                                                                             terms_excluded: vec!["mice".into()] },
                                                        SearchConceptBlock { id: "b1".into(),
                                                                             label: "Outcome".into(),
                                                                             description: None,
                                                                             terms_included: vec![],
                                                                             terms_excluded: vec![] }] };
        let plan = blocks.to_query_plan();
        assert_eq!(plan.blocks.len(), 2);
        assert_eq!(plan.blocks[0].terms[0].text, "older adults");
        assert_eq!(plan.blocks[0].excluded.len(), 1);
        assert_eq!(blocks.empty_blocks(), vec!["Outcome"]);
    }
}
