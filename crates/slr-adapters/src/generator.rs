//! `HeuristicGenerator`: generador de contenido local, determinista y sin
//! red. Sirve para demos, tests y para trabajar sin proveedor de modelos.
//!
//! La salida es un objeto JSON con un payload por kind, indexado por el
//! nombre canónico del kind (`{"ProblemFraming": {...}, "ConceptModel": {...}}`).

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use slr_core::model::{Concept, ConceptModel, ProblemFraming, ProjectContext, QuestionPriority, ResearchQuestion,
                      ResearchQuestionSet, SearchConceptBlock, SearchConceptBlocks};
use slr_core::{ArtifactSpec, ContentGenerator, GenerationError, StageContext};

use crate::stages::{PROBLEM_FRAMING, PROJECT_SETUP, RESEARCH_QUESTIONS, SEARCH_CONCEPT_EXPANSION};
use crate::text::{extract_keywords, title_case, title_from_text};

const MAX_CONCEPTS: usize = 5;
const MAX_BLOCKS: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicGenerator;

impl HeuristicGenerator {
    pub fn new() -> Self {
        Self
    }

    fn project_context(&self, ctx: &StageContext) -> Result<Vec<Value>, GenerationError> {
        let raw_idea = ctx.param_str("raw_idea")
                          .map(str::trim)
                          .filter(|s| !s.is_empty())
                          .ok_or_else(|| GenerationError::failed(&ctx.stage, "missing 'raw_idea' parameter"))?;
        let context = ProjectContext { id: ctx.project_id.clone(),
                                       title: title_from_text(raw_idea),
                                       short_description: raw_idea.to_string(),
                                       discipline: None,
                                       subfield: None,
                                       application_area: None,
                                       constraints: BTreeMap::new(),
                                       initial_keywords: extract_keywords(raw_idea) };
        Ok(vec![encode(ctx, &context)?])
    }

    fn problem_framing(&self, ctx: &StageContext) -> Result<Vec<Value>, GenerationError> {
        let context: ProjectContext = ctx.require()?;
        let goals = if context.initial_keywords.is_empty() {
            vec!["Explore the problem domain".to_string()]
        } else {
            context.initial_keywords.iter().take(3).map(|kw| format!("Understand the role of {kw}")).collect()
        };
        let framing = ProblemFraming { project_id: ctx.project_id.clone(),
                                       problem_statement: format!("The research aims to investigate {} by examining key factors, relationships, and outcomes.",
                                                                  context.title.to_lowercase()),
                                       goals,
                                       scope_in: vec!["Academic literature".into(),
                                                      "Empirical studies".into(),
                                                      "Recent publications (last 10 years)".into()],
                                       scope_out: vec!["Non-peer-reviewed sources".into(), "Opinion pieces".into()],
                                       stakeholders: vec!["Researchers".into(), "Practitioners".into()] };
        let concepts = context.initial_keywords
                              .iter()
                              .take(MAX_CONCEPTS)
                              .enumerate()
                              .map(|(i, kw)| Concept { id: format!("concept_{i}"),
                                                       label: title_case(kw),
                                                       description: Some(format!("Key concept: {kw}")),
                                                       concept_type: "domain_concept".into() })
                              .collect();
        let model = ConceptModel { project_id: ctx.project_id.clone(),
                                   concepts,
                                   relations: Vec::new() };
        Ok(vec![encode(ctx, &framing)?, encode(ctx, &model)?])
    }

    fn research_questions(&self, ctx: &StageContext) -> Result<Vec<Value>, GenerationError> {
        let framing: ProblemFraming = ctx.require()?;
        let model: ConceptModel = ctx.require()?;
        let mut terms: Vec<&str> = model.concepts.iter().take(MAX_CONCEPTS).map(|c| c.label.as_str()).collect();
        if terms.is_empty() {
            terms.push("Core Phenomenon");
        }

        let mut texts = Vec::new();
        if !framing.problem_statement.trim().is_empty() {
            texts.push(format!("How does {} relate to outcomes described in the problem statement?", terms[0]));
        }
        let templates: [(usize, fn(&str) -> String); 4] =
            [(1, |t| format!("What factors influence {t} adoption or effectiveness?")),
             (2, |t| format!("What mechanisms link {t} to observed performance or quality measures?")),
             (3, |t| format!("How can {t} be optimized to improve reliability or consistency?")),
             (4, |t| format!("What are the barriers and facilitators to integrating {t} in practice?"))];
        for (idx, template) in templates {
            if let Some(term) = terms.get(idx) {
                texts.push(template(term));
            }
        }

        let linked: Vec<String> = model.concepts.iter().take(2).map(|c| c.id.clone()).collect();
        let questions = texts.into_iter()
                             .enumerate()
                             .map(|(i, text)| ResearchQuestion { id: format!("rq_{i}"),
                                                                 text,
                                                                 question_type: (if i == 0 { "descriptive" } else { "explanatory" }).into(),
                                                                 linked_concept_ids: linked.clone(),
                                                                 priority: if i < 3 {
                                                                     QuestionPriority::MustHave
                                                                 } else {
                                                                     QuestionPriority::NiceToHave
                                                                 } })
                             .collect();
        let set = ResearchQuestionSet { project_id: ctx.project_id.clone(),
                                        questions };
        Ok(vec![encode(ctx, &set)?])
    }

    fn search_blocks(&self, ctx: &StageContext) -> Result<Vec<Value>, GenerationError> {
        let model: ConceptModel = ctx.require()?;
        let _questions: ResearchQuestionSet = ctx.require()?;
        let blocks = model.concepts
                          .iter()
                          .take(MAX_BLOCKS)
                          .enumerate()
                          .map(|(i, concept)| SearchConceptBlock { id: format!("block_{i}"),
                                                                   label: concept.label.clone(),
                                                                   description: concept.description.clone(),
                                                                   terms_included: label_variants(&concept.label),
                                                                   terms_excluded: Vec::new() })
                          .collect();
        let blocks = SearchConceptBlocks { project_id: ctx.project_id.clone(),
                                           blocks };
        Ok(vec![encode(ctx, &blocks)?])
    }
}

/// Etiqueta, minúsculas, guiones y plural simple, sin duplicados.
fn label_variants(label: &str) -> Vec<String> {
    let mut variants = vec![label.to_string(), label.to_lowercase(), label.replace(' ', "-")];
    if !label.ends_with('s') {
        variants.push(format!("{label}s"));
    }
    let mut out: Vec<String> = Vec::with_capacity(variants.len());
    for v in variants {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

fn encode<T: ArtifactSpec>(ctx: &StageContext, payload: &T) -> Result<Value, GenerationError> {
    let value = payload.to_payload()
                       .map_err(|e| GenerationError::InvalidOutput { stage: ctx.stage.clone(),
                                                                     reason: format!("{}: {e}", T::KIND) })?;
    let mut out = Map::new();
    out.insert(T::KIND.as_str().to_string(), value);
    Ok(Value::Object(out))
}

impl ContentGenerator for HeuristicGenerator {
    fn name(&self) -> &str {
        "heuristic-local"
    }

    fn generate(&self, ctx: &StageContext) -> Result<Value, GenerationError> {
        let parts = match ctx.stage.as_str() {
            PROJECT_SETUP => self.project_context(ctx)?,
            PROBLEM_FRAMING => self.problem_framing(ctx)?,
            RESEARCH_QUESTIONS => self.research_questions(ctx)?,
            SEARCH_CONCEPT_EXPANSION => self.search_blocks(ctx)?,
            other => return Err(GenerationError::failed(other, "no heuristic available for this stage")),
        };
        let mut merged = Map::new();
        for part in parts {
            if let Value::Object(map) = part {
                merged.extend(map);
            }
        }
        Ok(Value::Object(merged))
    }
}
