//! Los siete stages incluidos de principio a fin con `HeuristicGenerator` y
//! store en memoria.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use slr_adapters::{default_registry, HeuristicGenerator, DATABASE_QUERY_PLAN, PROBLEM_FRAMING, RESEARCH_QUESTIONS,
                   SCREENING_CRITERIA, SEARCH_CONCEPT_EXPANSION, STRATEGY_EXPORT};
use slr_core::{ArtifactKind, InMemoryArtifactStore, PipelineController, PipelineError, StageState};

const IDEA: &str = "Hallucination detection in clinical summarization";
const OPENALEX: &str = r#"("large language models" OR LLM) AND (hallucination OR factuality) NOT survey"#;

fn controller() -> PipelineController<InMemoryArtifactStore> {
    let registry = default_registry(Arc::new(HeuristicGenerator::new()), vec!["openalex".into()]).expect("registry");
    PipelineController::new(InMemoryArtifactStore::new(), registry).expect("controller")
}

fn run_and_approve(c: &PipelineController<InMemoryArtifactStore>, pid: &str, stage: &str, kinds: &[ArtifactKind]) {
    let r = c.run_stage(pid, stage).expect("run");
    assert!(r.is_success(), "{stage}: {:?}", r.validation_errors);
    for kind in kinds {
        c.approve_artifact(pid, *kind, None, None).expect("approve");
    }
}

fn edited_blocks(pid: &str) -> Value {
    json!({"project_id": pid, "blocks": [
        {"id": "block_0", "label": "Population", "description": null,
         "terms_included": ["large language models", "LLM"], "terms_excluded": []},
        {"id": "block_1", "label": "Outcome", "description": null,
         "terms_included": ["hallucination", "factuality"], "terms_excluded": ["survey"]}
    ]})
}

#[test]
fn full_strategy_from_idea_to_export() {
    let c = controller();
    let start = c.start_project(IDEA).expect("start");
    let pid = start.project_id.clone();
    assert!(pid.starts_with("project_"));
    assert_eq!(start.result.extra_data["generator"], json!("heuristic-local"));
    c.approve_artifact(&pid, ArtifactKind::ProjectContext, None, None).expect("approve context");

    run_and_approve(&c, &pid, PROBLEM_FRAMING, &[ArtifactKind::ProblemFraming, ArtifactKind::ConceptModel]);
    run_and_approve(&c, &pid, RESEARCH_QUESTIONS, &[ArtifactKind::ResearchQuestionSet]);

    let r = c.run_stage(&pid, SEARCH_CONCEPT_EXPANSION).expect("expand");
    assert!(r.is_success());
    let blocks = edited_blocks(&pid);
    c.approve_artifact(&pid, ArtifactKind::SearchConceptBlocks, Some(&json!({"blocks": blocks["blocks"]})), None)
     .expect("approve edited blocks");

    let mut params = Map::new();
    params.insert("target_databases".into(), json!(["openalex", "pubmed"]));
    let plan = c.run_stage_with(&pid, DATABASE_QUERY_PLAN, params).expect("query plan");
    assert!(plan.is_success(), "{:?}", plan.validation_errors);
    let queries = &plan.draft(ArtifactKind::DatabaseQueryPlan).expect("draft")["queries"];
    assert_eq!(queries[0]["boolean_query_string"], json!(OPENALEX));
    assert_eq!(queries[1]["database_name"], json!("pubmed"));
    c.approve_artifact(&pid, ArtifactKind::DatabaseQueryPlan, None, None).expect("approve plan");
    assert_eq!(c.build_project_query(&pid, "OpenAlex").expect("project query"), OPENALEX);

    run_and_approve(&c, &pid, SCREENING_CRITERIA, &[ArtifactKind::ScreeningCriteria]);
    let screening = c.get_artifact(&pid, ArtifactKind::ScreeningCriteria).expect("criteria");
    assert!(screening.payload["inclusion_criteria"].as_array()
                                                   .expect("inclusion")
                                                   .contains(&json!("Studies addressing primary research questions (n=3)")));

    run_and_approve(&c, &pid, STRATEGY_EXPORT, &[ArtifactKind::StrategyExportBundle]);
    let bundle = c.get_artifact(&pid, ArtifactKind::StrategyExportBundle).expect("bundle");
    let md = bundle.payload["markdown_summary"].as_str().expect("markdown");
    assert!(md.starts_with("# Strategy Summary for Project: Hallucination Detection In Clinical Summarization"));
    assert!(md.contains(OPENALEX));
    assert!(md.contains("Complexity: balanced"));

    let status = c.get_project_status(&pid).expect("status");
    assert!(status.is_complete);
    assert_eq!(status.percent, 100.0);
    assert!(status.next_stages.is_empty());
}

#[test]
fn query_plan_is_locked_until_blocks_are_approved() {
    let c = controller();
    let pid = c.start_project(IDEA).expect("start").project_id;
    c.approve_artifact(&pid, ArtifactKind::ProjectContext, None, None).expect("approve");
    let err = c.run_stage(&pid, DATABASE_QUERY_PLAN).expect_err("locked");
    assert!(matches!(err, PipelineError::PrerequisiteNotMet { ref missing, .. }
                     if missing == &vec![ArtifactKind::SearchConceptBlocks]));
    let err = c.build_project_query(&pid, "openalex").expect_err("no approved blocks");
    assert!(matches!(err, PipelineError::PrerequisiteNotMet { .. }));
    let states = c.get_project_status(&pid).expect("status").stage_states;
    assert_eq!(states[PROBLEM_FRAMING], StageState::Available);
    assert_eq!(states[DATABASE_QUERY_PLAN], StageState::Locked);
}

#[test]
fn unsupported_database_leaves_no_draft() {
    let c = controller();
    let pid = c.start_project(IDEA).expect("start").project_id;
    c.approve_artifact(&pid, ArtifactKind::ProjectContext, None, None).expect("approve");
    run_and_approve(&c, &pid, PROBLEM_FRAMING, &[ArtifactKind::ProblemFraming, ArtifactKind::ConceptModel]);
    run_and_approve(&c, &pid, RESEARCH_QUESTIONS, &[ArtifactKind::ResearchQuestionSet]);
    run_and_approve(&c, &pid, SEARCH_CONCEPT_EXPANSION, &[ArtifactKind::SearchConceptBlocks]);

    let mut params = Map::new();
    params.insert("target_databases".into(), json!("webofscience"));
    let r = c.run_stage_with(&pid, DATABASE_QUERY_PLAN, params).expect("run");
    assert!(!r.is_success());
    assert!(r.validation_errors[0].starts_with("webofscience:"));
    assert!(matches!(c.get_artifact(&pid, ArtifactKind::DatabaseQueryPlan),
                     Err(PipelineError::ArtifactNotFound { .. })));
}
