//! Flujo HITL completo sobre un grafo pequeño de stages con handlers de
//! prueba y store en memoria.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};
use slr_core::{ApprovalStatus, ArtifactKind, GenerationError, InMemoryArtifactStore, PipelineController,
               PipelineError, StageContext, StageDefinition, StageOutput, StageRegistry, StageState};

fn setup(ctx: &StageContext) -> Result<StageOutput, GenerationError> {
    let idea = ctx.param_str("raw_idea").unwrap_or("untitled");
    let mut out = StageOutput::new();
    out.drafts.insert(ArtifactKind::ProjectContext,
                      json!({"id": ctx.project_id, "title": idea, "short_description": idea,
                             "discipline": null, "subfield": null, "application_area": null,
                             "constraints": {}, "initial_keywords": ["alpha"]}));
    Ok(out)
}

fn framing(ctx: &StageContext) -> Result<StageOutput, GenerationError> {
    let mut out = StageOutput::new();
    out.drafts.insert(ArtifactKind::ProblemFraming,
                      json!({"project_id": ctx.project_id, "problem_statement": "why", "goals": ["g"],
                             "scope_in": [], "scope_out": [], "stakeholders": []}));
    out.drafts.insert(ArtifactKind::ConceptModel,
                      json!({"project_id": ctx.project_id,
                             "concepts": [{"id": "c0", "label": "alpha", "description": null, "concept_type": "domain_concept"}],
                             "relations": []}));
    Ok(out)
}

fn questions(ctx: &StageContext) -> Result<StageOutput, GenerationError> {
    let mut out = StageOutput::new();
    out.drafts.insert(ArtifactKind::ResearchQuestionSet,
                      json!({"project_id": ctx.project_id,
                             "questions": [{"id": "rq1", "text": "What?", "question_type": "descriptive",
                                            "linked_concept_ids": ["c0"], "priority": "must_have"}]}));
    Ok(out)
}

fn registry() -> StageRegistry {
    StageRegistry::builder().bootstrap(StageDefinition::new("project-setup").produces(&[ArtifactKind::ProjectContext]),
                                       setup)
                            .stage(StageDefinition::new("problem-framing").requires(&[ArtifactKind::ProjectContext])
                                                                          .produces(&[ArtifactKind::ProblemFraming,
                                                                                      ArtifactKind::ConceptModel]),
                                   framing)
                            .stage(StageDefinition::new("research-questions").requires(&[ArtifactKind::ProblemFraming,
                                                                                         ArtifactKind::ConceptModel])
                                                                             .produces(&[ArtifactKind::ResearchQuestionSet]),
                                   questions)
                            .build()
                            .expect("valid registry")
}

fn controller() -> PipelineController<InMemoryArtifactStore> {
    PipelineController::new(InMemoryArtifactStore::new(), registry()).expect("controller")
}

#[test]
fn start_approve_and_unlock_next_stage_only() {
    let c = controller();
    let start = c.start_project("idea text").expect("start");
    assert!(start.result.is_success());
    let pid = start.project_id.as_str();

    let ctx = c.get_artifact(pid, ArtifactKind::ProjectContext).expect("context saved");
    assert_eq!(ctx.status, ApprovalStatus::Draft);
    assert_eq!(c.get_next_available_stages(pid).expect("next"), vec!["project-setup".to_string()]);

    let approved = c.approve_artifact(pid, ArtifactKind::ProjectContext, Some(&json!({})), None).expect("approve");
    assert_eq!(approved.status, ApprovalStatus::Approved);

    let next = c.get_next_available_stages(pid).expect("next");
    assert!(next.contains(&"problem-framing".to_string()));
    assert!(!next.contains(&"research-questions".to_string()));
    assert!(!next.contains(&"project-setup".to_string()));

    let status = c.get_project_status(pid).expect("status");
    assert_eq!(status.completed, 1);
    assert_eq!(status.total, 3);
    assert_eq!(status.percent, 33.3);
    assert_eq!(status.stage_states["research-questions"], StageState::Locked);
}

#[test]
fn every_missing_prerequisite_is_reported() {
    let c = controller();
    let pid = c.start_project("idea").expect("start").project_id;
    let err = c.run_stage(&pid, "research-questions").expect_err("locked");
    match err {
        PipelineError::PrerequisiteNotMet { stage, missing } => {
            assert_eq!(stage, "research-questions");
            assert_eq!(missing, vec![ArtifactKind::ProblemFraming, ArtifactKind::ConceptModel]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(c.get_artifact(&pid, ArtifactKind::ResearchQuestionSet).is_err());
}

#[test]
fn approving_a_never_produced_kind_is_not_found() {
    let c = controller();
    let pid = c.start_project("idea").expect("start").project_id;
    let err = c.approve_artifact(&pid, ArtifactKind::ScreeningCriteria, None, None).expect_err("never produced");
    assert!(matches!(err, PipelineError::ArtifactNotFound { kind: ArtifactKind::ScreeningCriteria, .. }));
}

#[test]
fn rerun_returns_approved_kind_to_draft() {
    let c = controller();
    let pid = c.start_project("idea").expect("start").project_id;
    c.approve_artifact(&pid, ArtifactKind::ProjectContext, None, None).expect("approve");
    c.run_stage(&pid, "problem-framing").expect("run");
    c.approve_artifact(&pid, ArtifactKind::ProblemFraming, None, Some("ok")).expect("approve pf");
    c.approve_artifact(&pid, ArtifactKind::ConceptModel, None, None).expect("approve cm");
    assert_eq!(c.get_project_status(&pid).expect("status").stage_states["problem-framing"],
               StageState::Approved);

    let rerun = c.run_stage(&pid, "problem-framing").expect("rerun");
    assert!(rerun.is_success());
    let pf = c.get_artifact(&pid, ArtifactKind::ProblemFraming).expect("pf");
    assert_eq!(pf.status, ApprovalStatus::Draft);
    assert_eq!(pf.user_notes, None);
    assert_eq!(c.get_project_status(&pid).expect("status").stage_states["problem-framing"],
               StageState::DraftProduced);
    assert!(c.run_stage(&pid, "research-questions").is_err());
}

#[test]
fn rerunning_upstream_locks_approved_dependents() {
    let c = controller();
    let pid = c.start_project("idea").expect("start").project_id;
    c.approve_artifact(&pid, ArtifactKind::ProjectContext, None, None).expect("approve");
    c.run_stage(&pid, "problem-framing").expect("run");
    c.approve_artifact(&pid, ArtifactKind::ProblemFraming, None, None).expect("approve pf");
    c.approve_artifact(&pid, ArtifactKind::ConceptModel, None, None).expect("approve cm");
    c.run_stage(&pid, "research-questions").expect("run rq");
    c.approve_artifact(&pid, ArtifactKind::ResearchQuestionSet, None, None).expect("approve rq");
    assert!(c.get_project_status(&pid).expect("status").is_complete);

    c.run_stage(&pid, "problem-framing").expect("rerun");
    let status = c.get_project_status(&pid).expect("status");
    assert_eq!(status.stage_states["research-questions"], StageState::Locked);
    assert_eq!(status.completed, 1);
    assert!(!status.is_complete);
    let rq = c.get_artifact(&pid, ArtifactKind::ResearchQuestionSet).expect("rq");
    assert_eq!(rq.status, ApprovalStatus::Approved);
}

#[test]
fn failing_handler_leaves_approved_state_untouched() {
    let failing = |ctx: &StageContext| -> Result<StageOutput, GenerationError> {
        Err(GenerationError::failed(ctx.stage.clone(), "quota exhausted"))
    };
    let mut reg = registry();
    reg.replace(StageDefinition::new("problem-framing").requires(&[ArtifactKind::ProjectContext])
                                                       .produces(&[ArtifactKind::ProblemFraming, ArtifactKind::ConceptModel]),
                failing)
       .expect("replace");
    let c = PipelineController::new(InMemoryArtifactStore::new(), reg).expect("controller");
    let pid = c.start_project("idea").expect("start").project_id;
    let before = c.approve_artifact(&pid, ArtifactKind::ProjectContext, None, None).expect("approve");

    let r = c.run_stage(&pid, "problem-framing").expect("degrades gracefully");
    assert!(!r.is_success());
    assert!(r.validation_errors[0].contains("quota exhausted"));
    assert_eq!(c.get_artifact(&pid, ArtifactKind::ProjectContext).expect("ctx"), before);
    assert!(c.get_artifact(&pid, ArtifactKind::ProblemFraming).is_err());
}

#[test]
fn edits_are_merged_and_unknown_fields_rejected() {
    let c = controller();
    let pid = c.start_project("idea").expect("start").project_id;
    let err = c.approve_artifact(&pid, ArtifactKind::ProjectContext, Some(&json!({"colour": "red"})), None)
               .expect_err("unknown field");
    assert!(matches!(err, PipelineError::InvalidEdit { ref field, .. } if field == "colour"));

    let a = c.approve_artifact(&pid,
                               ArtifactKind::ProjectContext,
                               Some(&json!({"title": "Edited title", "discipline": "Computer Science"})),
                               Some("tightened"))
             .expect("approve");
    assert_eq!(a.payload["title"], json!("Edited title"));
    assert_eq!(a.payload["discipline"], json!("Computer Science"));
    assert_eq!(a.payload["initial_keywords"], json!(["alpha"]));
    assert_eq!(a.user_notes.as_deref(), Some("tightened"));
}

#[test]
fn status_of_unknown_project_is_not_found() {
    let c = controller();
    assert!(matches!(c.get_project_status("project_missing"), Err(PipelineError::ProjectNotFound { .. })));
    assert!(c.list_projects().expect("list").is_empty());
}

#[test]
fn concurrent_runs_and_approvals_on_one_project_are_serialized() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let overlap = Arc::new(AtomicUsize::new(0));
    let (f, o) = (Arc::clone(&in_flight), Arc::clone(&overlap));
    let watched = move |ctx: &StageContext| -> Result<StageOutput, GenerationError> {
        if f.fetch_add(1, Ordering::SeqCst) > 0 {
            o.fetch_add(1, Ordering::SeqCst);
        }
        thread::sleep(std::time::Duration::from_millis(5));
        let out = framing(ctx);
        f.fetch_sub(1, Ordering::SeqCst);
        out
    };
    let mut reg = registry();
    reg.replace(StageDefinition::new("problem-framing").requires(&[ArtifactKind::ProjectContext])
                                                       .produces(&[ArtifactKind::ProblemFraming, ArtifactKind::ConceptModel]),
                watched)
       .expect("replace");
    let c = Arc::new(PipelineController::new(InMemoryArtifactStore::new(), reg).expect("controller"));
    let pid = c.start_project("idea").expect("start").project_id;
    c.approve_artifact(&pid, ArtifactKind::ProjectContext, None, None).expect("approve");

    let handles: Vec<_> = (0..6).map(|i| {
                                    let c = Arc::clone(&c);
                                    let pid = pid.clone();
                                    thread::spawn(move || {
                                        if i % 2 == 0 {
                                            c.run_stage(&pid, "problem-framing").map(|_| ())
                                        } else {
                                            c.approve_artifact(&pid, ArtifactKind::ProjectContext, None, None).map(|_| ())
                                        }
                                    })
                                })
                                .collect();
    for h in handles {
        h.join().expect("thread").expect("operation");
    }
    assert_eq!(overlap.load(Ordering::SeqCst), 0);
    let pf = c.get_artifact(&pid, ArtifactKind::ProblemFraming).expect("pf");
    assert_eq!(pf.status, ApprovalStatus::Draft);
}

#[test]
fn payload_hash_is_stable_for_identical_drafts() {
    let c = controller();
    let pid = c.start_project("same idea").expect("start").project_id;
    let first = c.get_artifact(&pid, ArtifactKind::ProjectContext).expect("ctx");
    c.run_stage_with(&pid, "project-setup", serde_json::Map::from_iter([("raw_idea".to_string(), Value::from("same idea"))]))
     .expect("rerun");
    let second = c.get_artifact(&pid, ArtifactKind::ProjectContext).expect("ctx");
    assert_eq!(first.hash, second.hash);
    assert_eq!(first.created_at, second.created_at);
}
