//! strategy-export: reúne los artifacts aprobados en un resumen Markdown.

use std::fmt::Write as _;

use slr_core::model::{ConceptModel, DatabaseQueryPlan, ProblemFraming, ProjectContext, ResearchQuestionSet,
                      ScreeningCriteria, SearchConceptBlocks, StrategyExportBundle};
use slr_core::{ArtifactKind, GenerationError, StageContext, StageHandler, StageOutput};

const MAX_CONCEPTS: usize = 20;
const MAX_BLOCK_TERMS: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyExportStage;

/// Vista tipada de todo lo que se exporta.
struct Strategy {
    context: ProjectContext,
    framing: ProblemFraming,
    concepts: ConceptModel,
    questions: ResearchQuestionSet,
    blocks: SearchConceptBlocks,
    queries: DatabaseQueryPlan,
    screening: ScreeningCriteria,
}

impl Strategy {
    fn load(ctx: &StageContext) -> Result<Self, GenerationError> {
        Ok(Self { context: ctx.require()?,
                  framing: ctx.require()?,
                  concepts: ctx.require()?,
                  questions: ctx.require()?,
                  blocks: ctx.require()?,
                  queries: ctx.require()?,
                  screening: ctx.require()? })
    }

    fn markdown(&self) -> String {
        let mut md = String::new();
        // Escribir en un String no falla.
        let _ = self.write_markdown(&mut md);
        md
    }

    fn write_markdown(&self, md: &mut String) -> std::fmt::Result {
        writeln!(md, "# Strategy Summary for Project: {}", self.context.title)?;
        writeln!(md, "\n## Problem Framing\n{}", self.framing.problem_statement)?;
        writeln!(md, "\n### Goals")?;
        for goal in &self.framing.goals {
            writeln!(md, "- {goal}")?;
        }

        writeln!(md, "\n## Concepts")?;
        for c in self.concepts.concepts.iter().take(MAX_CONCEPTS) {
            writeln!(md, "- {} ({})", c.label, c.concept_type)?;
        }

        writeln!(md, "\n## Research Questions")?;
        for q in &self.questions.questions {
            writeln!(md, "- {}", q.text)?;
        }

        writeln!(md, "\n## Search Concept Blocks")?;
        for b in &self.blocks.blocks {
            let terms: Vec<&str> = b.terms_included.iter().take(MAX_BLOCK_TERMS).map(String::as_str).collect();
            writeln!(md, "- {}: {}", b.label, terms.join(", "))?;
        }

        writeln!(md, "\n## Database Queries")?;
        for q in &self.queries.queries {
            writeln!(md, "### {}\n```\n{}\n```", q.database_name.to_uppercase(), q.boolean_query_string)?;
            if let Some(report) = &q.complexity {
                writeln!(md,
                         "Complexity: {} | Expected Results: {}",
                         report.complexity_level, report.expected_results)?;
            }
        }

        writeln!(md, "\n## Screening Criteria\n### Inclusion")?;
        for c in &self.screening.inclusion_criteria {
            writeln!(md, "- {c}")?;
        }
        writeln!(md, "### Exclusion")?;
        for c in &self.screening.exclusion_criteria {
            writeln!(md, "- {c}")?;
        }
        Ok(())
    }
}

impl StageHandler for StrategyExportStage {
    fn run(&self, ctx: &StageContext) -> Result<StageOutput, GenerationError> {
        let strategy = Strategy::load(ctx)?;
        let exported_kinds: Vec<ArtifactKind> =
            ArtifactKind::ALL.into_iter().filter(|k| *k != ArtifactKind::StrategyExportBundle).collect();
        let bundle = StrategyExportBundle { project_id: ctx.project_id.clone(),
                                            exported_kinds,
                                            markdown_summary: strategy.markdown(),
                                            notes: Some(format!("{} database queries, {} inclusion and {} exclusion criteria",
                                                                strategy.queries.queries.len(),
                                                                strategy.screening.inclusion_criteria.len(),
                                                                strategy.screening.exclusion_criteria.len())) };
        Ok(StageOutput::new().with_draft(&ctx.stage, &bundle)?
                             .with_prompt("Review the Markdown summary for completeness.")
                             .with_prompt("Add PRISMA flow elements if performing a systematic review."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_ctx() -> StageContext {
        let mut ctx = StageContext::new("strategy-export", "p");
        let approved = [(ArtifactKind::ProjectContext,
                         json!({"id": "p", "title": "LLM Hallucination", "short_description": "d", "discipline": null,
                                "subfield": null, "application_area": null, "constraints": {}, "initial_keywords": []})),
                        (ArtifactKind::ProblemFraming,
                         json!({"project_id": "p", "problem_statement": "Why models invent facts.", "goals": ["Map causes"],
                                "scope_in": [], "scope_out": [], "stakeholders": []})),
                        (ArtifactKind::ConceptModel,
                         json!({"project_id": "p", "relations": [], "concepts": [
                             {"id": "c0", "label": "Hallucination", "description": null, "concept_type": "outcome"}]})),
                        (ArtifactKind::ResearchQuestionSet,
                         json!({"project_id": "p", "questions": [
                             {"id": "rq_0", "text": "What causes it?", "question_type": "explanatory",
                              "linked_concept_ids": ["c0"], "priority": "must_have"}]})),
                        (ArtifactKind::SearchConceptBlocks,
                         json!({"project_id": "p", "blocks": [
                             {"id": "block_0", "label": "Hallucination", "description": null,
                              "terms_included": ["hallucination", "confabulation"], "terms_excluded": []}]})),
                        (ArtifactKind::DatabaseQueryPlan,
                         json!({"project_id": "p", "queries": [
                             {"id": "query_openalex", "database_name": "openalex", "query_blocks": ["block_0"],
                              "boolean_query_string": "(hallucination OR confabulation)", "notes": null, "complexity": null}]})),
                        (ArtifactKind::ScreeningCriteria,
                         json!({"project_id": "p", "inclusion_criteria": ["Empirical studies"],
                                "exclusion_criteria": ["Retracted publications"]}))];
        for (kind, payload) in approved {
            ctx.approved.insert(kind, payload);
        }
        ctx
    }

    #[test]
    fn markdown_lists_every_section() {
        let out = StrategyExportStage.run(&full_ctx()).expect("run");
        let bundle = &out.drafts[&ArtifactKind::StrategyExportBundle];
        let md = bundle["markdown_summary"].as_str().expect("markdown");
        assert!(md.starts_with("# Strategy Summary for Project: LLM Hallucination\n"));
        assert!(md.contains("- Hallucination (outcome)"));
        assert!(md.contains("- Hallucination: hallucination, confabulation"));
        assert!(md.contains("### OPENALEX\n```\n(hallucination OR confabulation)\n```"));
        assert!(md.contains("### Inclusion\n- Empirical studies"));
        assert!(md.contains("### Exclusion\n- Retracted publications"));
        assert_eq!(bundle["exported_kinds"].as_array().map(Vec::len), Some(7));
    }

    #[test]
    fn missing_screening_is_a_context_error() {
        let mut ctx = full_ctx();
        ctx.approved.remove(&ArtifactKind::ScreeningCriteria);
        let err = StrategyExportStage.run(&ctx).expect_err("incomplete context");
        assert!(matches!(err, GenerationError::BadContext { kind: ArtifactKind::ScreeningCriteria, .. }));
    }
}
