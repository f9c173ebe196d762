//! database-query-plan: renderiza los bloques aprobados para cada base de
//! datos pedida con el motor de sintaxis. Ninguna cadena de consulta sale de
//! otro sitio.

use log::info;
use serde_json::json;
use slr_core::model::{DatabaseQuery, DatabaseQueryPlan, SearchConceptBlocks};
use slr_core::{GenerationError, StageContext, StageHandler, StageOutput};
use slr_query::{analyze, get_builder};

pub const TARGET_DATABASES_PARAM: &str = "target_databases";

pub struct DatabaseQueryPlanStage {
    default_databases: Vec<String>,
}

impl DatabaseQueryPlanStage {
    pub fn new(default_databases: Vec<String>) -> Self {
        Self { default_databases }
    }

    /// Bases pedidas en parámetros o las por defecto, en minúsculas y sin
    /// repetir. Un parámetro mal formado es un error, nunca las por defecto.
    fn databases(&self, ctx: &StageContext) -> Result<Vec<String>, String> {
        let requested = ctx.param_list(TARGET_DATABASES_PARAM)?
                           .filter(|l| !l.is_empty())
                           .unwrap_or_else(|| self.default_databases.clone());
        let mut out: Vec<String> = Vec::new();
        for db in requested {
            let db = db.trim().to_ascii_lowercase();
            if !db.is_empty() && !out.contains(&db) {
                out.push(db);
            }
        }
        Ok(out)
    }
}

fn database_notes(db: &str) -> &'static str {
    match db {
        "pubmed" => "Syntax-only: copy to the PubMed UI. Consider adding MeSH terms.",
        "scopus" => "Syntax-only: requires Scopus access. Copy to the Scopus UI.",
        "openalex" | "arxiv" | "semanticscholar" | "crossref" => "Executable through the provider search API.",
        _ => "Generated by the syntax engine.",
    }
}

impl StageHandler for DatabaseQueryPlanStage {
    fn run(&self, ctx: &StageContext) -> Result<StageOutput, GenerationError> {
        let blocks: SearchConceptBlocks = ctx.require()?;
        if blocks.blocks.is_empty() {
            return Ok(StageOutput::rejected(vec!["SearchConceptBlocks is empty: no concept blocks defined.".into(),
                                                 "Edit SearchConceptBlocks so that at least one block has search terms.".into()]));
        }
        let empty = blocks.empty_blocks();
        if !empty.is_empty() {
            return Ok(StageOutput::rejected(vec![format!("The following concept blocks have no search terms: {}",
                                                         empty.join(", ")),
                                                 "Edit SearchConceptBlocks to add terms_included for each block.".into()]));
        }

        let databases = match self.databases(ctx) {
            Ok(databases) => databases,
            Err(e) => return Ok(StageOutput::rejected(vec![e])),
        };
        let plan = blocks.to_query_plan();
        let block_ids: Vec<String> = blocks.blocks.iter().map(|b| b.id.clone()).collect();
        let mut queries = Vec::new();
        let mut errors = Vec::new();
        for db in databases {
            let rendered = get_builder(&db).and_then(|builder| builder.build(&plan).map(|q| (builder, q)));
            match rendered {
                Ok((builder, query)) => {
                    let report = analyze(&plan, builder.dialect_name(), &query);
                    queries.push(DatabaseQuery { id: format!("query_{db}"),
                                                 notes: Some(database_notes(&db).to_string()),
                                                 database_name: db,
                                                 query_blocks: block_ids.clone(),
                                                 boolean_query_string: query,
                                                 complexity: Some(report) });
                }
                Err(e) => errors.push(format!("{db}: {e}")),
            }
        }
        if !errors.is_empty() {
            return Ok(StageOutput::rejected(errors));
        }
        if queries.is_empty() {
            return Ok(StageOutput::rejected(vec!["no target databases given".into()]));
        }

        info!("rendered {} queries for project '{}'", queries.len(), ctx.project_id);
        let databases: Vec<&str> = queries.iter().map(|q| q.database_name.as_str()).collect();
        let extra = json!(databases);
        let plan = DatabaseQueryPlan { project_id: ctx.project_id.clone(),
                                       queries };
        Ok(StageOutput::new().with_draft(&ctx.stage, &plan)?
                             .with_extra("databases", extra)
                             .with_prompt("Review each database query for accuracy.")
                             .with_prompt("For PubMed: validate suggested MeSH terms.")
                             .with_prompt("Copy syntax-only queries to the respective database UIs for validation."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slr_core::ArtifactKind;

    fn ctx(blocks: serde_json::Value) -> StageContext {
        let mut ctx = StageContext::new("database-query-plan", "p");
        ctx.approved.insert(ArtifactKind::SearchConceptBlocks, blocks);
        ctx
    }

    fn two_blocks() -> serde_json::Value {
        json!({"project_id": "p", "blocks": [
            {"id": "block_0", "label": "Population", "description": null,
             "terms_included": ["large language models", "LLM"], "terms_excluded": []},
            {"id": "block_1", "label": "Outcome", "description": null,
             "terms_included": ["hallucination", "factuality"], "terms_excluded": ["survey"]}
        ]})
    }

    #[test]
    fn renders_requested_databases_with_complexity() {
        let mut c = ctx(two_blocks());
        c.params.insert(TARGET_DATABASES_PARAM.into(), json!(["OpenAlex", "pubmed", "openalex"]));
        let out = DatabaseQueryPlanStage::new(vec![]).run(&c).expect("run");
        assert!(out.validation_errors.is_empty());
        let plan = &out.drafts[&ArtifactKind::DatabaseQueryPlan];
        let queries = plan["queries"].as_array().expect("queries");
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0]["id"], json!("query_openalex"));
        assert_eq!(queries[0]["boolean_query_string"],
                   json!(r#"("large language models" OR LLM) AND (hallucination OR factuality) NOT survey"#));
        assert_eq!(queries[0]["query_blocks"], json!(["block_0", "block_1"]));
        assert_eq!(queries[1]["complexity"]["complexity_level"], json!("balanced"));
    }

    #[test]
    fn empty_blocks_are_rejected_with_labels() {
        let blocks = json!({"project_id": "p", "blocks": [
            {"id": "block_0", "label": "Population", "description": null, "terms_included": ["adults"], "terms_excluded": []},
            {"id": "block_1", "label": "Outcome", "description": null, "terms_included": [], "terms_excluded": []}
        ]});
        let out = DatabaseQueryPlanStage::new(vec!["openalex".into()]).run(&ctx(blocks)).expect("run");
        assert!(out.drafts.is_empty());
        assert!(out.validation_errors[0].contains("Outcome"));
    }

    #[test]
    fn unknown_database_rejects_the_whole_plan() {
        let mut c = ctx(two_blocks());
        c.params.insert(TARGET_DATABASES_PARAM.into(), json!("openalex, webofscience"));
        let out = DatabaseQueryPlanStage::new(vec![]).run(&c).expect("run");
        assert!(out.drafts.is_empty());
        assert!(out.validation_errors[0].starts_with("webofscience:"));
    }

    #[test]
    fn malformed_database_list_is_rejected() {
        let mut c = ctx(two_blocks());
        c.params.insert(TARGET_DATABASES_PARAM.into(), json!([1, 2]));
        let out = DatabaseQueryPlanStage::new(vec!["openalex".into()]).run(&c).expect("run");
        assert!(out.drafts.is_empty());
        assert_eq!(out.validation_errors,
                   vec!["parameter 'target_databases' must be a string or a list of strings".to_string()]);
    }

    #[test]
    fn falls_back_to_default_databases() {
        let out = DatabaseQueryPlanStage::new(vec!["arxiv".into(), "scopus".into()]).run(&ctx(two_blocks()))
                                                                                    .expect("run");
        assert_eq!(out.extra_data["databases"], json!(["arxiv", "scopus"]));
    }
}
