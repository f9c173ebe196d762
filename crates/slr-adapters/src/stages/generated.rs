//! Stage respaldado por un `ContentGenerator`.

use std::sync::Arc;

use serde_json::{json, Value};
use slr_core::{ArtifactKind, ContentGenerator, GenerationError, StageContext, StageHandler, StageOutput};

use super::{PROBLEM_FRAMING, PROJECT_SETUP, RESEARCH_QUESTIONS, SEARCH_CONCEPT_EXPANSION};

/// Delegación en el generador. Interpreta su salida como un objeto
/// `{ "<Kind>": payload }`; el orquestador valida después los esquemas.
pub struct GeneratedStage {
    generator: Arc<dyn ContentGenerator>,
}

impl GeneratedStage {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }
}

fn review_prompts(stage: &str) -> &'static [&'static str] {
    match stage {
        PROJECT_SETUP => &["Review the title and description.",
                           "Add discipline, subfield or constraints if known."],
        PROBLEM_FRAMING => &["Check that the problem statement matches your intent.",
                             "Rename or retype concepts (population, intervention, outcome...) before approving."],
        RESEARCH_QUESTIONS => &["Mark the questions you must answer as must_have.",
                                "Link each question to the concepts it depends on."],
        SEARCH_CONCEPT_EXPANSION => &["Add synonyms, acronyms and spelling variants to each block.",
                                      "Use terms_excluded for known false positives."],
        _ => &[],
    }
}

impl StageHandler for GeneratedStage {
    fn run(&self, ctx: &StageContext) -> Result<StageOutput, GenerationError> {
        let generated = self.generator.generate(ctx)?;
        let Value::Object(parts) = generated else {
            return Err(GenerationError::InvalidOutput { stage: ctx.stage.clone(),
                                                        reason: "generator output must be an object keyed by artifact kind".into() });
        };

        let mut out = StageOutput::new().with_extra("generator", json!(self.generator.name()));
        for (key, payload) in parts {
            let kind: ArtifactKind = key.parse().map_err(|e| GenerationError::InvalidOutput { stage: ctx.stage.clone(),
                                                                                                reason: format!("{e}") })?;
            out.drafts.insert(kind, payload);
        }
        for prompt in review_prompts(&ctx.stage) {
            out = out.with_prompt(*prompt);
        }
        Ok(out)
    }
}
