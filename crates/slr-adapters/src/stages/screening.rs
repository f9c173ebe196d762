//! screening-criteria: criterios de inclusión y exclusión alineados con
//! PRISMA, extraídos de forma determinista del modelo de conceptos (PICO),
//! del encuadre y de las preguntas. Sin generador.

use log::info;
use serde_json::json;
use slr_core::model::{ConceptModel, DatabaseQueryPlan, ProblemFraming, ResearchQuestionSet, ScreeningCriteria};
use slr_core::{GenerationError, StageContext, StageHandler, StageOutput};

pub const REFINE_WITH_QUERIES_PARAM: &str = "refine_with_queries";
pub const INCLUDE_STUDY_DESIGNS_PARAM: &str = "include_study_designs";

const NARROWING_EXCLUSION: &str =
    "General surveys or overviews unless they specifically address the intervention-outcome relationship";
const SPECIFICITY_INCLUSION: &str = "Studies must closely match the specific focus defined in research questions";

#[derive(Debug, Clone, Copy, Default)]
pub struct ScreeningCriteriaStage;

/// Etiquetas de conceptos agrupadas por elemento PICO extendido.
#[derive(Debug, Default)]
struct Pico<'a> {
    population: Vec<&'a str>,
    intervention: Vec<&'a str>,
    comparison: Vec<&'a str>,
    outcome: Vec<&'a str>,
    context: Vec<&'a str>,
    method: Vec<&'a str>,
    other: Vec<&'a str>,
}

impl<'a> Pico<'a> {
    fn extract(model: &'a ConceptModel) -> Self {
        let mut pico = Pico::default();
        for concept in &model.concepts {
            let slot = match concept.concept_type.to_lowercase().as_str() {
                "population" | "participant" | "sample" => &mut pico.population,
                "intervention" | "treatment" | "exposure" => &mut pico.intervention,
                "comparison" | "control" | "comparator" => &mut pico.comparison,
                "outcome" | "result" | "effect" => &mut pico.outcome,
                "context" | "setting" | "environment" => &mut pico.context,
                "method" | "methodology" | "approach" => &mut pico.method,
                _ => &mut pico.other,
            };
            slot.push(concept.label.as_str());
        }
        pico
    }

    fn classified(&self) -> usize {
        self.population.len()
        + self.intervention.len()
        + self.comparison.len()
        + self.outcome.len()
        + self.context.len()
        + self.method.len()
    }
}

fn joined(labels: &[&str], max: usize) -> String {
    labels.iter().take(max).copied().collect::<Vec<_>>().join(", ")
}

fn inclusion(framing: &ProblemFraming, pico: &Pico, questions: &ResearchQuestionSet, study_designs: bool) -> Vec<String> {
    let mut out = Vec::new();
    let pico_lines: [(&[&str], usize, &str); 5] = [(pico.population.as_slice(), 5, "Studies focusing on"),
                                                    (pico.intervention.as_slice(), 5, "Studies evaluating or implementing"),
                                                    (pico.outcome.as_slice(), 5, "Studies reporting outcomes related to"),
                                                    (pico.method.as_slice(), 4, "Studies using methods"),
                                                    (pico.context.as_slice(), 3, "Studies conducted in contexts")];
    for (labels, max, prefix) in pico_lines {
        if !labels.is_empty() {
            out.push(format!("{prefix}: {}", joined(labels, max)));
        }
    }

    let primary = questions.primary().count();
    if primary > 0 {
        out.push(format!("Studies addressing primary research questions (n={primary})"));
    }
    out.extend(framing.scope_in.iter().take(3).map(|s| format!("Studies within scope: {s}")));
    if study_designs {
        out.extend(["Peer-reviewed publications (journal articles, conference papers)".to_string(),
                    "Original research studies (empirical data)".to_string(),
                    "Full-text available for quality assessment".to_string()]);
    }
    out.push("Published in English (or specify other languages as needed)".into());
    out.push("Scholarly publications (excludes preprints unless from reputable archives)".into());
    out
}

fn exclusion(framing: &ProblemFraming, pico: &Pico, study_designs: bool) -> Vec<String> {
    let mut out = vec!["Non-scholarly sources (blogs, forums, social media, press releases)".to_string(),
                       "Opinion pieces, editorials, and commentaries without empirical data".to_string(),
                       "Books, book chapters, and theses (unless specifically relevant)".to_string()];
    out.extend(framing.scope_out.iter().take(5).map(|s| format!("Studies outside scope: {s}")));
    if study_designs {
        out.extend(["Studies without clear methodology".to_string(),
                    "Studies with insufficient detail to assess quality".to_string(),
                    "Duplicate publications (same study, different venues)".to_string()]);
    }
    if !pico.population.is_empty() {
        out.push("Studies with populations not matching inclusion criteria".into());
    }
    if !pico.intervention.is_empty() {
        out.push("Studies not evaluating specified interventions or methods".into());
    }
    out.extend(["Studies not available in full text".to_string(),
                "Retracted publications".to_string(),
                "Studies with major methodological flaws (to be determined during quality assessment)".to_string()]);
    out.push("Studies not addressing the research questions despite keyword matches".into());
    out
}

/// Ajusta los criterios según la complejidad de las consultas: si al menos
/// la mitad son amplias se añade una exclusión; si al menos la mitad son
/// estrechas, una inclusión de especificidad.
fn refine(inclusion: &mut Vec<String>, exclusion: &mut Vec<String>, plan: &DatabaseQueryPlan) {
    let total = plan.queries.len();
    if total == 0 {
        return;
    }
    let levels: Vec<_> = plan.queries.iter().filter_map(|q| q.complexity.as_ref()).map(|c| c.complexity_level).collect();
    let broad = levels.iter().filter(|l| l.is_broad()).count();
    let narrow = levels.iter().filter(|l| l.is_narrow()).count();
    if broad * 2 >= total {
        exclusion.push(NARROWING_EXCLUSION.into());
    }
    if narrow * 2 >= total {
        inclusion.push(SPECIFICITY_INCLUSION.into());
    }
}

impl StageHandler for ScreeningCriteriaStage {
    fn run(&self, ctx: &StageContext) -> Result<StageOutput, GenerationError> {
        let framing: ProblemFraming = ctx.require()?;
        let model: ConceptModel = ctx.require()?;
        let questions: ResearchQuestionSet = ctx.require()?;
        let refine_with_queries = ctx.param_bool(REFINE_WITH_QUERIES_PARAM).unwrap_or(true);
        let study_designs = ctx.param_bool(INCLUDE_STUDY_DESIGNS_PARAM).unwrap_or(true);

        let pico = Pico::extract(&model);
        let mut inc = inclusion(&framing, &pico, &questions, study_designs);
        let mut exc = exclusion(&framing, &pico, study_designs);
        let refined = match ctx.optional::<DatabaseQueryPlan>()? {
            Some(plan) if refine_with_queries => {
                refine(&mut inc, &mut exc, &plan);
                true
            }
            _ => false,
        };
        info!("screening criteria for '{}': {} PICO concepts, {} inclusion, {} exclusion",
              ctx.project_id,
              pico.classified(),
              inc.len(),
              exc.len());

        let mut out = StageOutput::new().with_prompt(format!("Generated {} inclusion criteria from PICO elements", inc.len()))
                                        .with_prompt(format!("Generated {} exclusion criteria", exc.len()))
                                        .with_prompt("Review criteria and adjust for your specific domain.")
                                        .with_prompt("Consider adding a temporal range (e.g. published after 2020).")
                                        .with_prompt("Add language filters if needed (currently defaults to English).");
        if !pico.population.is_empty() {
            out = out.with_prompt(format!("Population: {}", joined(pico.population.as_slice(), 3)));
        }
        if !pico.intervention.is_empty() {
            out = out.with_prompt(format!("Intervention: {}", joined(pico.intervention.as_slice(), 3)));
        }

        let criteria = ScreeningCriteria { project_id: ctx.project_id.clone(),
                                           inclusion_criteria: inc,
                                           exclusion_criteria: exc };
        Ok(out.with_draft(&ctx.stage, &criteria)?
              .with_extra("mode", json!("deterministic_pico_extraction"))
              .with_extra("refined_with_queries", json!(refined))
              .with_extra("unclassified_concepts", json!(pico.other.len())))
    }
}
