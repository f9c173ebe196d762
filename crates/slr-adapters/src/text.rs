//! Utilidades de texto para la generación heurística.

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_TITLE_CHARS: usize = 80;
const MAX_KEYWORDS: usize = 10;
const UNTITLED: &str = "Untitled Project";

// Palabra alfanumérica de al menos 5 caracteres que empieza por letra.
static KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z][a-z0-9_-]{4,}").expect("keyword pattern is a valid regex"));

/// Capitaliza cada tramo de letras y pasa el resto a minúsculas.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Título a partir de la primera frase, truncado a 80 caracteres.
pub fn title_from_text(text: &str) -> String {
    let first = text.trim().split(['.', '!', '?']).next().unwrap_or_default().trim();
    let title: String = title_case(first).chars().take(MAX_TITLE_CHARS).collect();
    let title = title.trim_end().to_string();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// Palabras clave únicas en orden de aparición (máximo 10).
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut out: Vec<String> = Vec::new();
    for m in KEYWORD.find_iter(&lowered) {
        let kw = m.as_str();
        if !out.iter().any(|k| k == kw) {
            out.push(kw.to_string());
            if out.len() == MAX_KEYWORDS {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_uses_first_sentence() {
        assert_eq!(title_from_text("large language models in radiology. More text here!"),
                   "Large Language Models In Radiology");
        assert_eq!(title_from_text("   "), "Untitled Project");
        assert_eq!(title_from_text(&"word ".repeat(40)).chars().count(), 79);
    }

    #[test]
    fn keywords_are_long_unique_and_capped() {
        let kws = extract_keywords("Hallucination in LLM outputs: hallucination detection and factuality metrics");
        assert_eq!(kws, vec!["hallucination", "outputs", "detection", "factuality", "metrics"]);

        let many: String = (0..20).map(|i| format!("keyword{i} ")).collect();
        assert_eq!(extract_keywords(&many).len(), 10);
    }

    #[test]
    fn title_case_restarts_after_non_letters() {
        assert_eq!(title_case("covid-19 vaccine uptake"), "Covid-19 Vaccine Uptake");
    }
}
