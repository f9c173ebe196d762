//! Modelo intermedio de una estrategia de búsqueda, independiente del motor
//! bibliográfico destino.
//!
//! - `QueryPlan`: lista ordenada de bloques (AND entre bloques).
//! - `ConceptBlock`: sinónimos de un concepto (OR dentro del bloque) más
//!   términos excluidos opcionales.
//! - `SearchTerm`: unidad atómica con etiqueta de campo.
//!
//! El orden importa en ambos niveles: determina el orden de agrupación en la
//! salida renderizada.

use serde::{Deserialize, Serialize};

/// Campo sobre el que se busca un término.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldTag {
    /// Título / resumen / palabras clave.
    #[default]
    #[serde(rename = "keyword")]
    Keyword,
    /// Vocabulario controlado (MeSH, Emtree).
    #[serde(rename = "controlled")]
    ControlledVocab,
    #[serde(rename = "all")]
    AllFields,
}

/// Término de búsqueda.
///
/// `phrase` fuerza la búsqueda exacta aunque el texto sea un único token; un
/// texto con varias palabras se trata como frase siempre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub text: String,
    #[serde(default)]
    pub field_tag: FieldTag,
    #[serde(default)]
    pub phrase: bool,
}

impl SearchTerm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(),
               field_tag: FieldTag::Keyword,
               phrase: false }
    }

    /// Término marcado explícitamente como frase exacta.
    pub fn phrase(text: impl Into<String>) -> Self {
        Self { phrase: true, ..Self::new(text) }
    }

    pub fn with_tag(mut self, tag: FieldTag) -> Self {
        self.field_tag = tag;
        self
    }

    /// Texto normalizado: sin espacios en los extremos y con espacios internos
    /// colapsados a uno solo.
    pub fn normalized_text(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn is_multi_word(&self) -> bool {
        self.text.split_whitespace().nth(1).is_some()
    }

    pub fn is_phrase(&self) -> bool {
        self.phrase || self.is_multi_word()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<&str> for SearchTerm {
    fn from(text: &str) -> Self {
        SearchTerm::new(text)
    }
}

impl From<String> for SearchTerm {
    fn from(text: String) -> Self {
        SearchTerm::new(text)
    }
}

/// Grupo de términos sinónimos (OR interno).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptBlock {
    pub label: String,
    #[serde(default)]
    pub terms: Vec<SearchTerm>,
    /// Términos que deben excluirse del resultado (NOT).
    #[serde(default)]
    pub excluded: Vec<SearchTerm>,
}

impl ConceptBlock {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(),
               terms: Vec::new(),
               excluded: Vec::new() }
    }

    pub fn add_term(&mut self, text: impl Into<String>, tag: FieldTag) {
        self.terms.push(SearchTerm::new(text).with_tag(tag));
    }

    pub fn add_excluded_term(&mut self, text: impl Into<String>, tag: FieldTag) {
        self.excluded.push(SearchTerm::new(text).with_tag(tag));
    }

    /// Variante encadenable de `add_term` con `FieldTag::Keyword`.
    pub fn term(mut self, term: impl Into<SearchTerm>) -> Self {
        self.terms.push(term.into());
        self
    }

    pub fn exclude(mut self, term: impl Into<SearchTerm>) -> Self {
        self.excluded.push(term.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Estrategia completa: bloques combinados con AND en el orden dado.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub blocks: Vec<ConceptBlock>,
}

impl QueryPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(mut self, block: ConceptBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn total_terms(&self) -> usize {
        self.blocks.iter().map(|b| b.terms.len()).sum()
    }

    pub fn excluded_terms(&self) -> usize {
        self.blocks.iter().map(|b| b.excluded.len()).sum()
    }
}
