//! slr-query: motor de síntesis de consultas booleanas multi-dialecto.
//!
//! Traduce un `QueryPlan` abstracto (bloques de conceptos AND, sinónimos OR)
//! a cadenas exactas para cada motor bibliográfico soportado. La traducción es
//! pura y determinista: mismo `(dialecto, plan)` produce siempre la misma
//! cadena, byte a byte.

pub mod builder;
pub mod complexity;
pub mod dialects;
pub mod error;
pub mod model;

pub use builder::{get_builder, supported_dialects, SyntaxBuilder};
pub use complexity::{analyze, ComplexityLevel, ComplexityReport};
pub use dialects::Dialect;
pub use error::QueryError;
pub use model::{ConceptBlock, FieldTag, QueryPlan, SearchTerm};
