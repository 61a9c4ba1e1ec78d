//! `reframe-analysis` — cognitive-distortion analysis pipeline.
//!
//! Catalog, prompt composition, Ollama provider, defensive response
//! parsing, and the orchestrating service.

pub mod catalog;
pub mod parser;
pub mod prompts;
pub mod providers;
pub mod service;

pub use catalog::DistortionCatalog;
pub use parser::{NO_COMPARISON_FALLBACK, parse_context_analysis, parse_simple_analysis};
pub use providers::{MockProvider, OllamaProvider};
pub use service::{AnalysisOptions, AnalysisOutcome, AnalysisService};
