pub mod error;
pub mod traits;
pub mod types;

pub use error::ReframeError;
pub use traits::{CompletionRequest, CompletionResponse, LlmProvider};
pub use types::{AnalysisResult, DistortionDefinition, IdentifiedDistortion, JournalEntry};
