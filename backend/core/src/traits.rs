use anyhow::Result;
use async_trait::async_trait;

/// Trait for LLM providers used by the analysis service.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "ollama", "mock").
    fn name(&self) -> &str;

    /// Send a completion request and return the raw response text.
    ///
    /// Implementations must not retry: a failed call is reported once.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

/// Request to an LLM provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub latency_ms: u64,
}
