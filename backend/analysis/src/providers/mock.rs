use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;

use reframe_core::{CompletionRequest, CompletionResponse, LlmProvider};

/// A mock LLM provider that returns canned responses. Test-only seam.
pub struct MockProvider {
    fixed_response: Option<String>,
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            fixed_response: None,
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Make every call fail, simulating an unreachable endpoint.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    /// Number of `complete` calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            bail!("{message}");
        }
        Ok(CompletionResponse {
            content: self
                .fixed_response
                .clone()
                .unwrap_or_else(|| r#"{"cognitive_distortions_issue": []}"#.to_string()),
            model: request.model.clone(),
            latency_ms: 0,
        })
    }
}
