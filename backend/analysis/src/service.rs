//! The analysis orchestrator.
//!
//! One request runs the fixed sequence: validate, optionally load the
//! retrieval context, compose the prompt, invoke the model, parse the
//! output, assemble the response. Any step failure ends the request;
//! there are no retries and no caching of model output.

use std::sync::Arc;

use tracing::{debug, info};

use reframe_core::{AnalysisResult, CompletionRequest, LlmProvider, ReframeError};
use reframe_storage::EntryStore;

use crate::catalog::DistortionCatalog;
use crate::parser::{parse_context_analysis, parse_simple_analysis};
use crate::prompts::{context_analysis_prompt, simple_analysis_prompt};

/// Model invocation knobs, taken from the runtime config.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Assembled response for one analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    /// The corpus text fed into the prompt; `None` in simple mode.
    pub source_content: Option<String>,
}

/// Coordinates catalog, retrieval, prompt, model, and parser for one call.
pub struct AnalysisService {
    catalog: Arc<DistortionCatalog>,
    provider: Arc<dyn LlmProvider>,
    entry_store: Arc<EntryStore>,
    options: AnalysisOptions,
}

impl AnalysisService {
    pub fn new(
        catalog: Arc<DistortionCatalog>,
        provider: Arc<dyn LlmProvider>,
        entry_store: Arc<EntryStore>,
        options: AnalysisOptions,
    ) -> Self {
        Self {
            catalog,
            provider,
            entry_store,
            options,
        }
    }

    /// Analyse a user's question for cognitive distortions.
    ///
    /// With `use_context` the full journal corpus is read first, threaded
    /// into the prompt, and echoed back as `source_content`.
    pub async fn analyse(
        &self,
        question: &str,
        use_context: bool,
    ) -> Result<AnalysisOutcome, ReframeError> {
        if question.trim().is_empty() {
            return Err(ReframeError::Validation("Question cannot be empty".to_string()));
        }

        let context = if use_context {
            let corpus = self.entry_store.read_corpus().await?;
            debug!(corpus_len = corpus.len(), "Loaded retrieval context");
            Some(corpus)
        } else {
            None
        };

        let prompt = match &context {
            Some(corpus) => context_analysis_prompt(&self.catalog, question, corpus),
            None => simple_analysis_prompt(&self.catalog, question),
        };
        debug!(prompt_len = prompt.len(), use_context, "Prompt composed");

        let request = CompletionRequest {
            model: self.options.model.clone(),
            prompt,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };
        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| ReframeError::ModelUnavailable(e.to_string()))?;

        info!(
            provider = self.provider.name(),
            model = %response.model,
            latency_ms = response.latency_ms,
            use_context,
            "Model call complete"
        );

        let result = match &context {
            Some(_) => parse_context_analysis(&response.content, &self.catalog)?,
            None => parse_simple_analysis(&response.content, &self.catalog)?,
        };

        Ok(AnalysisOutcome {
            result,
            source_content: context,
        })
    }
}
