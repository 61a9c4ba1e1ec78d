use thiserror::Error;

/// Top-level error type for the Reframe backend.
///
/// Every request-boundary failure maps to exactly one of these kinds;
/// the gateway turns them into `{success: false, message}` JSON bodies.
#[derive(Debug, Error)]
pub enum ReframeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("could not parse model output: {0}")]
    Parse(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("distortion catalog error: {0}")]
    Catalog(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
