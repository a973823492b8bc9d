//! Injected model-call capability.
//!
//! The pipeline is agnostic to the concrete model or provider behind it; it
//! only requires a single `invoke` operation. Tests substitute a
//! deterministic fake to assert call counts and ordering.

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single model call, before retry handling.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("invalid response: {0}")]
    Json(String),
}

/// Synchronous (from the caller's perspective) model-call capability.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Render the prompt against the model and return its text output.
    async fn invoke(&self, prompt: &str) -> Result<String, InvokeError>;
}
