//! Completion providers and the fallback gateway.
//!
//! - `completions`: primary chat-completions provider
//! - `gemini`: secondary generateContent provider
//! - `gateway`: primary-then-secondary orchestration
//! - `context`: primary API's context store endpoints
//! - `transport`: shared reqwest helpers

use async_trait::async_trait;

use crate::error::{ApiError, ConfigError};
use crate::types::ChatResponse;

mod completions;
mod context;
mod gateway;
mod gemini;
mod transport;

pub use completions::ChatCompletionsProvider;
pub use context::ContextClient;
pub use gateway::{AiGateway, ConfigStatus, ConnectionProbe};
pub use gemini::GeminiProvider;
pub use transport::build_http_client;

/// Prompt used by connectivity probes that need a real completion.
pub const PROBE_PROMPT: &str = "Test connection";

/// One text-generation backend.
///
/// Tests substitute scripted implementations; production uses
/// [`ChatCompletionsProvider`] and [`GeminiProvider`].
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short label used in events.
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Fails with the missing variable names when the provider can't be called.
    fn check_config(&self) -> Result<(), ConfigError>;

    /// Generate text for `prompt`, normalized to the chat-completions shape.
    async fn complete(&self, prompt: &str, context: Option<&str>)
        -> Result<ChatResponse, ApiError>;

    /// Cheapest request that proves the provider is reachable and accepts
    /// our credentials.
    async fn probe(&self) -> Result<(), ApiError> {
        self.complete(PROBE_PROMPT, None).await.map(|_| ())
    }
}
