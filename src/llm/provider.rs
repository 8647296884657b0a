//! Completion adapter trait
//!
//! Abstracts the model provider so that the runner never talks to a transport directly.
//! An adapter instance is passed to the runner at construction; there is no global
//! default client.

use std::pin::Pin;

use anyhow::Result;
use futures::stream::Stream;

use super::types::{CompletionDelta, CompletionRequest, RawCompletion};

/// Lazy, single-pass sequence of streamed deltas
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<CompletionDelta>> + Send>>;

/// Trait for completion backends used by the runners.
///
/// Timeouts, authentication, and network retries are the adapter's responsibility.
#[async_trait::async_trait]
pub trait CompletionAdapter: Send + Sync {
    /// Request a complete response.
    async fn complete(&self, request: CompletionRequest) -> Result<RawCompletion>;

    /// Request a streamed response.
    ///
    /// Each item is one partial delta; consuming the stream is a suspension point per
    /// chunk. Dropping it abandons the completion.
    async fn stream(&self, request: CompletionRequest) -> Result<DeltaStream>;

    /// Get the provider name (e.g., "openai", "groq").
    fn provider_name(&self) -> &str;
}
