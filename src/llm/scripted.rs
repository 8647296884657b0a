//! Scripted completion adapter
//!
//! Replays a fixed queue of completions and records every request it receives.
//! Used by the crate's tests and handy for offline demos of agent graphs.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use futures::StreamExt;

use super::provider::{CompletionAdapter, DeltaStream};
use super::types::{CompletionDelta, CompletionRequest, RawCompletion};

/// One scripted adapter response
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Answer a `complete` call
    Complete(RawCompletion),
    /// Answer a `stream` call with these deltas
    Stream(Vec<CompletionDelta>),
    /// Fail the next call of either kind
    Fail(String),
    /// Answer a `stream` call with these deltas, then fail the stream itself
    StreamThenFail(Vec<CompletionDelta>, String),
}

/// Adapter that replays [`ScriptStep`]s in order
#[derive(Debug, Default)]
pub struct ScriptedAdapter {
    steps: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedAdapter {
    /// Create an adapter with a script
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create an adapter that answers `complete` calls with these completions
    pub fn from_completions(completions: Vec<RawCompletion>) -> Self {
        Self::new(completions.into_iter().map(ScriptStep::Complete).collect())
    }

    /// Queue another step
    pub fn push(&self, step: ScriptStep) {
        self.steps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(step);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.steps.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn next_step(&self, request: CompletionRequest) -> Result<ScriptStep> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
        self.steps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| anyhow!("Scripted adapter has no more steps"))
    }
}

#[async_trait::async_trait]
impl CompletionAdapter for ScriptedAdapter {
    async fn complete(&self, request: CompletionRequest) -> Result<RawCompletion> {
        match self.next_step(request)? {
            ScriptStep::Complete(raw) => Ok(raw),
            ScriptStep::Fail(message) => Err(anyhow!(message)),
            ScriptStep::Stream(_) | ScriptStep::StreamThenFail(..) => {
                Err(anyhow!("Scripted stream step used for complete()"))
            }
        }
    }

    async fn stream(&self, request: CompletionRequest) -> Result<DeltaStream> {
        match self.next_step(request)? {
            ScriptStep::Stream(deltas) => Ok(futures::stream::iter(deltas.into_iter().map(Ok)).boxed()),
            ScriptStep::StreamThenFail(deltas, message) => {
                let items = deltas
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(anyhow!(message))));
                Ok(futures::stream::iter(items).boxed())
            }
            ScriptStep::Fail(message) => Err(anyhow!(message)),
            ScriptStep::Complete(_) => Err(anyhow!("Scripted complete step used for stream()")),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test-model".into(),
            messages: vec![],
            system: String::new(),
            tools: vec![],
            tool_choice: None,
            params: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_replays_in_order_and_records() {
        let adapter = ScriptedAdapter::new(vec![
            ScriptStep::Complete(RawCompletion::Reply("one".into())),
            ScriptStep::Fail("boom".into()),
            ScriptStep::Stream(vec![CompletionDelta::text("a"), CompletionDelta::text("b")]),
        ]);

        assert_eq!(
            adapter.complete(request()).await.unwrap(),
            RawCompletion::Reply("one".into())
        );
        assert!(adapter.complete(request()).await.is_err());

        let deltas: Vec<_> = adapter.stream(request()).await.unwrap().collect().await;
        assert_eq!(deltas.len(), 2);
        assert_eq!(adapter.request_count(), 3);
        assert_eq!(adapter.remaining(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_script_errors() {
        let adapter = ScriptedAdapter::default();
        let err = adapter.complete(request()).await.unwrap_err();
        assert!(err.to_string().contains("no more steps"));
    }
}
