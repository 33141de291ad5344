use crate::llm::{CompletionRequest, LlmClient, LlmError};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Stand-in used when no model is configured; every call fails immediately,
/// which routes each judgment onto its fallback path.
#[derive(Clone, Debug, Default)]
pub struct UnavailableClient;

impl UnavailableClient {
    pub fn new() -> Self {
        Self
    }
}

impl LlmClient for UnavailableClient {
    fn complete(&self, _request: CompletionRequest) -> BoxFuture<'_, Result<String, LlmError>> {
        async { Err(LlmError::NotConfigured) }.boxed()
    }
}
