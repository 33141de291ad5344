mod chain;
mod openai;
pub mod prompt;
pub mod schema;
mod unavailable;

use crate::util::is_http_retryable;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use chain::{Strategy, StrategyChain};
pub use openai::OpenAiClient;
pub use unavailable::UnavailableClient;

/// The LLM-backed judgments the evaluator asks for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum JudgeTask {
    SemanticSimilarity,
    KeywordExtraction,
    ContextCompleteness,
}

impl JudgeTask {
    pub const ALL: [JudgeTask; 3] = [
        JudgeTask::SemanticSimilarity,
        JudgeTask::KeywordExtraction,
        JudgeTask::ContextCompleteness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SemanticSimilarity => "semantic_similarity",
            Self::KeywordExtraction => "keyword_extraction",
            Self::ContextCompleteness => "context_completeness",
        }
    }
}

impl fmt::Display for JudgeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    pub task: JudgeTask,
    pub system: String,
    pub user: String,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("llm client is not configured")]
    NotConfigured,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("llm call timed out after {0:?}")]
    Timeout(Duration),
    #[error("llm response did not match schema: {0}")]
    Schema(String),
    #[error("llm returned an empty response")]
    EmptyResponse,
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotConfigured => false,
            Self::Api { status, .. } => is_http_retryable(*status),
            Self::Network(_) | Self::Timeout(_) | Self::Schema(_) | Self::EmptyResponse => true,
        }
    }
}

/// A chat-style language model that answers one prompt with raw text.
pub trait LlmClient: Send + Sync {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, LlmError>>;
}

impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, LlmError>> {
        (**self).complete(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability_follows_error_kind() {
        assert!(!LlmError::NotConfigured.is_retryable());
        assert!(LlmError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(LlmError::Schema("missing score".into()).is_retryable());
        assert!(LlmError::Api { status: 503, body: String::new() }.is_retryable());
        assert!(!LlmError::Api { status: 401, body: String::new() }.is_retryable());
    }
}
