use crate::config::LlmConfig;
use crate::llm::{CompletionRequest, LlmClient, LlmError, OpenAiClient};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

const LOG_TARGET: &str = "llm::chain";

/// One way of reaching a model, tried in the order it was registered.
#[derive(Clone)]
pub struct Strategy {
    pub label: String,
    pub client: Arc<dyn LlmClient>,
}

impl Strategy {
    pub fn new(label: impl Into<String>, client: impl LlmClient + 'static) -> Self {
        Self {
            label: label.into(),
            client: Arc::new(client),
        }
    }
}

/// Ordered list of strategies behind a single [`LlmClient`].
///
/// Each call walks the list until one strategy answers; the error from the
/// last strategy is returned when all of them fail.
#[derive(Clone, Default)]
pub struct StrategyChain {
    strategies: Vec<Strategy>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Primary model in JSON mode, the same model in plain mode, then the
    /// fallback model if one is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let primary = OpenAiClient::new(config)?;
        let plain = primary.clone().with_json_mode(false);
        let mut chain = Self::new()
            .with_strategy(Strategy::new(primary.label(), primary.clone()))
            .with_strategy(Strategy::new(plain.label(), plain));
        if let Some(model) = &config.fallback_model {
            let fallback = primary.with_model(model.clone());
            chain = chain.with_strategy(Strategy::new(fallback.label(), fallback));
        }
        Ok(chain)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl LlmClient for StrategyChain {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, LlmError>> {
        async move {
            let mut last_error = LlmError::NotConfigured;
            for strategy in &self.strategies {
                match strategy.client.complete(request.clone()).await {
                    Ok(text) => return Ok(text),
                    Err(e) => {
                        tracing::warn!(
                            target: LOG_TARGET,
                            strategy = %strategy.label,
                            task = %request.task,
                            "strategy failed, trying next: {e}"
                        );
                        last_error = e;
                    }
                }
            }
            Err(last_error)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL};
    use crate::llm::JudgeTask;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Failing(Arc<AtomicU32>);

    impl LlmClient for Failing {
        fn complete(&self, _request: CompletionRequest) -> BoxFuture<'_, Result<String, LlmError>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            async {
                Err(LlmError::Api {
                    status: 400,
                    body: "response_format unsupported".into(),
                })
            }
            .boxed()
        }
    }

    struct Answering(&'static str);

    impl LlmClient for Answering {
        fn complete(&self, _request: CompletionRequest) -> BoxFuture<'_, Result<String, LlmError>> {
            let text = self.0.to_owned();
            async move { Ok(text) }.boxed()
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            task: JudgeTask::SemanticSimilarity,
            system: "sys".into(),
            user: "user".into(),
        }
    }

    #[tokio::test]
    async fn falls_through_to_next_strategy() {
        let calls = Arc::new(AtomicU32::new(0));
        let chain = StrategyChain::new()
            .with_strategy(Strategy::new("json", Failing(calls.clone())))
            .with_strategy(Strategy::new("plain", Answering("ok")));
        assert_eq!(chain.complete(request()).await.expect("answer"), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let chain = StrategyChain::new()
            .with_strategy(Strategy::new("primary", Answering("first")))
            .with_strategy(Strategy::new("never", Failing(calls.clone())));
        assert_eq!(chain.complete(request()).await.expect("answer"), "first");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn returns_last_error_when_all_fail() {
        let calls = Arc::new(AtomicU32::new(0));
        let chain = StrategyChain::new()
            .with_strategy(Strategy::new("a", Failing(calls.clone())))
            .with_strategy(Strategy::new("b", Failing(calls.clone())));
        let err = chain.complete(request()).await.expect_err("all fail");
        assert!(matches!(err, LlmError::Api { status: 400, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_chain_is_not_configured() {
        let err = StrategyChain::new().complete(request()).await.expect_err("empty");
        assert!(matches!(err, LlmError::NotConfigured));
    }

    #[test]
    fn from_config_orders_strategies() {
        let config = LlmConfig::new(
            DEFAULT_LLM_BASE_URL,
            DEFAULT_LLM_MODEL.to_owned(),
            Some("backup-model".to_owned()),
            None,
        )
        .expect("valid");
        let chain = StrategyChain::from_config(&config).expect("chain");
        assert_eq!(
            chain.labels(),
            ["gpt-4o-mini/json", "gpt-4o-mini/plain", "backup-model/json"]
        );
    }
}
