use crate::util::RetryConfig;
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use url::Url;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_WINDOW_SIZE_SEC: f64 = 15.0;
pub const DEFAULT_PACE_TOLERANCE: f64 = 0.25;
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 12_000;
pub const DEFAULT_OVERALL_BUDGET_MS: u64 = 40_000;
pub const ENV_LLM_API_KEY: &str = "SPEECH_COACH_LLM_API_KEY";
pub const ENV_LLM_BASE_URL: &str = "SPEECH_COACH_LLM_BASE_URL";
pub const ENV_LLM_MODEL: &str = "SPEECH_COACH_LLM_MODEL";
pub const ENV_LLM_FALLBACK_MODEL: &str = "SPEECH_COACH_LLM_FALLBACK_MODEL";

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

/// Tuning for the hesitation detector's adaptive threshold.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct HesitationConfig {
    /// Threshold used when there are too few gaps to estimate a distribution.
    pub fixed_threshold_sec: f64,
    pub floor_sec: f64,
    pub ceiling_sec: f64,
    pub stddev_multiplier: f64,
    pub min_gap_samples: usize,
}

impl Default for HesitationConfig {
    fn default() -> Self {
        Self {
            fixed_threshold_sec: 1.5,
            floor_sec: 1.0,
            ceiling_sec: 2.5,
            stddev_multiplier: 2.0,
            min_gap_samples: 8,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub window_size_sec: f64,
    pub pace_tolerance: f64,
    pub hesitation: HesitationConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window_size_sec: DEFAULT_WINDOW_SIZE_SEC,
            pace_tolerance: DEFAULT_PACE_TOLERANCE,
            hesitation: HesitationConfig::default(),
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.window_size_sec.is_finite() || self.window_size_sec <= 0.0 {
            return Err(ConfigError::InvalidWindowSize(self.window_size_sec));
        }
        if !(0.0..1.0).contains(&self.pace_tolerance) {
            return Err(ConfigError::InvalidPaceTolerance(self.pace_tolerance));
        }
        let h = &self.hesitation;
        if h.floor_sec <= 0.0 || h.ceiling_sec < h.floor_sec || h.fixed_threshold_sec <= 0.0 {
            return Err(ConfigError::InvalidHesitationBounds {
                floor: h.floor_sec,
                ceiling: h.ceiling_sec,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct EvaluationConfig {
    /// Cap on a single outbound LLM call.
    pub call_timeout: Duration,
    /// Wall-clock budget for the whole orchestration; past it everything falls back.
    pub overall_budget: Duration,
    pub retry: RetryConfig,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
            overall_budget: Duration::from_millis(DEFAULT_OVERALL_BUDGET_MS),
            retry: RetryConfig {
                max_attempts: 2,
                initial_delay: Duration::from_millis(500),
                backoff_multiplier: 2.0,
                max_delay: Duration::from_secs(4),
                jitter: 0.1,
            },
        }
    }
}

impl EvaluationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.call_timeout.is_zero() || self.overall_budget.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnalysisConfig {
    pub metrics: MetricsConfig,
    pub evaluation: EvaluationConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.metrics.validate()?;
        self.evaluation.validate()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LlmConfig {
    pub base_url: Url,
    pub model: String,
    pub fallback_model: Option<String>,
    pub api_key: Option<ApiKey>,
    pub temperature: f32,
}

impl LlmConfig {
    pub fn new(
        base_url: &str,
        model: String,
        fallback_model: Option<String>,
        api_key: Option<ApiKey>,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url.trim())?;
        if model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        Ok(Self {
            base_url,
            model,
            fallback_model: fallback_model.filter(|m| !m.trim().is_empty()),
            api_key,
            temperature: DEFAULT_LLM_TEMPERATURE,
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("model name must not be empty")]
    EmptyModel,
    #[error("invalid llm base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("window size must be a positive number of seconds, got {0}")]
    InvalidWindowSize(f64),
    #[error("pace tolerance must be in [0, 1), got {0}")]
    InvalidPaceTolerance(f64),
    #[error("hesitation bounds invalid: floor {floor}s, ceiling {ceiling}s")]
    InvalidHesitationBounds { floor: f64, ceiling: f64 },
    #[error("timeouts must be > 0")]
    ZeroTimeout,
    #[error("retry policy needs at least one attempt")]
    ZeroAttempts,
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

pub fn resolve_optional_string(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Option<String> {
    match cli_value {
        Some(v) => Some(v),
        None => env.var(env_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_LLM_API_KEY, "env-key");
        let key = resolve_api_key(Some("cli-key".to_owned()), ENV_LLM_API_KEY, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "cli-key");
    }

    #[test]
    fn api_key_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_LLM_API_KEY, "env-key");
        let key = resolve_api_key(None, ENV_LLM_API_KEY, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "env-key");
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let env = MapEnv::default().with_var(ENV_LLM_API_KEY, "   ");
        assert_eq!(
            resolve_api_key(None, ENV_LLM_API_KEY, &env),
            Err(ConfigError::EmptyApiKey)
        );
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret").expect("valid");
        assert_eq!(format!("{key:?}"), "ApiKey(**redacted**)");
    }

    #[test]
    fn resolve_string_with_default_prefers_cli_then_env_then_default() {
        let env = MapEnv::default().with_var(ENV_LLM_MODEL, "env");
        assert_eq!(
            resolve_string_with_default(Some("cli".to_owned()), ENV_LLM_MODEL, &env, "def"),
            "cli"
        );
        assert_eq!(
            resolve_string_with_default(None, ENV_LLM_MODEL, &env, "def"),
            "env"
        );
        assert_eq!(
            resolve_string_with_default(None, ENV_LLM_MODEL, &MapEnv::default(), "def"),
            "def"
        );
    }

    #[test]
    fn llm_config_rejects_bad_url_and_drops_blank_fallback() {
        assert!(matches!(
            LlmConfig::new("not a url", DEFAULT_LLM_MODEL.to_owned(), None, None),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        let cfg = LlmConfig::new(
            DEFAULT_LLM_BASE_URL,
            DEFAULT_LLM_MODEL.to_owned(),
            Some(" ".to_owned()),
            None,
        )
        .expect("valid");
        assert_eq!(cfg.fallback_model, None);
    }

    #[test]
    fn default_analysis_config_is_valid() {
        assert_eq!(AnalysisConfig::default().validate(), Ok(()));
    }

    #[test]
    fn metrics_config_rejects_nonpositive_window() {
        let cfg = MetricsConfig {
            window_size_sec: 0.0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidWindowSize(0.0)));
    }
}
