//! End-to-end analysis: timeline, metrics, evaluation, coaching.

use crate::coaching::{self, EnhancedCoachingFeedback};
use crate::config::{AnalysisConfig, MetricsConfig};
use crate::evaluation::{blend, EvaluationMethods, EvaluationScores, Evaluator, Verdict};
use crate::llm::{JudgeTask, LlmClient};
use crate::metrics::{self, SpeechMetrics};
use crate::timeline::AnalysisRequest;
use serde::Serialize;

const LOG_TARGET: &str = "pipeline";

/// The flattened response: every metric and coaching field at the top level,
/// plus the scores and the five method details.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAnalysisResponse {
    #[serde(flatten)]
    pub metrics: SpeechMetrics,
    #[serde(flatten)]
    pub feedback: EnhancedCoachingFeedback,
    pub question: String,
    pub evaluation_scores: EvaluationScores,
    pub evaluation_methods: EvaluationMethods,
    pub overall_score: u32,
    pub overall_verdict: Verdict,
    pub speech_energy_score: u32,
    /// Fillers per minute.
    pub filler_frequency: f64,
    pub is_fallback: bool,
    pub degraded_methods: Vec<JudgeTask>,
}

pub struct SpeechAnalyzer<C> {
    evaluator: Evaluator<C>,
    metrics_config: MetricsConfig,
}

impl<C: LlmClient> SpeechAnalyzer<C> {
    pub fn new(client: C, config: AnalysisConfig) -> Self {
        Self {
            evaluator: Evaluator::new(client, config.evaluation),
            metrics_config: config.metrics,
        }
    }

    /// Objective metrics only; never touches the LLM.
    pub fn metrics(&self, request: &AnalysisRequest) -> SpeechMetrics {
        metrics::aggregate(&request.timeline(), &self.metrics_config)
    }

    /// Runs the whole analysis. Upstream failures degrade the response
    /// instead of failing it.
    pub async fn analyze(&self, request: &AnalysisRequest) -> SpeechAnalysisResponse {
        let metrics = self.metrics(request);
        let category = request.category();
        tracing::info!(
            target: LOG_TARGET,
            words = metrics.word_count,
            duration_sec = metrics.duration_sec,
            category = category.as_str(),
            "analysing answer"
        );

        let evaluation = self
            .evaluator
            .evaluate(&metrics.transcript, &metrics, &request.question, category)
            .await;
        let feedback = coaching::compose(&evaluation, &metrics);

        SpeechAnalysisResponse {
            question: request.question.clone(),
            evaluation_scores: evaluation.scores,
            evaluation_methods: evaluation.methods,
            overall_score: evaluation.overall_score,
            overall_verdict: evaluation.overall_verdict,
            speech_energy_score: blend::speech_energy_score(&metrics, request.client_energy),
            filler_frequency: metrics.fillers_per_minute(),
            is_fallback: evaluation.is_fallback,
            degraded_methods: evaluation.degraded_methods,
            feedback,
            metrics,
        }
    }
}
