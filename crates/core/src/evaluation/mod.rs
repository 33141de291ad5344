//! Blends LLM judgments and pattern analyses into bounded interview scores.

pub mod blend;
mod confidence;
mod keywords;
mod sentiment;


use crate::coaching::ClaritySubMetrics;
use crate::config::EvaluationConfig;
use crate::llm::prompt::{self, PromptContext};
use crate::llm::schema::{self, ContextJudgment, KeywordExtraction, SemanticJudgment};
use crate::llm::{CompletionRequest, JudgeTask, LlmClient, LlmError};
use crate::metrics::SpeechMetrics;
use crate::timeline::QuestionCategory;
use crate::util::retry_with_backoff;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

pub use confidence::detect_confidence;
pub use keywords::{keyword_recall, static_keyword_recall, static_keywords};
pub use sentiment::analyze_sentiment;

const LOG_TARGET: &str = "evaluation";
const NEUTRAL_SCORE: u32 = 50;

/// Where a method's result came from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MethodSource {
    Llm,
    Pattern,
    Heuristic,
    Fallback,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationScores {
    pub technical_accuracy: u32,
    pub behavioural_confidence: u32,
    pub communication_clarity: u32,
    /// Inverted: higher means fewer fillers.
    pub filler_word_frequency: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SemanticSimilarity {
    pub score: u32,
    pub explanation: String,
    pub ideal_answer_summary: String,
    pub source: MethodSource,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecall {
    pub score: u32,
    pub expected_keywords: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub source: MethodSource,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextCompleteness {
    pub score: u32,
    pub expected_aspects: Vec<String>,
    pub covered_aspects: Vec<String>,
    pub missing_aspects: Vec<String>,
    pub source: MethodSource,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceDetection {
    pub score: u32,
    pub assertive_patterns: Vec<String>,
    pub hedging_patterns: Vec<String>,
    pub passive_patterns: Vec<String>,
    pub assertive_count: usize,
    pub hedging_count: usize,
    pub passive_count: usize,
    pub source: MethodSource,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Neutral,
    Negative,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentimentPolarity {
    pub polarity: Polarity,
    /// 0 = entirely negative, 50 = balanced or no indicators, 100 = entirely positive.
    pub score: u32,
    pub positive_indicators: Vec<String>,
    pub negative_indicators: Vec<String>,
    pub source: MethodSource,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMethods {
    pub semantic_similarity: SemanticSimilarity,
    pub keyword_recall: KeywordRecall,
    pub context_completeness: ContextCompleteness,
    pub confidence_detection: ConfidenceDetection,
    pub sentiment_polarity: SentimentPolarity,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    Strong,
    Developing,
    #[serde(rename = "Needs Work")]
    NeedsWork,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Developing => "Developing",
            Self::NeedsWork => "Needs Work",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub scores: EvaluationScores,
    pub methods: EvaluationMethods,
    pub overall_score: u32,
    pub overall_verdict: Verdict,
    /// LLM-backed methods that had to fall back.
    pub degraded_methods: Vec<JudgeTask>,
    /// Every LLM-backed method failed, or the overall budget ran out.
    pub is_fallback: bool,
}

fn semantic_fallback() -> SemanticSimilarity {
    SemanticSimilarity {
        score: NEUTRAL_SCORE,
        explanation: "Semantic comparison was unavailable; a neutral score was assigned."
            .to_owned(),
        ideal_answer_summary: String::new(),
        source: MethodSource::Fallback,
    }
}

fn context_fallback() -> ContextCompleteness {
    ContextCompleteness {
        score: NEUTRAL_SCORE,
        expected_aspects: Vec::new(),
        covered_aspects: Vec::new(),
        missing_aspects: Vec::new(),
        source: MethodSource::Fallback,
    }
}

fn semantic_from(judgment: SemanticJudgment) -> SemanticSimilarity {
    SemanticSimilarity {
        score: blend::to_score(judgment.score),
        explanation: judgment.explanation,
        ideal_answer_summary: judgment.ideal_answer_summary,
        source: MethodSource::Llm,
    }
}

fn context_from(judgment: ContextJudgment) -> ContextCompleteness {
    let expected_aspects: Vec<String> =
        judgment.aspects.iter().map(|a| a.aspect.clone()).collect();
    let (covered, missing): (Vec<_>, Vec<_>) =
        judgment.aspects.into_iter().partition(|a| a.covered);
    let score =
        blend::to_score(covered.len() as f64 / expected_aspects.len().max(1) as f64 * 100.0);
    ContextCompleteness {
        score,
        expected_aspects,
        covered_aspects: covered.into_iter().map(|a| a.aspect).collect(),
        missing_aspects: missing.into_iter().map(|a| a.aspect).collect(),
        source: MethodSource::Llm,
    }
}

/// Runs the five analyses for one answer and blends them.
///
/// The evaluator holds no per-request state; one instance can serve
/// concurrent requests.
pub struct Evaluator<C> {
    client: C,
    config: EvaluationConfig,
}

impl<C: LlmClient> Evaluator<C> {
    pub fn new(client: C, config: EvaluationConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// One judgment with its own timeout and the shared retry policy; the
    /// reply must parse and validate or the attempt counts as failed.
    async fn judge<T>(&self, request: CompletionRequest) -> Result<T, LlmError>
    where
        T: DeserializeOwned + Validate,
    {
        let call_timeout = self.config.call_timeout;
        retry_with_backoff(
            &self.config.retry,
            || {
                let request = request.clone();
                async move {
                    let text = tokio::time::timeout(call_timeout, self.client.complete(request))
                        .await
                        .map_err(|_| LlmError::Timeout(call_timeout))??;
                    schema::parse_validated::<T>(&text)
                }
            },
            LlmError::is_retryable,
        )
        .await
    }

    pub async fn evaluate(
        &self,
        transcript: &str,
        metrics: &SpeechMetrics,
        question: &str,
        category: QuestionCategory,
    ) -> Evaluation {
        let started = Instant::now();
        let confidence_detection = detect_confidence(transcript);
        let sentiment_polarity = analyze_sentiment(transcript);

        if transcript.trim().is_empty() {
            return self.finish(
                EvaluationMethods {
                    semantic_similarity: SemanticSimilarity {
                        score: 0,
                        explanation: "No answer was given.".to_owned(),
                        ideal_answer_summary: String::new(),
                        source: MethodSource::Heuristic,
                    },
                    keyword_recall: static_keyword_recall(
                        transcript,
                        category,
                        MethodSource::Heuristic,
                    ),
                    context_completeness: ContextCompleteness {
                        score: 0,
                        source: MethodSource::Heuristic,
                        ..context_fallback()
                    },
                    confidence_detection,
                    sentiment_polarity,
                },
                metrics,
                Vec::new(),
                false,
            );
        }

        let ctx = PromptContext {
            question,
            transcript,
            category,
            metrics: Some(metrics),
        };
        let judgments = async {
            tokio::join!(
                self.judge::<SemanticJudgment>(prompt::build(JudgeTask::SemanticSimilarity, &ctx)),
                self.judge::<KeywordExtraction>(prompt::build(JudgeTask::KeywordExtraction, &ctx)),
                self.judge::<ContextJudgment>(prompt::build(JudgeTask::ContextCompleteness, &ctx)),
            )
        };

        let (semantic, keywords, context) =
            match tokio::time::timeout(self.config.overall_budget, judgments).await {
                Ok(results) => results,
                Err(_) => {
                    tracing::warn!(
                        target: LOG_TARGET,
                        budget_ms = self.config.overall_budget.as_millis() as u64,
                        "evaluation budget exhausted, falling back to metrics-only scores"
                    );
                    let budget = self.config.overall_budget;
                    (
                        Err(LlmError::Timeout(budget)),
                        Err(LlmError::Timeout(budget)),
                        Err(LlmError::Timeout(budget)),
                    )
                }
            };

        let mut degraded = Vec::new();
        let mut note_failure = |task: JudgeTask, e: &LlmError| {
            tracing::warn!(target: LOG_TARGET, task = %task, "judgment fell back: {e}");
            degraded.push(task);
        };

        let semantic_similarity = match semantic {
            Ok(j) => semantic_from(j),
            Err(e) => {
                note_failure(JudgeTask::SemanticSimilarity, &e);
                semantic_fallback()
            }
        };
        let keyword_recall = match keywords {
            Ok(k) => keyword_recall(transcript, &k.expected_keywords, MethodSource::Llm),
            Err(e) => {
                note_failure(JudgeTask::KeywordExtraction, &e);
                static_keyword_recall(transcript, category, MethodSource::Fallback)
            }
        };
        let context_completeness = match context {
            Ok(c) => context_from(c),
            Err(e) => {
                note_failure(JudgeTask::ContextCompleteness, &e);
                context_fallback()
            }
        };

        let is_fallback = degraded.len() == JudgeTask::ALL.len();
        let evaluation = self.finish(
            EvaluationMethods {
                semantic_similarity,
                keyword_recall,
                context_completeness,
                confidence_detection,
                sentiment_polarity,
            },
            metrics,
            degraded,
            is_fallback,
        );

        tracing::info!(
            target: LOG_TARGET,
            overall = evaluation.overall_score,
            verdict = evaluation.overall_verdict.as_str(),
            degraded = evaluation.degraded_methods.len(),
            is_fallback = evaluation.is_fallback,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "evaluation complete"
        );
        evaluation
    }

    fn finish(
        &self,
        methods: EvaluationMethods,
        metrics: &SpeechMetrics,
        degraded_methods: Vec<JudgeTask>,
        is_fallback: bool,
    ) -> Evaluation {
        let clarity = ClaritySubMetrics::from_metrics(metrics);
        let scores = blend::blend(&methods, metrics, &clarity);
        let overall_score = blend::overall_score(&scores);
        Evaluation {
            scores,
            methods,
            overall_score,
            overall_verdict: Verdict::from_score(overall_score),
            degraded_methods,
            is_fallback,
        }
    }
}
