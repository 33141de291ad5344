//! Word-level transcript input as delivered by the speech-to-text collaborator.

use serde::{Deserialize, Deserializer, Serialize};

const LOG_TARGET: &str = "timeline";

/// One transcribed word with its position in the recording.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WordToken {
    #[serde(alias = "word")]
    pub text: String,
    #[serde(deserialize_with = "lenient_millis")]
    pub start_ms: u64,
    #[serde(deserialize_with = "lenient_millis")]
    pub end_ms: u64,
}

/// Accepts any JSON number; fractions round to the nearest millisecond and
/// negative or non-finite values become 0.
fn lenient_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    })
}

impl WordToken {
    pub fn new<S: Into<String>>(text: S, start_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }

    pub fn start_sec(&self) -> f64 {
        self.start_ms as f64 / 1000.0
    }

    pub fn end_sec(&self) -> f64 {
        self.end_ms as f64 / 1000.0
    }
}

/// Ordered word tokens plus the full transcript text and recording length.
///
/// Construction repairs rather than rejects malformed input: tokens are
/// ordered by start time, inverted tokens get `end_ms = start_ms`, a
/// non-finite or negative duration becomes zero, and a blank transcript is
/// rebuilt from the token texts.
#[derive(Clone, Debug, PartialEq)]
pub struct WordTimeline {
    transcript: String,
    tokens: Vec<WordToken>,
    duration_sec: f64,
}

impl WordTimeline {
    pub fn new(
        transcript: impl Into<String>,
        mut tokens: Vec<WordToken>,
        duration_sec: f64,
    ) -> Self {
        let mut repaired = 0usize;
        if tokens.windows(2).any(|w| w[1].start_ms < w[0].start_ms) {
            tokens.sort_by_key(|t| t.start_ms);
            repaired += 1;
        }
        for token in tokens.iter_mut().filter(|t| t.end_ms < t.start_ms) {
            token.end_ms = token.start_ms;
            repaired += 1;
        }
        let duration_sec = if duration_sec.is_finite() && duration_sec > 0.0 {
            duration_sec
        } else {
            0.0
        };
        let mut transcript = transcript.into();
        if transcript.trim().is_empty() && !tokens.is_empty() {
            transcript = tokens
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            tracing::debug!(target: LOG_TARGET, "transcript rebuilt from word tokens");
        }
        if repaired > 0 {
            tracing::warn!(target: LOG_TARGET, repaired, "repaired malformed word timeline");
        }
        Self {
            transcript,
            tokens,
            duration_sec,
        }
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn tokens(&self) -> &[WordToken] {
        &self.tokens
    }

    pub fn duration_sec(&self) -> f64 {
        self.duration_sec
    }

    /// Token count, or the transcript's whitespace word count when no tokens were supplied.
    pub fn word_count(&self) -> usize {
        if self.tokens.is_empty() {
            self.transcript.split_whitespace().count()
        } else {
            self.tokens.len()
        }
    }
}

/// Interview question categories used to pick static keyword lists.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum QuestionCategory {
    Behavioral,
    Technical,
    SystemDesign,
    General,
}

impl QuestionCategory {
    /// Best-effort category guess from the question wording.
    pub fn infer(question: &str) -> Self {
        let q = question.to_lowercase();
        let any = |needles: &[&str]| needles.iter().any(|n| q.contains(n));
        if any(&[
            "design a",
            "design an",
            "architect",
            "scale",
            "system that",
            "high availability",
        ]) {
            Self::SystemDesign
        } else if any(&[
            "tell me about a time",
            "describe a time",
            "give an example",
            "situation",
            "conflict",
            "challenge you",
            "mistake",
            "disagree",
        ]) {
            Self::Behavioral
        } else if any(&[
            "algorithm",
            "complexity",
            "difference between",
            "how does",
            "explain",
            "implement",
            "code",
            "database",
        ]) {
            Self::Technical
        } else {
            Self::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Behavioral => "behavioral",
            Self::Technical => "technical",
            Self::SystemDesign => "system design",
            Self::General => "general",
        }
    }
}

/// A complete analysis request: transcript, timeline and the question answered.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub words: Vec<WordToken>,
    #[serde(default)]
    pub duration_sec: f64,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub question_category: Option<QuestionCategory>,
    /// Client-side delivery energy heuristic in [0, 100], if the caller has one.
    #[serde(default)]
    pub client_energy: Option<f64>,
}

impl AnalysisRequest {
    pub fn timeline(&self) -> WordTimeline {
        WordTimeline::new(self.transcript.clone(), self.words.clone(), self.duration_sec)
    }

    pub fn category(&self) -> QuestionCategory {
        self.question_category
            .unwrap_or_else(|| QuestionCategory::infer(&self.question))
    }
}
