//! Objective delivery metrics computed from a word timeline.

pub mod hesitation;
pub mod lexical;
pub mod pace;

use crate::config::MetricsConfig;
use crate::timeline::WordTimeline;
use serde::{Deserialize, Serialize};

pub use hesitation::{detect_hesitations, HesitationReport};
pub use lexical::{detect_fillers, vocabulary_diversity};
pub use pace::{compute_wpm, pace_consistency, segment_wpm, wpm_for, PaceConsistency};

const LOG_TARGET: &str = "metrics";

const LOW_WORD_COUNT: usize = 20;
const MEDIUM_WORD_COUNT: usize = 50;
const LOW_DURATION_SEC: f64 = 10.0;
const MEDIUM_DURATION_SEC: f64 = 30.0;
const MAX_PLAUSIBLE_WPM: u32 = 350;
const MIN_PLAUSIBLE_WPM: u32 = 20;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechFiller {
    pub word: String,
    pub timestamp_sec: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechHesitation {
    pub start_sec: f64,
    pub end_sec: f64,
}

impl SpeechHesitation {
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WpmSegment {
    pub window_start_sec: f64,
    pub window_end_sec: f64,
    pub wpm: u32,
    pub word_count: usize,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviationType {
    Rushing,
    Dragging,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaceSegment {
    pub window_start_sec: f64,
    pub window_end_sec: f64,
    pub wpm: u32,
    pub word_count: usize,
    pub deviation_type: DeviationType,
}

impl PaceSegment {
    pub fn new(segment: &WpmSegment, deviation_type: DeviationType) -> Self {
        Self {
            window_start_sec: segment.window_start_sec,
            window_end_sec: segment.window_end_sec,
            wpm: segment.wpm,
            word_count: segment.word_count,
            deviation_type,
        }
    }
}

/// How much downstream consumers should trust the objective metrics.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MetricsReliability {
    Low,
    Medium,
    High,
}

impl MetricsReliability {
    pub fn assess(word_count: usize, duration_sec: f64, wpm: u32) -> Self {
        let implausible = duration_sec <= 0.0
            || wpm > MAX_PLAUSIBLE_WPM
            || wpm < MIN_PLAUSIBLE_WPM;
        if implausible || word_count < LOW_WORD_COUNT || duration_sec < LOW_DURATION_SEC {
            Self::Low
        } else if word_count < MEDIUM_WORD_COUNT || duration_sec < MEDIUM_DURATION_SEC {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechMetrics {
    pub transcript: String,
    pub duration_sec: f64,
    pub word_count: usize,
    pub wpm: u32,
    pub fillers: Vec<SpeechFiller>,
    pub filler_count: usize,
    pub hesitations: Vec<SpeechHesitation>,
    pub hesitation_count: usize,
    pub segmented_wpm: Vec<WpmSegment>,
    pub pace_consistency_score: u32,
    pub rushing_segments: Vec<PaceSegment>,
    pub dragging_segments: Vec<PaceSegment>,
    pub vocabulary_diversity_ratio: f64,
    pub average_gap: f64,
    pub adaptive_hesitation_threshold: f64,
    pub metrics_reliability: MetricsReliability,
}

impl SpeechMetrics {
    pub fn duration_min(&self) -> f64 {
        self.duration_sec / 60.0
    }

    /// Fillers per minute of speech; 0 without a duration.
    pub fn fillers_per_minute(&self) -> f64 {
        if self.duration_sec <= 0.0 {
            return 0.0;
        }
        self.filler_count as f64 / self.duration_min()
    }

    /// Fillers per hundred words; 0 without words.
    pub fn fillers_per_hundred_words(&self) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        self.filler_count as f64 * 100.0 / self.word_count as f64
    }

    pub fn hesitations_per_minute(&self) -> f64 {
        if self.duration_sec <= 0.0 {
            return 0.0;
        }
        self.hesitation_count as f64 / self.duration_min()
    }
}

/// Runs the lexical, pace and hesitation engines once each over the timeline.
pub fn aggregate(timeline: &WordTimeline, config: &MetricsConfig) -> SpeechMetrics {
    let tokens = timeline.tokens();
    let duration_sec = timeline.duration_sec();
    let word_count = timeline.word_count();

    let fillers = detect_fillers(tokens);
    let wpm = wpm_for(word_count, duration_sec);
    let segmented_wpm = segment_wpm(tokens, duration_sec, config.window_size_sec);
    let pace = pace_consistency(&segmented_wpm, config.pace_tolerance);
    let hesitation = detect_hesitations(tokens, &config.hesitation);
    let metrics_reliability = MetricsReliability::assess(word_count, duration_sec, wpm);

    tracing::debug!(
        target: LOG_TARGET,
        word_count,
        wpm,
        fillers = fillers.len(),
        hesitations = hesitation.hesitations.len(),
        reliability = ?metrics_reliability,
        "speech metrics computed"
    );

    SpeechMetrics {
        transcript: timeline.transcript().to_owned(),
        duration_sec,
        word_count,
        wpm,
        filler_count: fillers.len(),
        fillers,
        hesitation_count: hesitation.hesitations.len(),
        hesitations: hesitation.hesitations,
        segmented_wpm,
        pace_consistency_score: pace.score,
        rushing_segments: pace.rushing,
        dragging_segments: pace.dragging,
        vocabulary_diversity_ratio: vocabulary_diversity(timeline.transcript()),
        average_gap: hesitation.average_gap,
        adaptive_hesitation_threshold: hesitation.adaptive_threshold,
        metrics_reliability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::WordToken;

    /// Lays words out 400ms apart, inserting `pause_ms` before `pause_before`.
    fn timeline_from(
        text: &str,
        pause_before: Option<usize>,
        pause_ms: u64,
        duration_sec: f64,
    ) -> WordTimeline {
        let mut t = 0;
        let tokens = text
            .split_whitespace()
            .enumerate()
            .map(|(i, w)| {
                if Some(i) == pause_before {
                    t += pause_ms;
                }
                let token = WordToken::new(w, t, t + 250);
                t += 400;
                token
            })
            .collect();
        WordTimeline::new(text, tokens, duration_sec)
    }

    #[test]
    fn short_hesitant_answer_scenario() {
        let text = "um so basically I think maybe it was fine you know";
        let timeline = timeline_from(text, Some(6), 3000, 8.0);
        let metrics = aggregate(&timeline, &MetricsConfig::default());

        assert!(metrics.filler_count >= 4, "fillers: {:?}", metrics.fillers);
        assert_eq!(metrics.filler_count, metrics.fillers.len());
        assert!(metrics.hesitation_count >= 1);
        assert_eq!(metrics.hesitation_count, metrics.hesitations.len());
        assert!(metrics
            .hesitations
            .iter()
            .any(|h| h.duration_sec() >= 3.0));
        assert_eq!(metrics.metrics_reliability, MetricsReliability::Low);
    }

    #[test]
    fn empty_input_yields_zeroed_metrics() {
        let metrics = aggregate(&WordTimeline::new("", vec![], 0.0), &MetricsConfig::default());
        assert_eq!(metrics.wpm, 0);
        assert_eq!(metrics.filler_count, 0);
        assert_eq!(metrics.hesitation_count, 0);
        assert_eq!(metrics.vocabulary_diversity_ratio, 0.0);
        assert!(metrics.segmented_wpm.is_empty());
        assert_eq!(metrics.metrics_reliability, MetricsReliability::Low);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let text = "so the cache was um slow and I rewrote the eviction policy you know";
        let timeline = timeline_from(text, Some(4), 2000, 9.0);
        let first = serde_json::to_string(&aggregate(&timeline, &MetricsConfig::default()))
            .expect("serializes");
        let second = serde_json::to_string(&aggregate(&timeline, &MetricsConfig::default()))
            .expect("serializes");
        assert_eq!(first, second);
    }

    #[test]
    fn wpm_matches_definition() {
        let text = "word ".repeat(60);
        let timeline = timeline_from(&text, None, 0, 24.0);
        let metrics = aggregate(&timeline, &MetricsConfig::default());
        assert_eq!(metrics.wpm, 150);
        assert_eq!(metrics.segmented_wpm.len(), 2);
    }

    #[test]
    fn absurd_duration_returns_low_reliability() {
        let timeline = timeline_from("hello there", None, 0, 1.0e12);
        let metrics = aggregate(&timeline, &MetricsConfig::default());

        assert_eq!(metrics.word_count, 2);
        assert_eq!(metrics.wpm, 0);
        assert_eq!(metrics.metrics_reliability, MetricsReliability::Low);
        assert!(metrics.segmented_wpm.len() <= pace::MAX_WINDOWS);
        assert_eq!(metrics.pace_consistency_score, 0);
    }

    #[test]
    fn transcript_only_input_uses_text_word_count() {
        let metrics = aggregate(
            &WordTimeline::new("one two three four", vec![], 2.0),
            &MetricsConfig::default(),
        );
        assert_eq!(metrics.wpm, 120);
        assert!(metrics.segmented_wpm.iter().all(|s| s.word_count == 0));
    }

    #[test]
    fn reliability_tiers() {
        assert_eq!(MetricsReliability::assess(10, 8.0, 75), MetricsReliability::Low);
        assert_eq!(MetricsReliability::assess(40, 20.0, 120), MetricsReliability::Medium);
        assert_eq!(MetricsReliability::assess(200, 90.0, 133), MetricsReliability::High);
        // Absurd duration for the word count.
        assert_eq!(MetricsReliability::assess(60, 600.0, 6), MetricsReliability::Low);
        assert_eq!(MetricsReliability::assess(200, 20.0, 600), MetricsReliability::Low);
    }

    #[test]
    fn serializes_camel_case_fields() {
        let metrics = aggregate(&WordTimeline::new("", vec![], 0.0), &MetricsConfig::default());
        let value = serde_json::to_value(&metrics).expect("serializes");
        assert_eq!(value["fillerCount"], 0);
        assert_eq!(value["metricsReliability"], "low");
        assert!(value.get("adaptiveHesitationThreshold").is_some());
    }
}
