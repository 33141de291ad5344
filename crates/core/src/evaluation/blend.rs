//! Fixed weightings that turn method outputs and objective metrics into scores.
//!
//! `fillerWordFrequency` and the clarity sub-metrics come straight from
//! [`SpeechMetrics`]; LLM judgments only reach the other scores through the
//! weights below, which caps how far one bad judgment can move the result.

use crate::coaching::ClaritySubMetrics;
use crate::evaluation::{EvaluationMethods, EvaluationScores, Verdict};
use crate::metrics::SpeechMetrics;

pub const TECHNICAL_WEIGHTS: [f64; 3] = [0.50, 0.30, 0.20]; // semantic, keyword, context
pub const BEHAVIOURAL_WEIGHTS: [f64; 3] = [0.60, 0.30, 0.10]; // confidence, fluency, sentiment
pub const CLARITY_WEIGHTS: [f64; 3] = [0.30, 0.20, 0.50]; // semantic, context, sub-metrics
pub const OVERALL_WEIGHTS: [f64; 4] = [0.35, 0.25, 0.25, 0.15];

const FILLER_PENALTY_PER_HUNDRED_WORDS: f64 = 8.0;
const HESITATION_PENALTY_PER_MINUTE: f64 = 12.0;
const STRONG_CUTOFF: u32 = 75;
const DEVELOPING_CUTOFF: u32 = 50;
const IDEAL_WPM: (f64, f64) = (120.0, 160.0);
const WPM_BAND_PENALTY: f64 = 1.25;

pub fn to_score(value: f64) -> u32 {
    value.clamp(0.0, 100.0).round() as u32
}

fn weighted(weights: &[f64], values: &[f64]) -> f64 {
    weights.iter().zip(values).map(|(w, v)| w * v).sum()
}

/// Inverted filler penalty: 100 means no fillers at all.
pub fn filler_word_frequency(metrics: &SpeechMetrics) -> u32 {
    if metrics.word_count == 0 {
        return 100;
    }
    to_score(100.0 - FILLER_PENALTY_PER_HUNDRED_WORDS * metrics.fillers_per_hundred_words())
}

/// 100 for an answer without long pauses, dropping with pauses per minute.
pub fn fluency(metrics: &SpeechMetrics) -> f64 {
    (100.0 - HESITATION_PENALTY_PER_MINUTE * metrics.hesitations_per_minute()).max(0.0)
}

/// 100 inside the comfortable speaking band, falling off linearly outside it.
pub fn wpm_band_score(wpm: u32) -> f64 {
    let wpm = f64::from(wpm);
    let distance = if wpm < IDEAL_WPM.0 {
        IDEAL_WPM.0 - wpm
    } else if wpm > IDEAL_WPM.1 {
        wpm - IDEAL_WPM.1
    } else {
        0.0
    };
    (100.0 - WPM_BAND_PENALTY * distance).max(0.0)
}

pub fn blend(
    methods: &EvaluationMethods,
    metrics: &SpeechMetrics,
    clarity: &ClaritySubMetrics,
) -> EvaluationScores {
    let semantic = f64::from(methods.semantic_similarity.score);
    let keyword = f64::from(methods.keyword_recall.score);
    let context = f64::from(methods.context_completeness.score);
    let confidence = f64::from(methods.confidence_detection.score);
    let sentiment = f64::from(methods.sentiment_polarity.score);

    EvaluationScores {
        technical_accuracy: to_score(weighted(&TECHNICAL_WEIGHTS, &[semantic, keyword, context])),
        behavioural_confidence: to_score(weighted(
            &BEHAVIOURAL_WEIGHTS,
            &[confidence, fluency(metrics), sentiment],
        )),
        communication_clarity: to_score(weighted(
            &CLARITY_WEIGHTS,
            &[semantic, context, clarity.mean()],
        )),
        filler_word_frequency: filler_word_frequency(metrics),
    }
}

pub fn overall_score(scores: &EvaluationScores) -> u32 {
    to_score(weighted(
        &OVERALL_WEIGHTS,
        &[
            f64::from(scores.technical_accuracy),
            f64::from(scores.behavioural_confidence),
            f64::from(scores.communication_clarity),
            f64::from(scores.filler_word_frequency),
        ],
    ))
}

/// Delivery energy from pace and steadiness, optionally blended with the
/// caller's own heuristic at one-third weight.
pub fn speech_energy_score(metrics: &SpeechMetrics, client_energy: Option<f64>) -> u32 {
    if metrics.word_count == 0 {
        return 0;
    }
    let base = 0.5 * wpm_band_score(metrics.wpm) + 0.5 * f64::from(metrics.pace_consistency_score);
    match client_energy.filter(|e| e.is_finite()) {
        Some(energy) => to_score((2.0 * base + energy.clamp(0.0, 100.0)) / 3.0),
        None => to_score(base),
    }
}

impl Verdict {
    pub fn from_score(score: u32) -> Self {
        if score >= STRONG_CUTOFF {
            Self::Strong
        } else if score >= DEVELOPING_CUTOFF {
            Self::Developing
        } else {
            Self::NeedsWork
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsConfig;
    use crate::metrics::aggregate;
    use crate::timeline::{WordTimeline, WordToken};

    fn metrics_with(words: usize, fillers: usize, duration_sec: f64) -> SpeechMetrics {
        let mut m = aggregate(
            &WordTimeline::new("", Vec::<WordToken>::new(), 0.0),
            &MetricsConfig::default(),
        );
        m.word_count = words;
        m.filler_count = fillers;
        m.duration_sec = duration_sec;
        m
    }

    #[test]
    fn weights_sum_to_one() {
        for weights in [
            &TECHNICAL_WEIGHTS[..],
            &BEHAVIOURAL_WEIGHTS[..],
            &CLARITY_WEIGHTS[..],
            &OVERALL_WEIGHTS[..],
        ] {
            assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn filler_score_is_inverted_penalty() {
        assert_eq!(filler_word_frequency(&metrics_with(100, 0, 60.0)), 100);
        assert_eq!(filler_word_frequency(&metrics_with(100, 5, 60.0)), 60);
        assert_eq!(filler_word_frequency(&metrics_with(100, 20, 60.0)), 0);
        assert_eq!(filler_word_frequency(&metrics_with(0, 0, 0.0)), 100);
    }

    #[test]
    fn fluency_drops_with_pauses() {
        let mut m = metrics_with(150, 0, 60.0);
        assert_eq!(fluency(&m), 100.0);
        m.hesitation_count = 3;
        assert_eq!(fluency(&m), 64.0);
    }

    #[test]
    fn wpm_band() {
        assert_eq!(wpm_band_score(140), 100.0);
        assert_eq!(wpm_band_score(100), 75.0);
        assert_eq!(wpm_band_score(200), 50.0);
        assert_eq!(wpm_band_score(0), 0.0);
    }

    #[test]
    fn verdict_thresholds() {
        assert_eq!(Verdict::from_score(90), Verdict::Strong);
        assert_eq!(Verdict::from_score(75), Verdict::Strong);
        assert_eq!(Verdict::from_score(74), Verdict::Developing);
        assert_eq!(Verdict::from_score(50), Verdict::Developing);
        assert_eq!(Verdict::from_score(49), Verdict::NeedsWork);
    }

    #[test]
    fn overall_is_weighted_and_bounded() {
        let all = |v| EvaluationScores {
            technical_accuracy: v,
            behavioural_confidence: v,
            communication_clarity: v,
            filler_word_frequency: v,
        };
        assert_eq!(overall_score(&all(100)), 100);
        assert_eq!(overall_score(&all(0)), 0);
        assert_eq!(overall_score(&all(62)), 62);
    }

    #[test]
    fn client_energy_blends_at_one_third() {
        let mut m = metrics_with(150, 0, 60.0);
        m.wpm = 140;
        m.pace_consistency_score = 100;
        assert_eq!(speech_energy_score(&m, None), 100);
        assert_eq!(speech_energy_score(&m, Some(40.0)), 80);
        assert_eq!(speech_energy_score(&m, Some(f64::NAN)), 100);
        assert_eq!(speech_energy_score(&metrics_with(0, 0, 0.0), Some(90.0)), 0);
    }
}
