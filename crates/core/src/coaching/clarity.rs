use crate::metrics::SpeechMetrics;
use serde::{Deserialize, Serialize};

const HESITATION_PENALTY_PER_MINUTE: f64 = 12.0;
const FILLER_PENALTY_PER_HUNDRED_WORDS: f64 = 6.0;
const COMFORTABLE_WPM: (f64, f64) = (110.0, 170.0);
const MAX_PACE_PENALTY: f64 = 40.0;
const DIVERSITY_BAND: (f64, f64) = (0.40, 0.75);

/// Delivery-derived sub-scores behind `communicationClarity`, all 0-100.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaritySubMetrics {
    pub structure: u32,
    pub coherence: u32,
    pub conciseness: u32,
    pub vocabulary_appropriateness: u32,
}

fn score(value: f64) -> u32 {
    value.clamp(0.0, 100.0).round() as u32
}

impl ClaritySubMetrics {
    pub fn from_metrics(metrics: &SpeechMetrics) -> Self {
        if metrics.word_count == 0 {
            return Self::default();
        }

        let hesitation_penalty =
            (HESITATION_PENALTY_PER_MINUTE * metrics.hesitations_per_minute()).min(100.0);

        let structure = 0.6 * f64::from(metrics.pace_consistency_score)
            + 0.4 * (100.0 - hesitation_penalty);

        let gap_penalty = ((metrics.average_gap - 0.5) * 40.0).clamp(0.0, 30.0);
        let coherence = 100.0 - 0.7 * hesitation_penalty - gap_penalty;

        let wpm = f64::from(metrics.wpm);
        let off_pace = if wpm < COMFORTABLE_WPM.0 {
            COMFORTABLE_WPM.0 - wpm
        } else if wpm > COMFORTABLE_WPM.1 {
            wpm - COMFORTABLE_WPM.1
        } else {
            0.0
        };
        let conciseness = 100.0
            - FILLER_PENALTY_PER_HUNDRED_WORDS * metrics.fillers_per_hundred_words()
            - (0.5 * off_pace).min(MAX_PACE_PENALTY);

        let ratio = metrics.vocabulary_diversity_ratio;
        let vocabulary = if ratio < DIVERSITY_BAND.0 {
            100.0 - (DIVERSITY_BAND.0 - ratio) * 200.0
        } else if ratio > DIVERSITY_BAND.1 {
            100.0 - (ratio - DIVERSITY_BAND.1) * 80.0
        } else {
            100.0
        };

        Self {
            structure: score(structure),
            coherence: score(coherence),
            conciseness: score(conciseness),
            vocabulary_appropriateness: score(vocabulary),
        }
    }

    pub fn mean(&self) -> f64 {
        f64::from(
            self.structure + self.coherence + self.conciseness + self.vocabulary_appropriateness,
        ) / 4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsConfig;
    use crate::metrics::aggregate;
    use crate::timeline::WordTimeline;

    fn base() -> SpeechMetrics {
        let mut m = aggregate(&WordTimeline::new("", vec![], 0.0), &MetricsConfig::default());
        m.word_count = 150;
        m.duration_sec = 60.0;
        m.wpm = 150;
        m.pace_consistency_score = 100;
        m.average_gap = 0.3;
        m.vocabulary_diversity_ratio = 0.6;
        m
    }

    #[test]
    fn clean_delivery_scores_full_marks() {
        let clarity = ClaritySubMetrics::from_metrics(&base());
        assert_eq!(
            clarity,
            ClaritySubMetrics {
                structure: 100,
                coherence: 100,
                conciseness: 100,
                vocabulary_appropriateness: 100,
            }
        );
        assert_eq!(clarity.mean(), 100.0);
    }

    #[test]
    fn pauses_hurt_structure_and_coherence() {
        let mut m = base();
        m.hesitation_count = 5;
        m.average_gap = 1.0;
        let clarity = ClaritySubMetrics::from_metrics(&m);
        // penalty 60: structure 60 + 16, coherence 100 - 42 - 20
        assert_eq!(clarity.structure, 76);
        assert_eq!(clarity.coherence, 38);
        assert_eq!(clarity.conciseness, 100);
    }

    #[test]
    fn fillers_and_pace_hurt_conciseness() {
        let mut m = base();
        m.filler_count = 6;
        m.wpm = 230;
        // 4 per hundred words and 60 wpm over the band
        assert_eq!(ClaritySubMetrics::from_metrics(&m).conciseness, 46);
    }

    #[test]
    fn repetitive_vocabulary_is_penalised_more_than_varied() {
        let mut m = base();
        m.vocabulary_diversity_ratio = 0.2;
        assert_eq!(ClaritySubMetrics::from_metrics(&m).vocabulary_appropriateness, 60);
        m.vocabulary_diversity_ratio = 1.0;
        assert_eq!(ClaritySubMetrics::from_metrics(&m).vocabulary_appropriateness, 80);
    }

    #[test]
    fn no_words_scores_zero() {
        let m = aggregate(&WordTimeline::new("", vec![], 0.0), &MetricsConfig::default());
        assert_eq!(ClaritySubMetrics::from_metrics(&m).mean(), 0.0);
    }
}
