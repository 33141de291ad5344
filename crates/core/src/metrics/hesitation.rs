use crate::config::HesitationConfig;
use crate::metrics::SpeechHesitation;
use crate::timeline::WordToken;

#[derive(Clone, Debug, PartialEq)]
pub struct HesitationReport {
    pub hesitations: Vec<SpeechHesitation>,
    /// Mean of every inter-word gap, in seconds.
    pub average_gap: f64,
    /// The threshold actually applied to this transcript, in seconds.
    pub adaptive_threshold: f64,
}

/// Gap between consecutive tokens in seconds; overlapping tokens count as zero.
pub fn inter_word_gaps(tokens: &[WordToken]) -> Vec<f64> {
    tokens
        .windows(2)
        .map(|w| (w[1].start_sec() - w[0].end_sec()).max(0.0))
        .collect()
}

/// Threshold derived from this speaker's own gap distribution.
///
/// With fewer than `min_gap_samples` gaps the distribution is not trusted and
/// the fixed threshold applies.
pub fn adaptive_threshold(gaps: &[f64], config: &HesitationConfig) -> f64 {
    if gaps.len() < config.min_gap_samples.max(2) {
        return config.fixed_threshold_sec;
    }
    let n = gaps.len() as f64;
    let mean = gaps.iter().sum::<f64>() / n;
    let stddev = (gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n).sqrt();
    (mean + config.stddev_multiplier * stddev).clamp(config.floor_sec, config.ceiling_sec)
}

pub fn detect_hesitations(tokens: &[WordToken], config: &HesitationConfig) -> HesitationReport {
    let gaps = inter_word_gaps(tokens);
    let threshold = adaptive_threshold(&gaps, config);
    let average_gap = if gaps.is_empty() {
        0.0
    } else {
        gaps.iter().sum::<f64>() / gaps.len() as f64
    };

    let hesitations = tokens
        .windows(2)
        .zip(&gaps)
        .filter(|(_, gap)| **gap > threshold)
        .map(|(pair, _)| SpeechHesitation {
            start_sec: pair[0].end_sec(),
            end_sec: pair[1].start_sec(),
        })
        .collect();

    HesitationReport {
        hesitations,
        average_gap,
        adaptive_threshold: threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_gaps(gaps_ms: &[u64]) -> Vec<WordToken> {
        let mut tokens = Vec::new();
        let mut t = 0;
        tokens.push(WordToken::new("w", t, t + 200));
        t += 200;
        for gap in gaps_ms {
            t += gap;
            tokens.push(WordToken::new("w", t, t + 200));
            t += 200;
        }
        tokens
    }

    #[test]
    fn short_transcripts_use_fixed_threshold() {
        let tokens = with_gaps(&[100, 1600, 1400]);
        let report = detect_hesitations(&tokens, &HesitationConfig::default());
        assert_eq!(report.adaptive_threshold, 1.5);
        assert_eq!(report.hesitations.len(), 1);
        assert_eq!(report.hesitations[0].start_sec, 0.5);
        assert_eq!(report.hesitations[0].end_sec, 2.1);
    }

    #[test]
    fn adaptive_threshold_catches_outlier_pause() {
        let mut gaps = vec![100; 9];
        gaps[4] = 3000;
        let report = detect_hesitations(&with_gaps(&gaps), &HesitationConfig::default());
        assert!(report.adaptive_threshold < 3.0);
        assert_eq!(report.hesitations.len(), 1);
        let h = report.hesitations[0];
        assert!((h.end_sec - h.start_sec - 3.0).abs() < 1e-9);
    }

    #[test]
    fn slow_but_steady_speaker_is_not_flagged() {
        // Gaps around 1.2s would trip a flat 1.0s rule.
        let gaps = [1100, 1200, 1300, 1200, 1100, 1250, 1150, 1200, 1300, 1200];
        let report = detect_hesitations(&with_gaps(&gaps), &HesitationConfig::default());
        assert!(report.adaptive_threshold > 1.3);
        assert!(report.hesitations.is_empty());
    }

    #[test]
    fn threshold_is_clamped_to_bounds() {
        let config = HesitationConfig::default();
        let tight = vec![0.05; 10];
        assert_eq!(adaptive_threshold(&tight, &config), config.floor_sec);
        let mut wild = vec![0.1; 10];
        wild.extend([8.0, 9.0, 10.0]);
        assert_eq!(adaptive_threshold(&wild, &config), config.ceiling_sec);
    }

    #[test]
    fn average_gap_covers_all_gaps_and_ignores_overlap() {
        let tokens = vec![
            WordToken::new("a", 0, 500),
            WordToken::new("b", 400, 800),
            WordToken::new("c", 1000, 1200),
        ];
        let report = detect_hesitations(&tokens, &HesitationConfig::default());
        assert!((report.average_gap - 0.1).abs() < 1e-9);
        assert!(report.hesitations.is_empty());
    }

    #[test]
    fn empty_and_single_token_timelines() {
        let config = HesitationConfig::default();
        assert_eq!(detect_hesitations(&[], &config).average_gap, 0.0);
        let one = detect_hesitations(&[WordToken::new("a", 0, 10)], &config);
        assert!(one.hesitations.is_empty());
    }
}
