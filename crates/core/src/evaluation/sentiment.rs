use crate::evaluation::{MethodSource, Polarity, SentimentPolarity};
use crate::metrics::lexical::normalize_word;

const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "success", "successful", "successfully", "happy", "enjoy",
    "enjoyed", "love", "loved", "proud", "excited", "improved", "achieved", "win", "won",
    "positive", "glad", "passionate", "effective", "better", "best", "opportunity", "grateful",
    "fun", "rewarding",
];

const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "fail", "failed", "failure", "hate", "hated", "angry",
    "frustrated", "frustrating", "worst", "poor", "negative", "sad", "disappointed",
    "disappointing", "stressful", "boring", "annoying", "wrong", "horrible", "useless",
];

const NEGATORS: &[&str] = &[
    "not", "never", "no", "don't", "didn't", "wasn't", "isn't", "weren't", "can't", "couldn't",
    "won't",
];

const POSITIVE_CUTOFF: u32 = 60;
const NEGATIVE_CUTOFF: u32 = 40;

/// Lexicon-based tone classification. A negator directly before an
/// indicator flips it ("not good" counts as negative).
pub fn analyze_sentiment(transcript: &str) -> SentimentPolarity {
    let words: Vec<String> = transcript
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect();

    let mut positive_indicators = Vec::new();
    let mut negative_indicators = Vec::new();

    for (i, word) in words.iter().enumerate() {
        let negated = i > 0 && NEGATORS.contains(&words[i - 1].as_str());
        let (is_pos, is_neg) = (
            POSITIVE.contains(&word.as_str()),
            NEGATIVE.contains(&word.as_str()),
        );
        let indicator = if negated {
            format!("{} {}", words[i - 1], word)
        } else {
            word.clone()
        };
        match (is_pos, is_neg, negated) {
            (true, _, false) | (_, true, true) => positive_indicators.push(indicator),
            (true, _, true) | (_, true, false) => negative_indicators.push(indicator),
            _ => {}
        }
    }

    let pos = positive_indicators.len() as f64;
    let neg = negative_indicators.len() as f64;
    let score = if pos + neg == 0.0 {
        50
    } else {
        (50.0 + 50.0 * (pos - neg) / (pos + neg)).round() as u32
    };
    let polarity = if score >= POSITIVE_CUTOFF {
        Polarity::Positive
    } else if score <= NEGATIVE_CUTOFF {
        Polarity::Negative
    } else {
        Polarity::Neutral
    };

    SentimentPolarity {
        polarity,
        score,
        positive_indicators,
        negative_indicators,
        source: MethodSource::Pattern,
    }
}
