use crate::metrics::SpeechFiller;
use crate::timeline::WordToken;
use std::collections::HashSet;

pub const SINGLE_WORD_FILLERS: &[&str] = &[
    "um", "uh", "uhm", "umm", "er", "erm", "ah", "hmm", "like", "basically", "actually",
    "literally", "so", "well", "anyway", "right", "okay",
];

pub const MULTI_WORD_FILLERS: &[&str] = &[
    "you know",
    "i mean",
    "sort of",
    "kind of",
    "i think",
    "i guess",
    "you see",
    "or something",
];

/// Lower-cases and strips surrounding punctuation, keeping inner apostrophes.
pub fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .trim_matches('\'')
        .to_lowercase()
}

fn longest_phrase_len() -> usize {
    MULTI_WORD_FILLERS
        .iter()
        .map(|p| p.split(' ').count())
        .max()
        .unwrap_or(1)
}

/// Detects filler words and phrases in timeline order.
///
/// At each position the longest matching phrase wins and consumes its tokens,
/// so "you know" never also yields a separate single-word hit.
pub fn detect_fillers(tokens: &[WordToken]) -> Vec<SpeechFiller> {
    let normalized: Vec<String> = tokens.iter().map(|t| normalize_word(&t.text)).collect();
    let max_len = longest_phrase_len();
    let mut fillers = Vec::new();
    let mut i = 0;

    'outer: while i < normalized.len() {
        if normalized[i].is_empty() {
            i += 1;
            continue;
        }
        for n in (2..=max_len).rev() {
            if i + n > normalized.len() {
                continue;
            }
            let phrase = normalized[i..i + n].join(" ");
            if MULTI_WORD_FILLERS.contains(&phrase.as_str()) {
                fillers.push(SpeechFiller {
                    word: phrase,
                    timestamp_sec: tokens[i].start_sec(),
                });
                i += n;
                continue 'outer;
            }
        }
        if SINGLE_WORD_FILLERS.contains(&normalized[i].as_str()) {
            fillers.push(SpeechFiller {
                word: normalized[i].clone(),
                timestamp_sec: tokens[i].start_sec(),
            });
        }
        i += 1;
    }

    fillers
}

/// Distinct normalized words over total words, in [0, 1]; 0 for empty text.
pub fn vocabulary_diversity(transcript: &str) -> f64 {
    let words: Vec<String> = transcript
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let distinct: HashSet<&str> = words.iter().map(String::as_str).collect();
    distinct.len() as f64 / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<WordToken> {
        text.split_whitespace()
            .enumerate()
            .map(|(i, w)| WordToken::new(w, i as u64 * 500, i as u64 * 500 + 300))
            .collect()
    }

    #[test]
    fn normalizes_punctuation_and_case() {
        assert_eq!(normalize_word("Um,"), "um");
        assert_eq!(normalize_word("\"Basically...\""), "basically");
        assert_eq!(normalize_word("don't"), "don't");
        assert_eq!(normalize_word("--"), "");
    }

    #[test]
    fn detects_single_and_multi_word_fillers() {
        let fillers = detect_fillers(&tokens("Um, so I was, you know, kind of lost."));
        let words: Vec<_> = fillers.iter().map(|f| f.word.as_str()).collect();
        assert_eq!(words, ["um", "so", "you know", "kind of"]);
        assert_eq!(fillers[2].timestamp_sec, 2.0);
    }

    #[test]
    fn multi_word_match_consumes_its_tokens() {
        let fillers = detect_fillers(&tokens("well I mean like"));
        let words: Vec<_> = fillers.iter().map(|f| f.word.as_str()).collect();
        assert_eq!(words, ["well", "i mean", "like"]);
    }

    #[test]
    fn no_fillers_in_clean_speech() {
        assert!(detect_fillers(&tokens("I designed the caching layer myself.")).is_empty());
        assert!(detect_fillers(&[]).is_empty());
    }

    #[test]
    fn diversity_is_one_without_repeats_and_low_when_repetitive() {
        assert_eq!(vocabulary_diversity("every word here differs"), 1.0);
        assert_eq!(vocabulary_diversity(""), 0.0);
        let repetitive = "yes ".repeat(50);
        assert!(vocabulary_diversity(&repetitive) <= 0.02);
        assert_eq!(vocabulary_diversity("The the THE cat"), 0.5);
    }
}
