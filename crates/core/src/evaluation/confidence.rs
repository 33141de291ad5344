use crate::evaluation::{ConfidenceDetection, MethodSource};
use regex::Regex;
use std::sync::LazyLock;

static ASSERTIVE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        concat!(
            r"\b(?:i|we) (?:led|decided|built|created|designed|implemented|delivered|drove|",
            r"owned|managed|launched|achieved|resolved|improved|solved|shipped|reduced|",
            r"increased|initiated|organized|proposed|chose)\b",
        ),
        r"\b(?:i am|i'm) (?:confident|sure|certain)\b",
        r"\b(?:definitely|certainly|absolutely|clearly)\b",
        r"\b(?:i know|i will|i'll make sure)\b",
    ])
});

static HEDGING: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bi (?:think|guess|suppose|believe) maybe\b",
        r"\b(?:maybe|perhaps|probably|possibly|hopefully|somewhat)\b",
        r"\b(?:kind of|sort of|more or less|a little bit)\b",
        r"\bi (?:guess|suppose)\b",
        r"\b(?:not sure|i'm not sure|i don't know)\b",
        r"\b(?:might|could) have\b",
    ])
});

static PASSIVE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[r"\b(?:was|were|been|being|got) [a-z]+ed(?: by)?\b"])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("confidence pattern must compile"))
        .collect()
}

/// Distinct matches in order of first appearance, plus the total match count.
fn find_all(regexes: &[Regex], text: &str) -> (Vec<String>, usize) {
    let mut found: Vec<String> = Vec::new();
    let mut count = 0;
    for re in regexes {
        for m in re.find_iter(text) {
            count += 1;
            let s = m.as_str().to_owned();
            if !found.contains(&s) {
                found.push(s);
            }
        }
    }
    (found, count)
}

/// Scores assertive phrasing against hedging and passive constructions.
///
/// 50 when nothing matches; passive voice weighs half as much as hedging.
pub fn detect_confidence(transcript: &str) -> ConfidenceDetection {
    let text = transcript.to_lowercase();
    let (assertive_patterns, assertive_count) = find_all(&ASSERTIVE, &text);
    let (hedging_patterns, hedging_count) = find_all(&HEDGING, &text);
    let (passive_patterns, passive_count) = find_all(&PASSIVE, &text);

    let positive = assertive_count as f64;
    let negative = hedging_count as f64 + 0.5 * passive_count as f64;
    let total = positive + negative;
    let score = if total == 0.0 {
        50
    } else {
        (50.0 + 50.0 * (positive - negative) / total)
            .clamp(0.0, 100.0)
            .round() as u32
    };

    ConfidenceDetection {
        score,
        assertive_patterns,
        hedging_patterns,
        passive_patterns,
        assertive_count,
        hedging_count,
        passive_count,
        source: MethodSource::Pattern,
    }
}
