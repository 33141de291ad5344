use crate::evaluation::{KeywordRecall, MethodSource};
use crate::metrics::lexical::normalize_word;
use crate::timeline::QuestionCategory;

const BEHAVIORAL: &[&str] = &[
    "team", "challenge", "decided", "result", "learned", "responsible", "impact",
    "communicated", "deadline", "feedback",
];

const TECHNICAL: &[&str] = &[
    "complexity", "trade-off", "performance", "example", "memory", "data structure",
    "algorithm", "edge case", "testing", "scalability",
];

const SYSTEM_DESIGN: &[&str] = &[
    "scalability", "load balancer", "cache", "database", "latency", "throughput",
    "replication", "sharding", "availability", "consistency", "api", "queue",
];

const GENERAL: &[&str] = &[
    "experience", "skills", "goal", "team", "value", "learn", "growth", "motivated",
];

/// Keywords a good answer in this category usually touches on.
pub fn static_keywords(category: QuestionCategory) -> &'static [&'static str] {
    match category {
        QuestionCategory::Behavioral => BEHAVIORAL,
        QuestionCategory::Technical => TECHNICAL,
        QuestionCategory::SystemDesign => SYSTEM_DESIGN,
        QuestionCategory::General => GENERAL,
    }
}

fn words_of(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == '-' || c == '/')
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect()
}

/// Exact match or a regular plural of the keyword word.
fn word_matches(spoken: &str, keyword: &str) -> bool {
    if spoken == keyword {
        return true;
    }
    match spoken.strip_prefix(keyword) {
        Some("s") | Some("es") => true,
        _ => keyword
            .strip_suffix('y')
            .is_some_and(|stem| spoken.strip_prefix(stem) == Some("ies")),
    }
}

fn contains_phrase(spoken: &[String], keyword: &[String]) -> bool {
    if keyword.is_empty() || keyword.len() > spoken.len() {
        return false;
    }
    spoken
        .windows(keyword.len())
        .any(|w| w.iter().zip(keyword).all(|(s, k)| word_matches(s, k)))
}

/// Checks which expected keywords appear in the transcript.
///
/// Keywords are de-duplicated case-insensitively; the score is the matched
/// fraction scaled to 0-100, and 0 when nothing was expected.
pub fn keyword_recall(
    transcript: &str,
    expected: &[String],
    source: MethodSource,
) -> KeywordRecall {
    let spoken = words_of(transcript);
    let mut expected_keywords: Vec<String> = Vec::new();
    for keyword in expected {
        let k = keyword.trim().to_lowercase();
        if !k.is_empty() && !expected_keywords.contains(&k) {
            expected_keywords.push(k);
        }
    }

    let (matched_keywords, missing_keywords): (Vec<String>, Vec<String>) = expected_keywords
        .iter()
        .cloned()
        .partition(|k| contains_phrase(&spoken, &words_of(k)));

    let score = if expected_keywords.is_empty() {
        0
    } else {
        (matched_keywords.len() as f64 / expected_keywords.len() as f64 * 100.0).round() as u32
    };

    KeywordRecall {
        score,
        expected_keywords,
        matched_keywords,
        missing_keywords,
        source,
    }
}

pub fn static_keyword_recall(
    transcript: &str,
    category: QuestionCategory,
    source: MethodSource,
) -> KeywordRecall {
    let expected: Vec<String> = static_keywords(category)
        .iter()
        .map(|k| (*k).to_owned())
        .collect();
    keyword_recall(transcript, &expected, source)
}
