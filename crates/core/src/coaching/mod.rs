//! Turns scores and raw delivery signals into strengths, weaknesses and
//! exactly three next steps.

mod clarity;

use crate::evaluation::{Evaluation, Verdict};
use crate::metrics::{MetricsReliability, SpeechMetrics};
use serde::{Deserialize, Serialize};

pub use clarity::ClaritySubMetrics;

const LOG_TARGET: &str = "coaching";

const STRENGTH_CUTOFF: u32 = 70;
const WEAKNESS_CUTOFF: u32 = 55;
const MAX_LISTED: usize = 3;

const GENERIC_STEPS: [&str; 4] = [
    "Structure each answer as situation, action and result, and finish with what you learned.",
    "Record a two-minute answer every day and listen back for filler words and long pauses.",
    "Pause for a full breath before answering instead of filling the silence.",
    "End every answer with one sentence that states the outcome in numbers.",
];

const FALLBACK_STRENGTHS: [&str; 1] =
    ["You completed the answer, which gives you material to refine."];
const FALLBACK_WEAKNESSES: [&str; 1] =
    ["A detailed content evaluation was unavailable for this answer."];
const NEUTRAL_STRENGTH: &str = "No area stood out yet; keep practising to build a clear strength.";
const NEUTRAL_WEAKNESS: &str =
    "No major weaknesses detected; focus on polishing what already works.";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedCoachingFeedback {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub actionable_steps: [String; 3],
    pub clarity_sub_metrics: ClaritySubMetrics,
    pub summary: String,
}

/// A scored area of the answer, used for both lists and the summary.
struct Area {
    score: u32,
    strength: &'static str,
    weakness: &'static str,
    label: &'static str,
}

fn areas(evaluation: &Evaluation, clarity: &ClaritySubMetrics) -> Vec<Area> {
    let scores = &evaluation.scores;
    let methods = &evaluation.methods;
    vec![
        Area {
            score: scores.technical_accuracy,
            strength: "Your answer addressed the substance of the question accurately.",
            weakness: "The technical content missed important parts of a strong answer.",
            label: "technical accuracy",
        },
        Area {
            score: methods.confidence_detection.score,
            strength: "You spoke with direct, confident phrasing.",
            weakness: "Hedging phrases made the answer sound unsure.",
            label: "confidence",
        },
        Area {
            score: scores.communication_clarity,
            strength: "The answer was clear and easy to follow.",
            weakness: "The answer was hard to follow in places.",
            label: "clarity",
        },
        Area {
            score: scores.filler_word_frequency,
            strength: "You kept filler words to a minimum.",
            weakness: "Filler words interrupted the flow of the answer.",
            label: "filler words",
        },
        Area {
            score: clarity.structure,
            strength: "Your pacing was steady throughout.",
            weakness: "Uneven pacing and long pauses broke up the structure.",
            label: "pacing",
        },
        Area {
            score: clarity.vocabulary_appropriateness,
            strength: "You used varied, precise vocabulary.",
            weakness: "Word choice was repetitive.",
            label: "vocabulary",
        },
    ]
}

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .take(MAX_LISTED)
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn distinct_fillers(metrics: &SpeechMetrics) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for filler in &metrics.fillers {
        if !words.contains(&filler.word) {
            words.push(filler.word.clone());
        }
    }
    words
}

/// Concrete steps paired with a severity (higher is worse).
fn candidate_steps(evaluation: &Evaluation, metrics: &SpeechMetrics) -> Vec<(u32, String)> {
    let methods = &evaluation.methods;
    let scores = &evaluation.scores;
    let mut steps = Vec::new();

    if scores.filler_word_frequency < STRENGTH_CUTOFF && metrics.filler_count > 0 {
        steps.push((
            100 - scores.filler_word_frequency,
            format!(
                "Replace filler words like {} with a silent pause while you gather \
                 the next thought.",
                quoted_list(&distinct_fillers(metrics))
            ),
        ));
    }

    let keywords = &methods.keyword_recall;
    if keywords.score < STRENGTH_CUTOFF && !keywords.missing_keywords.is_empty() {
        steps.push((
            100 - keywords.score,
            format!(
                "Work key concepts such as {} into your answer and explain how they apply.",
                quoted_list(&keywords.missing_keywords)
            ),
        ));
    }

    let context = &methods.context_completeness;
    if context.score < STRENGTH_CUTOFF && !context.missing_aspects.is_empty() {
        steps.push((
            100 - context.score,
            format!(
                "Cover the parts your answer skipped: {}.",
                context
                    .missing_aspects
                    .iter()
                    .take(MAX_LISTED)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    }

    let confidence = &methods.confidence_detection;
    if confidence.score < WEAKNESS_CUTOFF {
        let step = match confidence.hedging_patterns.first() {
            Some(hedge) => format!(
                "Replace hedges like \"{hedge}\" with direct statements of what you did and why."
            ),
            None => {
                "Describe your own actions in the active voice, starting with \"I\".".to_owned()
            }
        };
        steps.push((100 - confidence.score, step));
    }

    if !metrics.hesitations.is_empty() {
        let longest = metrics
            .hesitations
            .iter()
            .map(|h| h.duration_sec())
            .fold(0.0_f64, f64::max);
        let severity = (metrics.hesitations_per_minute() * 12.0).min(100.0) as u32;
        steps.push((
            severity.max(30),
            format!(
                "Outline two or three points before you start speaking; your longest pause \
                 was {longest:.1} seconds."
            ),
        ));
    }

    if let Some(segment) = metrics.rushing_segments.first() {
        steps.push((
            100 - metrics.pace_consistency_score.min(100),
            format!(
                "Slow down around {:.0}s, where you reached {} words per minute; aim for \
                 a steady 130 to 150.",
                segment.window_start_sec, segment.wpm
            ),
        ));
    } else if let Some(segment) = metrics.dragging_segments.first() {
        steps.push((
            100 - metrics.pace_consistency_score.min(100),
            format!(
                "Keep momentum around {:.0}s, where your pace dropped to {} words per minute.",
                segment.window_start_sec, segment.wpm
            ),
        ));
    }

    let semantic = &methods.semantic_similarity;
    if semantic.score < WEAKNESS_CUTOFF && !semantic.ideal_answer_summary.is_empty() {
        steps.push((
            100 - semantic.score,
            format!(
                "Compare your answer with a stronger outline: {}",
                semantic.ideal_answer_summary
            ),
        ));
    }

    steps
}

/// Most severe first, without duplicates, padded from the generic list.
fn pick_three(mut candidates: Vec<(u32, String)>) -> [String; 3] {
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    let mut chosen: Vec<String> = Vec::with_capacity(3);
    for (_, step) in candidates {
        if chosen.len() == 3 {
            break;
        }
        if !chosen.contains(&step) {
            chosen.push(step);
        }
    }
    let mut generic = GENERIC_STEPS.iter();
    while chosen.len() < 3 {
        match generic.next() {
            Some(step) => chosen.push((*step).to_owned()),
            None => break,
        }
    }
    let mut chosen = chosen.into_iter();
    std::array::from_fn(|_| chosen.next().unwrap_or_default())
}

fn summary(evaluation: &Evaluation, weakest: Option<&Area>, metrics: &SpeechMetrics) -> String {
    let mut text = format!(
        "{} answer ({}/100)",
        evaluation.overall_verdict.as_str(),
        evaluation.overall_score
    );
    match weakest {
        Some(area) if area.score < WEAKNESS_CUTOFF => {
            text.push_str(&format!("; the biggest gain is in {}.", area.label));
        }
        _ if evaluation.overall_verdict == Verdict::Strong => {
            text.push_str("; keep doing what you are doing.");
        }
        _ => text.push_str("; small gains across the board will lift it."),
    }
    if metrics.metrics_reliability == MetricsReliability::Low {
        text.push_str(" The recording was short, so treat the delivery metrics as rough.");
    }
    text
}

pub fn compose(evaluation: &Evaluation, metrics: &SpeechMetrics) -> EnhancedCoachingFeedback {
    if evaluation.is_fallback {
        return fallback_feedback(metrics);
    }

    let clarity_sub_metrics = ClaritySubMetrics::from_metrics(metrics);
    let areas = areas(evaluation, &clarity_sub_metrics);

    let mut strengths: Vec<String> = areas
        .iter()
        .filter(|a| a.score >= STRENGTH_CUTOFF)
        .map(|a| a.strength.to_owned())
        .collect();
    let mut weaknesses: Vec<String> = areas
        .iter()
        .filter(|a| a.score < WEAKNESS_CUTOFF)
        .map(|a| a.weakness.to_owned())
        .collect();
    if strengths.is_empty() {
        strengths.push(NEUTRAL_STRENGTH.to_owned());
    }
    if weaknesses.is_empty() {
        weaknesses.push(NEUTRAL_WEAKNESS.to_owned());
    }

    let weakest = areas.iter().min_by_key(|a| a.score);
    let summary = summary(evaluation, weakest, metrics);
    let actionable_steps = pick_three(candidate_steps(evaluation, metrics));

    tracing::debug!(
        target: LOG_TARGET,
        strengths = strengths.len(),
        weaknesses = weaknesses.len(),
        "coaching feedback composed"
    );

    EnhancedCoachingFeedback {
        strengths,
        weaknesses,
        actionable_steps,
        clarity_sub_metrics,
        summary,
    }
}

/// Fixed generic feedback for when no content evaluation is available.
pub fn fallback_feedback(metrics: &SpeechMetrics) -> EnhancedCoachingFeedback {
    tracing::warn!(target: LOG_TARGET, "using generic coaching feedback");
    EnhancedCoachingFeedback {
        strengths: FALLBACK_STRENGTHS.iter().map(|s| (*s).to_owned()).collect(),
        weaknesses: FALLBACK_WEAKNESSES.iter().map(|s| (*s).to_owned()).collect(),
        actionable_steps: std::array::from_fn(|i| GENERIC_STEPS[i].to_owned()),
        clarity_sub_metrics: ClaritySubMetrics::from_metrics(metrics),
        summary: "Detailed feedback is unavailable right now; the delivery metrics below are \
                  still accurate."
            .to_owned(),
    }
}
