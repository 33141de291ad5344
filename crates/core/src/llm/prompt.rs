use crate::llm::{CompletionRequest, JudgeTask};
use crate::metrics::SpeechMetrics;
use crate::timeline::QuestionCategory;

const PREAMBLE: &str = "You are an experienced interview coach evaluating a spoken answer \
from a transcript. Judge substance only; delivery is measured separately. \
Respond with a single JSON object and nothing else.";

/// What every judgment prompt is built from.
#[derive(Clone, Copy, Debug)]
pub struct PromptContext<'a> {
    pub question: &'a str,
    pub transcript: &'a str,
    pub category: QuestionCategory,
    pub metrics: Option<&'a SpeechMetrics>,
}

fn schema_for(task: JudgeTask) -> &'static str {
    match task {
        JudgeTask::SemanticSimilarity => {
            "First write an ideal answer to the question for yourself. Then compare the \
             candidate's answer to it in meaning, not wording. Return \
             {\"score\": <0-100>, \"explanation\": \"<one or two sentences>\", \
             \"idealAnswerSummary\": \"<the ideal answer in at most two sentences>\"}."
        }
        JudgeTask::KeywordExtraction => {
            "List the technical terms and concepts a strong answer to this question would \
             mention. Use short lower-case phrases of one to three words. Return \
             {\"expectedKeywords\": [\"...\", ...]} with 5 to 12 entries. Do not judge the \
             candidate's answer."
        }
        JudgeTask::ContextCompleteness => {
            "List the aspects a complete answer to this question must cover (for behavioral \
             questions: situation, task, action, result) and mark whether the candidate's \
             answer covers each. Return \
             {\"aspects\": [{\"aspect\": \"<name>\", \"covered\": true|false}, ...]}."
        }
    }
}

fn metrics_line(metrics: &SpeechMetrics) -> String {
    format!(
        "Delivery metrics (for context only): {} words, {} wpm, {} filler words, {} long pauses.",
        metrics.word_count, metrics.wpm, metrics.filler_count, metrics.hesitation_count
    )
}

pub fn build(task: JudgeTask, ctx: &PromptContext<'_>) -> CompletionRequest {
    let system = format!("{PREAMBLE}\n\n{}", schema_for(task));

    let mut user = format!(
        "Question category: {}\nQuestion: {}\n",
        ctx.category.as_str(),
        ctx.question.trim()
    );
    if task != JudgeTask::KeywordExtraction {
        user.push_str(&format!(
            "Candidate answer transcript:\n\"\"\"\n{}\n\"\"\"\n",
            ctx.transcript.trim()
        ));
        if let Some(metrics) = ctx.metrics {
            user.push_str(&metrics_line(metrics));
            user.push('\n');
        }
    }

    CompletionRequest { task, system, user }
}
