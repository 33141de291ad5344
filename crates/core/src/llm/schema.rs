//! Typed, validated shapes of the JSON the model must return.
//!
//! Parsing goes through serde into these structs and then through their
//! `validator` rules; anything that fails either step is an
//! [`LlmError::Schema`](crate::llm::LlmError::Schema).

use crate::llm::LlmError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SemanticJudgment {
    #[validate(range(min = 0.0, max = 100.0))]
    pub score: f64,
    #[validate(length(min = 1))]
    pub explanation: String,
    #[serde(alias = "ideal_answer_summary")]
    #[validate(length(min = 1))]
    pub ideal_answer_summary: String,
}

#[derive(Clone, Debug, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeywordExtraction {
    #[serde(alias = "expected_keywords", alias = "keywords")]
    #[validate(length(min = 1, max = 25), custom(function = "no_blank_entries"))]
    pub expected_keywords: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AspectJudgment {
    pub aspect: String,
    pub covered: bool,
}

#[derive(Clone, Debug, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextJudgment {
    #[validate(length(min = 1, max = 25), custom(function = "no_blank_aspects"))]
    pub aspects: Vec<AspectJudgment>,
}

#[allow(clippy::ptr_arg)]
fn no_blank_entries(entries: &Vec<String>) -> Result<(), ValidationError> {
    if entries.iter().any(|e| e.trim().is_empty()) {
        return Err(ValidationError::new("blank_entry"));
    }
    Ok(())
}

#[allow(clippy::ptr_arg)]
fn no_blank_aspects(aspects: &Vec<AspectJudgment>) -> Result<(), ValidationError> {
    if aspects.iter().any(|a| a.aspect.trim().is_empty()) {
        return Err(ValidationError::new("blank_aspect"));
    }
    Ok(())
}

/// Cuts the outermost JSON object out of a reply, tolerating code fences and
/// chatter around it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_validated<T>(text: &str) -> Result<T, LlmError>
where
    T: DeserializeOwned + Validate,
{
    let json = extract_json_object(text)
        .ok_or_else(|| LlmError::Schema("no JSON object in response".to_owned()))?;
    let value: T = serde_json::from_str(json).map_err(|e| LlmError::Schema(e.to_string()))?;
    value
        .validate()
        .map_err(|e| LlmError::Schema(e.to_string()))?;
    Ok(value)
}
