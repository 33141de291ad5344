#![deny(warnings)]

pub mod coaching;
pub mod config;
pub mod evaluation;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod timeline;
pub mod util;

pub use pipeline::{SpeechAnalysisResponse, SpeechAnalyzer};
