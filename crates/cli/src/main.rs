#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use speech_coach_core::config::{
    resolve_api_key, resolve_optional_string, resolve_string_with_default, AnalysisConfig, Env,
    LlmConfig, StdEnv, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_WINDOW_SIZE_SEC,
    ENV_LLM_API_KEY, ENV_LLM_BASE_URL, ENV_LLM_FALLBACK_MODEL, ENV_LLM_MODEL,
};
use speech_coach_core::llm::{LlmClient, StrategyChain, UnavailableClient};
use speech_coach_core::timeline::AnalysisRequest;
use speech_coach_core::SpeechAnalyzer;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "speech-coach")]
#[command(about = "Delivery metrics and coaching for a transcribed interview answer")]
struct Args {
    /// Analysis request JSON (transcript, words, durationSec, question); `-` reads stdin.
    #[arg(long)]
    input: PathBuf,

    /// Overrides the question in the request file.
    #[arg(long)]
    question: Option<String>,

    /// Print only the objective metrics and skip the LLM entirely.
    #[arg(long)]
    metrics_only: bool,

    #[arg(long)]
    pretty: bool,

    #[arg(long)]
    llm_api_key: Option<String>,

    #[arg(long)]
    llm_base_url: Option<String>,

    #[arg(long)]
    llm_model: Option<String>,

    #[arg(long)]
    llm_fallback_model: Option<String>,

    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE_SEC)]
    window_size_sec: f64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let mut request = read_request(&args.input)?;
    if let Some(question) = args.question.clone() {
        request.question = question;
    }

    let mut config = AnalysisConfig::default();
    config.metrics.window_size_sec = args.window_size_sec;
    config.validate().context("invalid analysis configuration")?;

    if args.metrics_only {
        let analyzer = SpeechAnalyzer::new(UnavailableClient::new(), config);
        return print_json(&analyzer.metrics(&request), args.pretty);
    }

    let env = StdEnv;
    let client = build_client(&args, &env)?;
    let analyzer = SpeechAnalyzer::new(client, config);
    let response = analyzer.analyze(&request).await;
    print_json(&response, args.pretty)
}

fn read_request(path: &Path) -> anyhow::Result<AnalysisRequest> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).context("request is not a valid analysis request")
}

fn build_client(args: &Args, env: &impl Env) -> anyhow::Result<Arc<dyn LlmClient>> {
    let Some(api_key) = resolve_api_key(args.llm_api_key.clone(), ENV_LLM_API_KEY, env)? else {
        tracing::warn!("no LLM api key configured; content evaluation will fall back");
        return Ok(Arc::new(UnavailableClient::new()));
    };

    let base_url = resolve_string_with_default(
        args.llm_base_url.clone(),
        ENV_LLM_BASE_URL,
        env,
        DEFAULT_LLM_BASE_URL,
    );
    let model =
        resolve_string_with_default(args.llm_model.clone(), ENV_LLM_MODEL, env, DEFAULT_LLM_MODEL);
    let fallback_model =
        resolve_optional_string(args.llm_fallback_model.clone(), ENV_LLM_FALLBACK_MODEL, env);

    let llm = LlmConfig::new(&base_url, model, fallback_model, Some(api_key))?;
    let chain = StrategyChain::from_config(&llm)?;
    tracing::info!(strategies = ?chain.labels(), "llm configured");
    Ok(Arc::new(chain))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
