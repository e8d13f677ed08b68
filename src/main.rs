use std::io;
use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use portfolio_advisor::ResponseGenerator;
use portfolio_advisor::config::{self, Config};
use portfolio_advisor::providers::groq::GroqProvider;
use portfolio_advisor::sample::{STRICT_SYSTEM_PROMPT, sample_metrics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Optional first argument: path to a TOML config file.
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Config::load(&path).unwrap_or_else(|e| {
            tracing::warn!("{e}; using default endpoint");
            Config::default()
        }),
        None => Config::default(),
    };

    let provider = GroqProvider::new(&config, config::api_key_from_env());
    let generator = ResponseGenerator::new(provider);

    let user_prompt =
        serde_json::to_string(&sample_metrics()).context("encoding sample payload")?;
    let response = generator.generate(STRICT_SYSTEM_PROMPT, &user_prompt).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
