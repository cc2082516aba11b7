//! Logging setup.

use anyhow::{Context, Result};
use clap::ValueEnum;

/// Environment variable that overrides `--log-level` with a full filter.
pub const LOG_ENV: &str = "PNLBOARD_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

pub fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .with_context(|| format!("invalid log filter: {filter}"))?;

    // stdout carries report output
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
    Ok(())
}
