// File: src/logging.rs
use crate::paths::AppPaths;
use anyhow::{Context, Result, anyhow};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Sends `tracing` output to the log file. The terminal belongs to the UI, so nothing goes to stderr.
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init_tracing(default_level: &str) -> Result<()> {
    let path = AppPaths::get_log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log_level filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}
