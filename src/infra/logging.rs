use std::{fs::OpenOptions, path::Path, sync::Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Default filter when RUST_LOG is unset
const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber: stderr, or `log_file` (appended, no ANSI).
pub fn init(log_file: Option<&Path>) -> Result<()>
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = match log_file
    {
        Some(path) =>
        {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
}
