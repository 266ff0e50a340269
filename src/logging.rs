//! Tracing setup.
//!
//! The interactive loop owns stdout, so `run` logs to a file in the data
//! directory; headless subcommands log to stderr. Both honor `RUST_LOG`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()))
}

/// File-backed logging for the interactive session.
pub fn init_file_logging(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log dir {}", parent.display()))?;
    }
    let log_file = std::fs::File::create(log_path)
        .with_context(|| format!("failed to create log file {}", log_path.display()))?;

    let fmt_layer = fmt::layer().with_writer(Arc::new(log_file)).with_ansi(false);
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter())
        .init();
    Ok(())
}

/// Stderr logging for headless subcommands.
pub fn init_stderr_logging() {
    let fmt_layer = fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter())
        .init();
}
