//! Tracing setup.
//!
//! `EXAM_MCQ_LOG` holds the filter directives (default `warn`). Plain CLI
//! commands log to stderr; the terminal UI owns the screen, so it logs to a
//! file instead.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "EXAM_MCQ_LOG";
const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Appends to `path`; falls back to stderr if the file cannot be opened.
pub fn init_file(path: &Path) {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        Err(e) => {
            init_stderr();
            tracing::warn!(path = %path.display(), error = %e, "log file unavailable, using stderr");
        }
    }
}
