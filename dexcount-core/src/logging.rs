//! Structured logging using **tracing**.
//!
//! Counting runs on rayon worker threads; tracing events carry the thread
//! id and target, so interleaved per-dependency events stay attributable.
//! Output goes to stderr, keeping stdout for the report.

use tracing::{error, info, warn};

/// Initializes the global tracing subscriber.
///
/// Call once at startup. Emits JSON lines on stderr.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=dexcount_core=debug`).
///   Defaults to `warn` so progress output is not drowned out.
pub fn init_structured_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_current_span(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs a warning event.
pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

/// Logs an info event.
pub fn log_info(message: &str) {
    info!(detail = %message);
}

/// Logs an error event.
pub fn log_error(message: &str) {
    error!(detail = %message);
}
