//! Logging initialisation.
//!
//! Logs go to stderr so the report binary's JSON on stdout stays clean.

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::EngineConfig;

/// Builds the log filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &EngineConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Installs the global subscriber. JSON output when the config asks for it.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(config: &EngineConfig) {
    let builder = fmt()
        .with_env_filter(env_filter(config))
        .with_writer(io::stderr)
        .with_target(true);

    let result = if config.json_logs() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
