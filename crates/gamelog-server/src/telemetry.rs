// crates/gamelog-server/src/telemetry.rs
// ============================================================================
// Module: Telemetry
// Description: Process-wide tracing subscriber installation.
// Purpose: Emit structured logs in plain or JSON form to stderr.
// Dependencies: tracing-subscriber, gamelog-config
// ============================================================================

//! ## Overview
//! `RUST_LOG` takes precedence over `logging.level` when set. Logs go to
//! stderr so stdout stays free for command output.

use gamelog_config::LogFormat;
use gamelog_config::LoggingConfig;
use tracing_subscriber::EnvFilter;

use crate::server::ServerError;

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns [`ServerError::Init`] when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = match config.format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| ServerError::Init(format!("logging init failed: {err}")))
}
