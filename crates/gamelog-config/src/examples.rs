// crates/gamelog-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic starting point for operators and `config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `gamelog.toml`. The example must always parse and
//! validate; a test in this crate enforces it.

/// Returns a canonical example `gamelog.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "0.0.0.0:8000"
max_body_bytes = 1048576

[logging]
level = "info"
format = "plain"

[event_store]
type = "object_store"
bucket = "game-logs"
prefix = "prod"
# region = "us-east-1"
# endpoint = "https://s3.example.com"
# force_path_style = false
# allow_http = false
max_object_bytes = 4194304

[score_store]
type = "sqlite"
path = "gamelog.db"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000

[secrets]
type = "sqlite"
"#,
    )
}
