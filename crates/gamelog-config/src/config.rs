// crates/gamelog-config/src/config.rs
// ============================================================================
// Module: Game Log Configuration
// Description: Configuration loading and validation for the game log server.
// Purpose: Provide strict, fail-closed config parsing with safe defaults.
// Dependencies: gamelog-core, gamelog-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from `gamelog.toml` (or the path named by
//! `GAMELOG_CONFIG`, or an explicit CLI path). After parsing, the deployment
//! environment variables `HOST`, `PORT`, and `BUCKET` are applied, then the
//! whole document is validated. Environment access goes through a lookup
//! closure so overrides can be exercised without mutating process state.
//!
//! Security posture: config inputs are untrusted; validation fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use gamelog_core::GameName;
use gamelog_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_NAME: &str = "gamelog.toml";
/// Environment variable naming the config path.
pub const CONFIG_ENV_VAR: &str = "GAMELOG_CONFIG";
/// Environment variable overriding the listen host.
pub const HOST_ENV_VAR: &str = "HOST";
/// Environment variable overriding the listen port.
pub const PORT_ENV_VAR: &str = "PORT";
/// Environment variable overriding the event bucket.
pub const BUCKET_ENV_VAR: &str = "BUCKET";
/// Maximum size of a config file in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum path component length.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;
/// Default listen address (all interfaces, as container platforms expect).
const DEFAULT_BIND: &str = "0.0.0.0:8000";
/// Default request body limit.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Upper bound for the request body limit.
const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Default cap on a single stored event object.
pub const DEFAULT_MAX_OBJECT_BYTES: usize = 4 * 1024 * 1024;
/// Growth factor from request body to stored event (payload value plus text).
const STORED_EVENT_EXPANSION: usize = 3;
/// Allowance for the stored event's fields besides the payload.
const STORED_EVENT_ENVELOPE_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Game log server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameLogConfig {
    /// HTTP listener configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Telemetry event storage backend.
    #[serde(default)]
    pub event_store: EventStoreConfig,
    /// Leaderboard storage backend.
    #[serde(default)]
    pub score_store: ScoreStoreConfig,
    /// Per-game shared secret source.
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl GameLogConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |name| env::var(name).ok())
    }

    /// Loads configuration resolving environment variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolved = resolve_path(path, &lookup)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML document without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `HOST`, `PORT`, and `BUCKET` overrides.
    ///
    /// An unparsable `PORT` keeps the configured port. `BUCKET` only applies
    /// to the object-store event backend.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = non_empty(lookup(HOST_ENV_VAR));
        let port = lookup(PORT_ENV_VAR).and_then(|value| value.trim().parse::<u16>().ok());
        if host.is_some() || port.is_some() {
            let (current_host, current_port) = split_bind(&self.server.bind);
            let host = host.unwrap_or(current_host);
            let port = port.or(current_port).unwrap_or(DEFAULT_PORT);
            self.server.bind = join_host_port(&host, port);
        }
        if let Some(bucket) = non_empty(lookup(BUCKET_ENV_VAR))
            && let EventStoreConfig::ObjectStore(object_store) = &mut self.event_store
        {
            object_store.bucket = bucket;
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.event_store.validate()?;
        self.validate_object_headroom()?;
        self.score_store.validate()?;
        self.secrets.validate(&self.score_store)?;
        Ok(())
    }

    /// Requires the event object cap to hold any event whose request fit the
    /// body limit.
    fn validate_object_headroom(&self) -> Result<(), ConfigError> {
        let max_object_bytes = match &self.event_store {
            EventStoreConfig::Memory => return Ok(()),
            EventStoreConfig::Filesystem(config) => config.max_object_bytes,
            EventStoreConfig::ObjectStore(config) => config.max_object_bytes,
        };
        let required = self
            .server
            .max_body_bytes
            .saturating_mul(STORED_EVENT_EXPANSION)
            .saturating_add(STORED_EVENT_ENVELOPE_BYTES);
        if max_object_bytes < required {
            return Err(ConfigError::Invalid(format!(
                "event_store.max_object_bytes must be at least {required} for server.max_body_bytes = {}",
                self.server.max_body_bytes
            )));
        }
        Ok(())
    }

    /// Returns the `SQLite` settings used for secret resolution, if any.
    ///
    /// A secrets section without a path reuses the score store database.
    #[must_use]
    pub fn secrets_database(&self) -> Option<SqliteStoreConfig> {
        let SecretsConfig::Sqlite {
            path,
        } = &self.secrets
        else {
            return None;
        };
        match (path, &self.score_store) {
            (None, ScoreStoreConfig::Sqlite(config)) => Some(config.clone()),
            (Some(path), ScoreStoreConfig::Sqlite(config)) if &config.path == path => {
                Some(config.clone())
            }
            (Some(path), _) => Some(SqliteStoreConfig::new(path.clone())),
            (None, ScoreStoreConfig::Memory) => None,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address as `host:port`.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body size.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Validates listener settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let bind = self.bind.trim();
        if bind.parse::<SocketAddr>().is_err() {
            let (host, port) = split_bind(bind);
            if host.is_empty() || port.is_none() {
                return Err(ConfigError::Invalid(format!("invalid server.bind address: {bind}")));
            }
        }
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between 1 and {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Returns the default listen address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level emitted when `RUST_LOG` is unset.
    #[serde(default)]
    pub level: LogLevel,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

// ============================================================================
// SECTION: Event Store
// ============================================================================

/// Event store backend selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventStoreConfig {
    /// Process-local store; events are lost on exit.
    #[default]
    Memory,
    /// Local directory store.
    Filesystem(FilesystemEventStoreConfig),
    /// S3-compatible object storage.
    ObjectStore(ObjectStoreConfig),
}

impl EventStoreConfig {
    /// Validates the selected backend.
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Memory => Ok(()),
            Self::Filesystem(config) => config.validate(),
            Self::ObjectStore(config) => config.validate(),
        }
    }
}

/// Filesystem event store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesystemEventStoreConfig {
    /// Root directory for event objects.
    pub root: PathBuf,
    /// Optional key prefix beneath the root.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Maximum serialized event size.
    #[serde(default = "default_max_object_bytes")]
    pub max_object_bytes: usize,
}

impl FilesystemEventStoreConfig {
    /// Validates filesystem settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("event_store.root", &self.root.to_string_lossy())?;
        if let Some(prefix) = &self.prefix {
            validate_object_store_prefix(prefix)?;
        }
        validate_max_object_bytes(self.max_object_bytes)
    }
}

/// S3-compatible object-store event store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreConfig {
    /// Bucket name (may be supplied by `BUCKET`).
    #[serde(default)]
    pub bucket: String,
    /// Optional region (defaults to the AWS environment chain).
    #[serde(default)]
    pub region: Option<String>,
    /// Optional S3-compatible endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Optional key prefix inside the bucket.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Force path-style addressing.
    #[serde(default)]
    pub force_path_style: bool,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
    /// Maximum serialized event size.
    #[serde(default = "default_max_object_bytes")]
    pub max_object_bytes: usize,
}

impl ObjectStoreConfig {
    /// Validates object-store settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when object-store settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "event_store.bucket must be set (or provide BUCKET)".to_string(),
            ));
        }
        if let Some(endpoint) = &self.endpoint {
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "event_store.endpoint must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "event_store.endpoint uses http:// without allow_http".to_string(),
                ));
            }
        }
        if let Some(prefix) = &self.prefix {
            validate_object_store_prefix(prefix)?;
        }
        validate_max_object_bytes(self.max_object_bytes)
    }
}

/// Returns the default event object cap.
const fn default_max_object_bytes() -> usize {
    DEFAULT_MAX_OBJECT_BYTES
}

// ============================================================================
// SECTION: Score Store
// ============================================================================

/// Score store backend selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreStoreConfig {
    /// Process-local store.
    #[default]
    Memory,
    /// `SQLite` database.
    Sqlite(SqliteStoreConfig),
}

impl ScoreStoreConfig {
    /// Validates the selected backend.
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Memory => Ok(()),
            Self::Sqlite(config) => {
                validate_path_string("score_store.path", &config.path.to_string_lossy())?;
                config.validate().map_err(|err| ConfigError::Invalid(err.to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Secrets
// ============================================================================

/// Shared secret source selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretsConfig {
    /// Secrets listed inline.
    Static {
        /// Registered games.
        #[serde(default)]
        games: Vec<StaticGameSecret>,
    },
    /// Secrets read from the `games` table of a `SQLite` database.
    Sqlite {
        /// Database path; defaults to the score store database.
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self::Static {
            games: Vec::new(),
        }
    }
}

impl SecretsConfig {
    /// Validates the secret source against the score store selection.
    fn validate(&self, score_store: &ScoreStoreConfig) -> Result<(), ConfigError> {
        match self {
            Self::Static {
                games,
            } => {
                let mut seen = BTreeSet::new();
                for game in games {
                    if !seen.insert(game.name.as_str()) {
                        return Err(ConfigError::Invalid(format!(
                            "duplicate secrets entry for game {}",
                            game.name
                        )));
                    }
                }
                Ok(())
            }
            Self::Sqlite {
                path: Some(path),
            } => validate_path_string("secrets.path", &path.to_string_lossy()),
            Self::Sqlite {
                path: None,
            } => match score_store {
                ScoreStoreConfig::Sqlite(_) => Ok(()),
                ScoreStoreConfig::Memory => Err(ConfigError::Invalid(
                    "secrets.path is required unless score_store is sqlite".to_string(),
                )),
            },
        }
    }
}

/// Inline game secret entry.
#[derive(Clone, Deserialize)]
pub struct StaticGameSecret {
    /// Game name.
    pub name: GameName,
    /// Shared secret; absent means the empty secret.
    #[serde(default)]
    pub secret: Option<String>,
}

impl std::fmt::Debug for StaticGameSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticGameSecret")
            .field("name", &self.name)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = non_empty(lookup(CONFIG_ENV_VAR)) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.to_string_lossy().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an object key prefix.
fn validate_object_store_prefix(value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid("event_store.prefix must be non-empty".to_string()));
    }
    if trimmed.contains('\\') {
        return Err(ConfigError::Invalid(
            "event_store.prefix must not contain backslashes".to_string(),
        ));
    }
    if trimmed.starts_with('/') {
        return Err(ConfigError::Invalid("event_store.prefix must be relative".to_string()));
    }
    for segment in trimmed.trim_end_matches('/').split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(ConfigError::Invalid(
                "event_store.prefix contains an invalid segment".to_string(),
            ));
        }
        if segment.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("event_store.prefix segment too long".to_string()));
        }
    }
    Ok(())
}

/// Validates an event object size cap.
fn validate_max_object_bytes(value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(
            "event_store.max_object_bytes must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Returns the trimmed value when present and non-empty.
fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Splits a bind string into host and port.
fn split_bind(bind: &str) -> (String, Option<u16>) {
    if let Ok(addr) = bind.parse::<SocketAddr>() {
        return (addr.ip().to_string(), Some(addr.port()));
    }
    match bind.rsplit_once(':') {
        Some((host, port)) => {
            let host = host.trim_start_matches('[').trim_end_matches(']');
            (host.to_string(), port.parse().ok())
        }
        None => (bind.to_string(), None),
    }
}

/// Joins a host and port, bracketing IPv6 literals.
fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') { format!("[{host}]:{port}") } else { format!("{host}:{port}") }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
