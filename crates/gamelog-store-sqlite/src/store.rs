// crates/gamelog-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Score Store
// Description: Durable ScoreStore and SecretResolver backed by SQLite.
// Purpose: Persist score records and read provisioned game secrets.
// Dependencies: gamelog-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! Scores live in a `scores` table keyed by record id; registration is an
//! upsert, so re-registering an id overwrites it in place (last writer wins).
//! Leaderboards are served by an index over `(game_name, score, timestamp)`.
//! Game secrets live in a `games` table whose `secret` column is untyped: any
//! value other than TEXT resolves to the empty secret. The schema version is
//! tracked in `store_meta` and unknown versions fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use gamelog_core::GameName;
use gamelog_core::ScoreId;
use gamelog_core::ScoreRecord;
use gamelog_core::ScoreRegistration;
use gamelog_core::ScoreStore;
use gamelog_core::ScoreStoreError;
use gamelog_core::SecretError;
use gamelog_core::SecretResolver;
use gamelog_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::types::Value;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` database.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default tuning.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }

    /// Validates the configuration without touching the filesystem beyond
    /// checking whether `path` names a directory.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] when the path is unusable.
    pub fn validate(&self) -> Result<(), SqliteStoreError> {
        validate_store_path(&self.path)
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding secret values.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for ScoreStoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Db(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Store(message)
            }
        }
    }
}

impl From<SqliteStoreError> for SecretError {
    fn from(error: SqliteStoreError) -> Self {
        Self::Read(error.to_string())
    }
}

// ============================================================================
// SECTION: Database
// ============================================================================

/// Shared `SQLite` database handle.
#[derive(Debug)]
pub struct SqliteDatabase {
    /// Serialized connection.
    connection: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Opens (creating if needed) the database and initializes its schema.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid, the database
    /// cannot be opened, or the schema version is unsupported.
    pub fn open(config: &SqliteStoreConfig) -> Result<Arc<Self>, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Arc::new(Self {
            connection: Mutex::new(connection),
        }))
    }

    /// Provisions or replaces a game's secret.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Db`] when the write fails.
    pub fn provision_secret(
        &self,
        game_name: &GameName,
        secret: &str,
    ) -> Result<(), SqliteStoreError> {
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO games (game_name, secret) VALUES (?1, ?2)
                     ON CONFLICT(game_name) DO UPDATE SET secret = excluded.secret",
                    params![game_name.as_str(), secret],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
    }

    /// Runs a closure with exclusive access to the connection.
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))?;
        f(&guard)
    }

    /// Executes a trivial query to confirm the database is usable.
    fn ping(&self) -> Result<(), SqliteStoreError> {
        self.with_connection(|connection| {
            connection
                .query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
    }
}

// ============================================================================
// SECTION: Score Store
// ============================================================================

/// `SQLite`-backed score store.
#[derive(Debug, Clone)]
pub struct SqliteScoreStore {
    /// Shared database handle.
    database: Arc<SqliteDatabase>,
}

impl SqliteScoreStore {
    /// Creates a score store over an open database.
    #[must_use]
    pub const fn new(database: Arc<SqliteDatabase>) -> Self {
        Self {
            database,
        }
    }

    /// Opens the database at `config.path` and returns a score store over it.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        Ok(Self::new(SqliteDatabase::open(config)?))
    }

    /// Fetches a single record by id.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails or the row is invalid.
    pub fn get(&self, id: &ScoreId) -> Result<Option<ScoreRecord>, SqliteStoreError> {
        self.database.with_connection(|connection| {
            let row = connection
                .query_row(
                    "SELECT id, game_name, player_id, score, timestamp_nanos
                     FROM scores WHERE id = ?1",
                    params![id.as_str()],
                    read_score_row,
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            row.map(decode_score_row).transpose()
        })
    }
}

impl ScoreStore for SqliteScoreStore {
    fn register(&self, registration: ScoreRegistration) -> Result<ScoreRecord, ScoreStoreError> {
        let record = registration.into_record();
        let nanos = record
            .timestamp
            .unix_nanos()
            .map_err(|err| ScoreStoreError::Invalid(err.to_string()))?;
        let text =
            record.timestamp.to_rfc3339().map_err(|err| ScoreStoreError::Invalid(err.to_string()))?;
        self.database.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO scores (id, game_name, player_id, score, timestamp_nanos, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(id) DO UPDATE SET
                        game_name = excluded.game_name,
                        player_id = excluded.player_id,
                        score = excluded.score,
                        timestamp_nanos = excluded.timestamp_nanos,
                        timestamp = excluded.timestamp",
                    params![
                        record.id.as_str(),
                        record.game_name.as_str(),
                        record.player_id,
                        record.score,
                        nanos,
                        text
                    ],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })?;
        Ok(record)
    }

    fn list_top(
        &self,
        game_name: &GameName,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, ScoreStoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self.database.with_connection(|connection| {
            let mut statement = connection
                .prepare(
                    "SELECT id, game_name, player_id, score, timestamp_nanos
                     FROM scores
                     WHERE game_name = ?1
                     ORDER BY score DESC, timestamp_nanos DESC, id ASC
                     LIMIT ?2",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(params![game_name.as_str(), limit], read_score_row)
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(rows)
        })?;
        rows.into_iter()
            .map(|row| decode_score_row(row).map_err(ScoreStoreError::from))
            .collect()
    }

    fn readiness(&self) -> Result<(), ScoreStoreError> {
        self.database.ping().map_err(ScoreStoreError::from)
    }
}

/// Raw score row as read from `SQLite`.
type ScoreRow = (String, String, String, i64, i64);

/// Reads the raw columns of a score row.
fn read_score_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScoreRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

/// Decodes a raw score row, failing closed on invalid data.
fn decode_score_row(row: ScoreRow) -> Result<ScoreRecord, SqliteStoreError> {
    let (id, game_name, player_id, score, nanos) = row;
    let game_name =
        GameName::parse(&game_name).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    let timestamp =
        Timestamp::from_unix_nanos(nanos).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    Ok(ScoreRecord {
        id: ScoreId::new(id),
        game_name,
        timestamp,
        player_id,
        score,
    })
}

// ============================================================================
// SECTION: Secret Resolver
// ============================================================================

/// `SQLite`-backed secret resolver over the `games` table.
#[derive(Debug, Clone)]
pub struct SqliteSecretResolver {
    /// Shared database handle.
    database: Arc<SqliteDatabase>,
}

impl SqliteSecretResolver {
    /// Creates a resolver over an open database.
    #[must_use]
    pub const fn new(database: Arc<SqliteDatabase>) -> Self {
        Self {
            database,
        }
    }
}

impl SecretResolver for SqliteSecretResolver {
    fn get_secret(&self, game_name: &GameName) -> Result<String, SecretError> {
        let value = self.database.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT secret FROM games WHERE game_name = ?1",
                    params![game_name.as_str()],
                    |row| row.get::<_, Value>(0),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))
        })?;
        match value {
            None => Err(SecretError::GameNotFound(game_name.to_string())),
            Some(Value::Text(secret)) => Ok(secret),
            Some(_) => Ok(String::new()),
        }
    }

    fn readiness(&self) -> Result<(), SecretError> {
        self.database.ping().map_err(SecretError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    if path
        .components()
        .any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(SqliteStoreError::Invalid(
            "store path contains an overlong component".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS games (
                    game_name TEXT PRIMARY KEY NOT NULL,
                    secret
                );
                CREATE TABLE IF NOT EXISTS scores (
                    id TEXT PRIMARY KEY NOT NULL,
                    game_name TEXT NOT NULL,
                    player_id TEXT NOT NULL,
                    score INTEGER NOT NULL,
                    timestamp_nanos INTEGER NOT NULL,
                    timestamp TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_scores_rank
                    ON scores (game_name, score DESC, timestamp_nanos DESC, id);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(other) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version {other} (expected {SCHEMA_VERSION})"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
