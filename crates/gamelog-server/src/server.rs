// crates/gamelog-server/src/server.rs
// ============================================================================
// Module: Game Log Server
// Description: Backend selection and HTTP listener lifecycle.
// Purpose: Turn a validated configuration into a running API server.
// Dependencies: gamelog-config, gamelog-core, gamelog-store-*, axum, tokio
// ============================================================================

//! ## Overview
//! [`GameLogServer::from_config`] picks exactly one implementation per
//! storage role: event store (memory, filesystem, S3), score store (memory,
//! `SQLite`), and secret resolver (static, `SQLite`). When secrets live in the
//! score database the connection is shared.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use gamelog_config::EventStoreConfig;
use gamelog_config::GameLogConfig;
use gamelog_config::ScoreStoreConfig;
use gamelog_config::SecretsConfig;
use gamelog_core::GameLogService;
use gamelog_core::GameSecret;
use gamelog_core::InMemoryEventStore;
use gamelog_core::InMemoryScoreStore;
use gamelog_core::InMemorySecretResolver;
use gamelog_core::SharedEventStore;
use gamelog_core::SharedScoreStore;
use gamelog_core::SharedSecretResolver;
use gamelog_core::SystemClock;
use gamelog_store_object::FilesystemObjectStoreClient;
use gamelog_store_object::ObjectStoreEventStore;
use gamelog_store_object::S3ObjectStoreClient;
use gamelog_store_object::S3Settings;
use gamelog_store_sqlite::SqliteDatabase;
use gamelog_store_sqlite::SqliteScoreStore;
use gamelog_store_sqlite::SqliteSecretResolver;
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Game log API server.
pub struct GameLogServer {
    /// Validated configuration.
    config: GameLogConfig,
    /// Request service over the selected backends.
    service: GameLogService,
}

impl GameLogServer {
    /// Builds a server, opening every configured backend and checking that
    /// each one is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or a backend
    /// cannot be opened or is not ready.
    pub fn from_config(config: GameLogConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let service = build_service(&config)?;
        service
            .readiness()
            .map_err(|err| ServerError::Init(format!("backend not ready: {err}")))?;
        Ok(Self {
            config,
            service,
        })
    }

    /// Returns the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.service.clone(), self.config.server.max_body_bytes)
    }

    /// Binds the configured address and serves until interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let bind = self.config.server.bind.clone();
        let listener = TcpListener::bind(bind.as_str())
            .await
            .map_err(|err| ServerError::Transport(format!("bind {bind} failed: {err}")))?;
        self.serve_listener(listener).await
    }

    /// Serves on an already-bound listener until interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when serving fails.
    pub async fn serve_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        let address = listener
            .local_addr()
            .map_err(|err| ServerError::Transport(err.to_string()))?;
        info!(%address, "game log server listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))?;
        info!("game log server stopped");
        Ok(())
    }
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler, run until the listener fails.
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// SECTION: Backend Selection
// ============================================================================

/// Builds the request service for a configuration.
///
/// # Errors
///
/// Returns [`ServerError::Init`] when a backend cannot be opened.
pub fn build_service(config: &GameLogConfig) -> Result<GameLogService, ServerError> {
    let events = build_event_store(&config.event_store)?;
    let (scores, score_database) = build_score_store(&config.score_store)?;
    let secrets = build_secret_resolver(config, score_database)?;
    Ok(GameLogService::new(events, scores, secrets, Arc::new(SystemClock)))
}

/// Builds the event store.
fn build_event_store(config: &EventStoreConfig) -> Result<SharedEventStore, ServerError> {
    let store: SharedEventStore = match config {
        EventStoreConfig::Memory => {
            info!(backend = "memory", "event store selected");
            Arc::new(InMemoryEventStore::new())
        }
        EventStoreConfig::Filesystem(fs_config) => {
            let client = FilesystemObjectStoreClient::new(&fs_config.root)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            info!(backend = "filesystem", root = %fs_config.root.display(), "event store selected");
            Arc::new(
                ObjectStoreEventStore::new(
                    Arc::new(client),
                    fs_config.prefix.as_deref(),
                    fs_config.max_object_bytes,
                )
                .map_err(|err| ServerError::Init(err.to_string()))?,
            )
        }
        EventStoreConfig::ObjectStore(s3_config) => {
            let client = S3ObjectStoreClient::new(&S3Settings {
                bucket: s3_config.bucket.clone(),
                region: s3_config.region.clone(),
                endpoint: s3_config.endpoint.clone(),
                force_path_style: s3_config.force_path_style,
            })
            .map_err(|err| ServerError::Init(err.to_string()))?;
            info!(backend = "object_store", bucket = %s3_config.bucket, "event store selected");
            Arc::new(
                ObjectStoreEventStore::new(
                    Arc::new(client),
                    s3_config.prefix.as_deref(),
                    s3_config.max_object_bytes,
                )
                .map_err(|err| ServerError::Init(err.to_string()))?,
            )
        }
    };
    Ok(store)
}

/// Builds the score store, returning the opened database when `SQLite`.
fn build_score_store(
    config: &ScoreStoreConfig,
) -> Result<(SharedScoreStore, Option<Arc<SqliteDatabase>>), ServerError> {
    match config {
        ScoreStoreConfig::Memory => {
            info!(backend = "memory", "score store selected");
            Ok((Arc::new(InMemoryScoreStore::new()), None))
        }
        ScoreStoreConfig::Sqlite(sqlite_config) => {
            let database = SqliteDatabase::open(sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            info!(backend = "sqlite", path = %sqlite_config.path.display(), "score store selected");
            Ok((Arc::new(SqliteScoreStore::new(Arc::clone(&database))), Some(database)))
        }
    }
}

/// Builds the secret resolver, reusing the score database when it matches.
fn build_secret_resolver(
    config: &GameLogConfig,
    score_database: Option<Arc<SqliteDatabase>>,
) -> Result<SharedSecretResolver, ServerError> {
    if let SecretsConfig::Static {
        games,
    } = &config.secrets
    {
        info!(backend = "static", games = games.len(), "secret resolver selected");
        return Ok(Arc::new(InMemorySecretResolver::from_secrets(games.iter().map(|game| {
            GameSecret {
                game_name: game.name.clone(),
                secret: game.secret.clone(),
            }
        }))));
    }
    let sqlite_config = config.secrets_database().ok_or_else(|| {
        ServerError::Config("sqlite secrets require a database path".to_string())
    })?;
    let shared = match (&config.score_store, score_database) {
        (ScoreStoreConfig::Sqlite(score_config), Some(database))
            if score_config.path == sqlite_config.path =>
        {
            database
        }
        _ => SqliteDatabase::open(&sqlite_config)
            .map_err(|err| ServerError::Init(err.to_string()))?,
    };
    info!(backend = "sqlite", path = %sqlite_config.path.display(), "secret resolver selected");
    Ok(Arc::new(SqliteSecretResolver::new(shared)))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
