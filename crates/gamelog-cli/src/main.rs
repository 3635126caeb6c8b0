// crates/gamelog-cli/src/main.rs
// ============================================================================
// Module: Game Log CLI Entry Point
// Description: Command dispatcher for the game log server and operator tools.
// Purpose: Run the API server and perform offline config and secret tasks.
// Dependencies: clap, gamelog-config, gamelog-core, gamelog-server, tokio.
// ============================================================================

//! ## Overview
//! `gamelog serve` loads configuration, installs logging, opens every backend
//! off the async runtime, and serves HTTP until interrupted. The remaining
//! commands are offline helpers: validating or printing configuration,
//! signing a request body the way game clients do, and provisioning per-game
//! secrets into a `SQLite` secrets database.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use gamelog_config::GameLogConfig;
use gamelog_config::config_toml_example;
use gamelog_core::GameName;
use gamelog_core::sign_body;
use gamelog_server::GameLogServer;
use gamelog_server::init_logging;
use gamelog_store_sqlite::SqliteDatabase;
use gamelog_store_sqlite::SqliteStoreConfig;
use thiserror::Error;
use tracing::info;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest body accepted by `gamelog sign`.
const MAX_SIGN_INPUT_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "gamelog", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the game log HTTP server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Compute the request signature for a body.
    Sign(SignCommand),
    /// Per-game secret administration.
    Games {
        /// Selected games subcommand.
        #[command(subcommand)]
        command: GamesCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to gamelog.toml or `GAMELOG_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file, including environment overrides.
    Validate(ConfigValidateCommand),
    /// Print an annotated example config.
    Example,
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to gamelog.toml or `GAMELOG_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `sign`.
#[derive(Args, Debug)]
struct SignCommand {
    /// Shared secret of the game (may be empty).
    #[arg(long, value_name = "SECRET")]
    secret: String,
    /// File holding the exact request body; stdin when omitted.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

/// Games subcommands.
#[derive(Subcommand, Debug)]
enum GamesCommand {
    /// Create or replace a game's secret in a `SQLite` secrets database.
    Provision(ProvisionCommand),
}

/// Arguments for `games provision`.
#[derive(Args, Debug)]
struct ProvisionCommand {
    /// `SQLite` database path (created when missing).
    #[arg(long, value_name = "PATH")]
    database: PathBuf,
    /// Game name to provision.
    #[arg(long, value_name = "NAME")]
    game: String,
    /// Shared secret to store (must be non-empty).
    #[arg(long, value_name = "SECRET")]
    secret: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("gamelog {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Sign(command) => command_sign(&command),
        Commands::Games {
            command,
        } => command_games(command),
    }
}

/// Prints top-level help to stdout.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_line(help.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = GameLogConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    init_logging(&config.logging)
        .map_err(|err| CliError::new(format!("failed to initialize logging: {err}")))?;
    info!(bind = %config.server.bind, "starting game log server");

    let server = tokio::task::spawn_blocking(move || GameLogServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = GameLogConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Sign Command
// ============================================================================

/// Executes the `sign` command.
fn command_sign(command: &SignCommand) -> CliResult<ExitCode> {
    let body = match &command.file {
        Some(path) => read_bytes_with_limit(path, MAX_SIGN_INPUT_BYTES)
            .map_err(|err| CliError::new(read_error(path, &err)))?,
        None => read_stdin_with_limit(MAX_SIGN_INPUT_BYTES)?,
    };
    let signature = signature_for(&body, &command.secret)?;
    write_stdout_line(&signature).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Computes the hex signature of a body.
///
/// An empty secret is accepted: games whose stored secret is empty or absent
/// verify against the empty key.
fn signature_for(body: &[u8], secret: &str) -> CliResult<String> {
    sign_body(body, secret).map_err(|err| CliError::new(format!("signing failed: {err}")))
}

/// Reads stdin up to a limit.
fn read_stdin_with_limit(max_bytes: usize) -> CliResult<Vec<u8>> {
    let read_limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    std::io::stdin()
        .take(read_limit)
        .read_to_end(&mut bytes)
        .map_err(|err| CliError::new(format!("failed to read stdin: {err}")))?;
    if bytes.len() > max_bytes {
        return Err(CliError::new(format!("stdin exceeds {max_bytes} bytes")));
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Games Commands
// ============================================================================

/// Dispatches games subcommands.
fn command_games(command: GamesCommand) -> CliResult<ExitCode> {
    match command {
        GamesCommand::Provision(command) => {
            provision_game(&command.database, &command.game, &command.secret)?;
            write_stdout_line(&format!("provisioned secret for game {}", command.game))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Stores a game secret, creating the database when needed.
///
/// Unlike `sign`, provisioning refuses the empty secret so this tool never
/// creates a game whose scores anyone can sign.
fn provision_game(database: &Path, game: &str, secret: &str) -> CliResult<()> {
    let game_name =
        GameName::parse(game).map_err(|err| CliError::new(format!("invalid game name: {err}")))?;
    if secret.is_empty() {
        return Err(CliError::new("secret must be non-empty".to_string()));
    }
    let database = SqliteDatabase::open(&SqliteStoreConfig::new(database))
        .map_err(|err| CliError::new(format!("failed to open secrets database: {err}")))?;
    database
        .provision_secret(&game_name, secret)
        .map_err(|err| CliError::new(format!("failed to provision secret: {err}")))
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Renders a bounded-read failure.
fn read_error(path: &Path, err: &ReadLimitError) -> String {
    match err {
        ReadLimitError::Io(err) => format!("failed to read {}: {err}", path.display()),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => format!("{} is {size} bytes; limit is {limit}", path.display()),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
