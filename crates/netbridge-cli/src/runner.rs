//! Command execution and runtime logic.
//!
//! Contains the command dispatch, logging initialization and the mapping
//! from failures to process exit codes.

use anyhow::Result;
use netbridge_core::cli::{ExitCode, OutputFormat};
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::commands;
use crate::commands::config::{Config, load_config, resolve_config_path};

/// Initializes logging infrastructure.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` wins over the
/// configured level. Logs go to stderr so stdout carries only command
/// output; colors are only used when stderr is a terminal.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: bool, configured_level: &str) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .try_init()?;

    Ok(())
}

/// Maps a command failure to the process exit code.
///
/// Failures carrying a [`netbridge_core::Error`] anywhere in their chain
/// use its classification; everything else is a generic error.
#[must_use]
pub fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<netbridge_core::Error>())
        .map_or(ExitCode::ERROR, ExitCode::for_error)
}

/// Picks the output format: the `--format` flag, then the configured default.
///
/// # Errors
///
/// Returns an error if the chosen value is not a known format.
pub fn resolve_format(flag: Option<&str>, config: &Config) -> Result<OutputFormat> {
    flag.map_or_else(
        || config.output_format(),
        |f| f.parse::<OutputFormat>().map_err(Into::into),
    )
}

/// Loads configuration, initializes logging and runs the command.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
pub fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = resolve_config_path(cli.config.as_deref())?;
    let config = load_config(&config_path)?;

    init_logging(cli.verbose, &config.general.log_level)?;

    let output_format = resolve_format(cli.format.as_deref(), &config)?;

    execute_command(cli.command, output_format, &config, &config_path)
}

/// Executes the specified CLI command.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn execute_command(
    command: Commands,
    output_format: OutputFormat,
    config: &Config,
    config_path: &Path,
) -> Result<ExitCode> {
    match command {
        Commands::Generate {
            component,
            dest,
            bridge_module,
            collisions,
        } => {
            let options = commands::generate::resolve_options(
                config.generator_options(),
                bridge_module,
                collisions.as_deref(),
            )?;
            commands::generate::run(&component, &dest, options, output_format)
        }
        Commands::Introspect {
            component,
            all,
            collisions,
        } => {
            let options = commands::generate::resolve_options(
                config.generator_options(),
                None,
                collisions.as_deref(),
            )?;
            commands::introspect::run(&component, all, options.collision_policy, output_format)
        }
        Commands::Config { action } => commands::config::run(&action, config_path, output_format),
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd)
        }
    }
}
