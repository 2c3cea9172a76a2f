//! Config command implementation.
//!
//! Manages the CLI configuration file.
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/netbridge/config.toml`
//! - macOS: `~/Library/Application Support/netbridge/config.toml`
//! - Windows: `%APPDATA%\netbridge\config.toml`
//!
//! The location can be overridden with `--config` or `NETBRIDGE_CONFIG`.

use crate::actions::ConfigAction;
use anyhow::{Context, Result};
use netbridge_codegen::GeneratorOptions;
use netbridge_codegen::generator::DEFAULT_BRIDGE_MODULE;
use netbridge_core::{CollisionPolicy, Error};
use netbridge_core::cli::{ExitCode, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CLI configuration.
///
/// # Examples
///
/// ```toml
/// [general]
/// default_format = "pretty"
/// log_level = "info"
///
/// [generate]
/// bridge_module = "edge-js"
/// collision_policy = "suffix"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Defaults for `netbridge generate`
    #[serde(default)]
    pub generate: GenerateConfig,
}

/// General configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format (json, text, pretty)
    pub default_format: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Generation defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerateConfig {
    /// Module required by the bridge at runtime
    pub bridge_module: String,

    /// Identifier collision policy (suffix, allow, reject)
    pub collision_policy: CollisionPolicy,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::default().to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            bridge_module: DEFAULT_BRIDGE_MODULE.to_string(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.output_format()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(Error::ConfigError {
                message: format!(
                    "invalid log_level '{}', must be one of: {}",
                    self.general.log_level,
                    valid_levels.join(", ")
                ),
            }
            .into());
        }

        self.generator_options().validate()?;

        Ok(())
    }

    /// Returns the configured default output format.
    ///
    /// # Errors
    ///
    /// Returns an error if `general.default_format` is not a known format.
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.general
            .default_format
            .parse::<OutputFormat>()
            .map_err(Into::into)
    }

    /// Returns the generator options described by the `[generate]` section.
    #[must_use]
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions::default()
            .with_bridge_module(self.generate.bridge_module.clone())
            .with_collision_policy(self.generate.collision_policy)
    }
}

/// Gets the default configuration file path.
///
/// # Errors
///
/// Returns an error if the platform has no configuration directory.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("failed to determine config directory")?;

    Ok(config_dir.join("netbridge").join("config.toml"))
}

/// Returns `explicit` if given, the default location otherwise.
///
/// # Errors
///
/// Returns an error if no path is given and the default cannot be
/// determined.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit.map_or_else(default_config_path, |p| Ok(p.to_path_buf()))
}

/// Loads configuration from file or returns defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed or
/// validated.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("Config file {} not found, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config file {}", path.display()))?;

    Ok(config)
}

/// Saves configuration to file.
fn save_config(config: &Config, path: &Path) -> Result<()> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    let toml_str = toml::to_string_pretty(config).context("failed to serialize config")?;

    fs::write(path, toml_str).context("failed to write config file")?;

    debug!("Saved config to {}", path.display());

    Ok(())
}

/// Initialization result.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InitResult {
    /// Whether a file was written
    pub success: bool,
    /// Status message
    pub message: String,
    /// Configuration file path
    pub path: String,
}

/// Configuration file location.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PathResult {
    /// Configuration file path
    pub path: String,
    /// Whether the file exists
    pub exists: bool,
}

/// Runs the config command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read, written or
/// formatted.
pub fn run(
    action: &ConfigAction,
    config_path: &Path,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    info!("Config action: {action:?}");

    match action {
        ConfigAction::Init { force } => init_config(config_path, *force, output_format),
        ConfigAction::Show => show_config(config_path, output_format),
        ConfigAction::Path => show_path(config_path, output_format),
    }
}

/// Creates a default configuration file.
///
/// An existing file is only replaced with `force`.
fn init_config(config_path: &Path, force: bool, output_format: OutputFormat) -> Result<ExitCode> {
    if config_path.exists() && !force {
        let result = InitResult {
            success: false,
            message: "configuration file already exists (use --force to replace it)".to_string(),
            path: config_path.display().to_string(),
        };

        let formatted = crate::formatters::format_output(&result, output_format)
            .context("failed to format init result")?;
        println!("{formatted}");

        return Ok(ExitCode::SUCCESS);
    }

    save_config(&Config::default(), config_path)?;

    let result = InitResult {
        success: true,
        message: "configuration file created with default values".to_string(),
        path: config_path.display().to_string(),
    };

    let formatted = crate::formatters::format_output(&result, output_format)
        .context("failed to format init result")?;
    println!("{formatted}");

    Ok(ExitCode::SUCCESS)
}

/// Shows the effective configuration.
fn show_config(config_path: &Path, output_format: OutputFormat) -> Result<ExitCode> {
    let config = load_config(config_path)?;

    let formatted = crate::formatters::format_output(&config, output_format)
        .context("failed to format configuration")?;
    println!("{formatted}");

    Ok(ExitCode::SUCCESS)
}

fn show_path(config_path: &Path, output_format: OutputFormat) -> Result<ExitCode> {
    let result = PathResult {
        path: config_path.display().to_string(),
        exists: config_path.is_file(),
    };

    let formatted = crate::formatters::format_output(&result, output_format)
        .context("failed to format config path")?;
    println!("{formatted}");

    Ok(ExitCode::SUCCESS)
}
