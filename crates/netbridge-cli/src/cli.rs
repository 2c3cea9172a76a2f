//! CLI argument definitions and parsing.
//!
//! Defines the command-line interface structure using clap:
//! - `Cli` - Main CLI entry point
//! - `Commands` - Available subcommands

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::actions::ConfigAction;

/// netbridge - expose .NET components to Node.js through edge-js.
///
/// Reads the public, value-returning methods of a compiled component and
/// writes a manifest plus a promise-based JavaScript bridge module.
#[derive(Parser, Debug)]
#[command(name = "netbridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (json, text, pretty); defaults to the configured format
    #[arg(long = "format", global = true)]
    pub format: Option<String>,

    /// Path to the configuration file
    #[arg(long = "config", global = true, env = "NETBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate `config.toml` and `handler.js` for a component.
    ///
    /// Both files are written into DEST, replacing any previous versions.
    /// Nothing is written if the component cannot be read or exports
    /// nothing.
    ///
    /// # Examples
    ///
    /// ```bash
    /// netbridge generate bin/Release/Demo.dll ./bridge
    ///
    /// # Electron build of edge-js, fail on overload collisions
    /// netbridge generate Demo.dll ./bridge \
    ///     --bridge-module electron-edge-js --collisions reject
    /// ```
    Generate {
        /// Compiled component (.dll/.exe) or JSON component description
        component: PathBuf,

        /// Existing directory receiving the generated files
        dest: PathBuf,

        /// Module required by the bridge at runtime
        /// (default: edge-js, or the configured value)
        #[arg(long)]
        bridge_module: Option<String>,

        /// How to handle members deriving the same identifier
        /// (suffix, allow, reject)
        #[arg(long)]
        collisions: Option<String>,
    },

    /// List the members a component would export.
    ///
    /// With `--all`, every declared member is listed together with the
    /// reason it is or is not exported.
    Introspect {
        /// Compiled component (.dll/.exe) or JSON component description
        component: PathBuf,

        /// Include members that would not be exported
        #[arg(short, long)]
        all: bool,

        /// How to handle members deriving the same identifier
        /// (suffix, allow, reject)
        #[arg(long)]
        collisions: Option<String>,
    },

    /// Manage the netbridge configuration file.
    Config {
        /// Configuration action
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions.
    ///
    /// Generates completion scripts for various shells that can be
    /// sourced or saved to enable tab completion for this CLI.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_generate() {
        let cli = Cli::parse_from(["netbridge", "generate", "Demo.dll", "out"]);
        if let Commands::Generate {
            component,
            dest,
            bridge_module,
            collisions,
        } = cli.command
        {
            assert_eq!(component, PathBuf::from("Demo.dll"));
            assert_eq!(dest, PathBuf::from("out"));
            assert_eq!(bridge_module, None);
            assert_eq!(collisions, None);
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_parsing_generate_with_options() {
        let cli = Cli::parse_from([
            "netbridge",
            "generate",
            "Demo.dll",
            "out",
            "--bridge-module",
            "electron-edge-js",
            "--collisions",
            "reject",
        ]);
        if let Commands::Generate {
            bridge_module,
            collisions,
            ..
        } = cli.command
        {
            assert_eq!(bridge_module.as_deref(), Some("electron-edge-js"));
            assert_eq!(collisions.as_deref(), Some("reject"));
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_parsing_generate_requires_dest() {
        assert!(Cli::try_parse_from(["netbridge", "generate", "Demo.dll"]).is_err());
    }

    #[test]
    fn test_cli_parsing_introspect_all() {
        let cli = Cli::parse_from(["netbridge", "introspect", "--all", "Demo.dll"]);
        if let Commands::Introspect {
            component,
            all,
            collisions,
        } = cli.command
        {
            assert_eq!(component, PathBuf::from("Demo.dll"));
            assert!(all);
            assert!(collisions.is_none());
        } else {
            panic!("Expected Introspect command");
        }
    }

    #[test]
    fn test_cli_parsing_config_actions() {
        let cli = Cli::parse_from(["netbridge", "config", "show"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Show
            }
        ));

        let cli = Cli::parse_from(["netbridge", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "netbridge",
            "introspect",
            "Demo.dll",
            "--verbose",
            "--format",
            "json",
            "--config",
            "/tmp/netbridge.toml",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.format.as_deref(), Some("json"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/netbridge.toml")));
    }

    #[test]
    fn test_cli_parsing_completions_zsh() {
        let cli = Cli::parse_from(["netbridge", "completions", "zsh"]);
        if let Commands::Completions { shell } = cli.command {
            assert_eq!(shell, Shell::Zsh);
        } else {
            panic!("Expected Completions command");
        }
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
