//! netbridge CLI.
//!
//! Command-line interface for generating Node.js bridges to compiled .NET
//! components.
//!
//! # Architecture
//!
//! The CLI is organized around subcommands:
//! - `generate` - Write `config.toml` and `handler.js` for a component
//! - `introspect` - List the members a component exports
//! - `config` - Manage the configuration file
//! - `completions` - Generate shell completions
//!
//! # Examples
//!
//! ```bash
//! # Generate the bridge for a release build
//! netbridge generate bin/Release/net8.0/Demo.dll ./bridge
//!
//! # See why members are or are not exported
//! netbridge introspect --all bin/Release/net8.0/Demo.dll
//! ```

use clap::Parser;
use colored::Colorize;
use netbridge_cli::Cli;
use netbridge_cli::runner::{exit_code_for, run};

fn main() {
    let cli = Cli::parse();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code.as_i32());
}
