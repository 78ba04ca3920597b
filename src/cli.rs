// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `sasswatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sasswatch",
    version,
    about = "Compile SASS/SCSS and keep directories under watch.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Its directory is the project root that relative paths resolve
    /// against.
    #[arg(long, global = true, value_name = "PATH", default_value = "Sasswatch.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SASSWATCH_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Watch every configured directory until Ctrl-C.
    ///
    /// Edits to the config file relaunch all watches.
    Watch {
        /// Print the watch commands without starting anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Add a directory to the watch list.
    Add {
        #[arg(value_name = "DIR")]
        directory: String,
    },

    /// Remove a directory from the watch list.
    Remove {
        #[arg(value_name = "DIR")]
        directory: String,
    },

    /// Show the watch list with resolved output directories.
    List,

    /// Compile a single stylesheet.
    ///
    /// A relative FILE resolves against the project root.
    Compile {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the version of the configured compiler backend.
    Version,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "sasswatch",
            "add",
            "src/a",
            "--config",
            "site/Sasswatch.toml",
        ])
        .unwrap();
        assert_eq!(args.config, "site/Sasswatch.toml");
        match args.command {
            Command::Add { directory } => assert_eq!(directory, "src/a"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn watch_dry_run() {
        let args = CliArgs::try_parse_from(["sasswatch", "watch", "--dry-run"]).unwrap();
        assert!(matches!(args.command, Command::Watch { dry_run: true }));
        assert_eq!(args.config, "Sasswatch.toml");
    }
}
