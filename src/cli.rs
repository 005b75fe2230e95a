// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `filterchain`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "filterchain",
    version,
    about = "Convert a file to another MIME type by running a chain of filters.",
    long_about = None
)]
pub struct CliArgs {
    /// Destination MIME type, e.g. `application/postscript`.
    #[arg(short = 'm', long = "mime-type", value_name = "SUPER/TYPE")]
    pub mime_type: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `filterchain.toml` under `$CUPS_SERVERROOT` (or `/etc/cups`).
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of copies, passed to filters in its own argument.
    #[arg(short = 'n', long, value_name = "COPIES")]
    pub copies: Option<String>,

    /// Job option(s), `name=value`; may be repeated.
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// PPD file handed to filters in `$PPD`.
    #[arg(short = 'p', long, value_name = "FILE")]
    pub ppd: Option<PathBuf>,

    /// Job title. Defaults to the input file name.
    #[arg(short = 't', long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FILTERCHAIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Detect and plan, print the chain, but don't run any filters.
    #[arg(long)]
    pub dry_run: bool,

    /// File to convert.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
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

/// Parse the process arguments without exiting on error.
pub fn parse() -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse()
}

/// Exit status for a [`parse`] failure: 0 for `--help` and `--version`,
/// 1 for usage errors.
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}
