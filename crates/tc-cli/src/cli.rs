//! CLI argument definitions for the Table Constraints validator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tc-validate",
    version,
    about = "Validate xBRL-CSV reports against their Table Constraints",
    long_about = "Validate xBRL-CSV reports against the Table Constraints declared in their metadata.\n\n\
                  Checks cell and parameter values, unique and reference keys, row order,\n\
                  table and row counts, and optionally the metadata's own structure."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a report described by an xBRL-CSV metadata file.
    Validate(ValidateArgs),

    /// Report whether a metadata file uses Table Constraints.
    Detect(DetectArgs),

    /// List every issue code.
    Codes,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Metadata JSON file; inside the archive when --archive is given.
    #[arg(value_name = "METADATA")]
    pub metadata: Option<PathBuf>,

    /// Read the report from a zip archive.
    ///
    /// Without METADATA the first JSON entry outside META-INF/ is used.
    #[arg(long = "archive", value_name = "ZIP")]
    pub archive: Option<PathBuf>,

    /// TOML file with validation options; flags override its values.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Check the metadata's own structure before reading any table.
    #[arg(long = "validate-metadata")]
    pub validate_metadata: bool,

    /// Read the tables even when the metadata has structural errors.
    #[arg(long = "force-load")]
    pub force_load: bool,

    /// Run the taxonomy linter (needs --concepts).
    #[arg(long = "lint")]
    pub lint: bool,

    /// Concept catalogue JSON used by the linter.
    #[arg(long = "concepts", value_name = "FILE")]
    pub concepts: Option<PathBuf>,

    /// Keep at most N issues of each code in the output.
    #[arg(long = "max-issues", value_name = "N")]
    pub max_issues: Option<usize>,

    /// Print the report as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,

    /// Do not show the progress spinner.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Parser)]
pub struct DetectArgs {
    /// Metadata JSON file.
    #[arg(value_name = "METADATA")]
    pub metadata: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
