//! CLI argument definitions for the admin schema tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "admin-cli",
    version,
    about = "Resolve admin form fields from model schemas",
    long_about = "Resolve admin form fields from model schemas.\n\n\
                  Reads schemas and records from a JSON fixture directory and runs\n\
                  the same decoration pipeline the admin UI uses."
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
    /// Show the inferred field type of every column.
    Types(TypesArgs),

    /// Print the decorated form fields of one model.
    Fields(FieldsArgs),

    /// Print the update payload the form would submit.
    Payload(FieldsArgs),
}

#[derive(Parser)]
pub struct TypesArgs {
    /// Path to a schemas.json file.
    #[arg(value_name = "SCHEMAS")]
    pub schemas: PathBuf,

    /// Only show this model.
    #[arg(long = "model", value_name = "MODEL")]
    pub model: Option<String>,

    /// Admin configuration file (JSON).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct FieldsArgs {
    /// Directory holding schemas.json and entities.json.
    #[arg(value_name = "FIXTURE_DIR")]
    pub fixture_dir: PathBuf,

    /// Model to build the form for.
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Admin configuration file (JSON).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Record values to edit (JSON object). Omit for a new record.
    #[arg(long = "values", value_name = "PATH")]
    pub values: Option<PathBuf>,
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
