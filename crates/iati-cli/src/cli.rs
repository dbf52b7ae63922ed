//! CLI argument definitions for the IATI importer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "iati-import",
    version,
    about = "Import IATI activity XML into a relational store",
    long_about = "Parse IATI activity XML, validate codes against their vocabularies,\n\
                  resolve organisations and import each element family.\n\n\
                  Accepts <iati-activities> files, single activities and pasted element snippets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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

    /// Append logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import an XML file and report what was created.
    Import(ImportArgs),

    /// Count the elements of each family without importing.
    Inspect(SourceArgs),

    /// Parse and validate codes and percentages without importing.
    Validate(ValidateArgs),

    /// List the element families in import order.
    Families,
}

#[derive(Args)]
pub struct SourceArgs {
    /// IATI XML file, or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct OptionArgs {
    /// TOML file with import options; flags below override its values.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Comma-separated families to import (default: all).
    #[arg(long = "families", value_name = "LIST")]
    pub families: Option<String>,

    /// Allowed distance from 100 for percentage sums.
    #[arg(long = "tolerance", value_name = "N")]
    pub tolerance: Option<f64>,

    /// Match organisation names ignoring punctuation and a leading "the".
    #[arg(long = "fuzzy-names")]
    pub fuzzy_names: bool,

    /// Leave single-value columns empty even when one member covers 100%.
    #[arg(long = "no-single-value-projection")]
    pub no_single_value_projection: bool,

    /// Insert every contact instead of merging duplicates.
    #[arg(long = "no-contact-merge")]
    pub no_contact_merge: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub options: OptionArgs,

    /// Leave out one top-level element, e.g. `sector[2]` (repeatable).
    #[arg(long = "exclude", value_name = "ELEMENT")]
    pub exclude: Vec<String>,

    /// Start from a store saved earlier with `--dump-store`.
    #[arg(long = "store", value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Import into this activity row of the `--store` instead of resolving the identifier.
    #[arg(long = "target", value_name = "ID", requires = "store")]
    pub target: Option<u64>,

    /// Write the report view as JSON.
    #[arg(long = "json", value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Write errors and warnings as CSV.
    #[arg(long = "errors-csv", value_name = "PATH")]
    pub errors_csv: Option<PathBuf>,

    /// Write every stored row as JSON (readable again with `--store`).
    #[arg(long = "dump-store", value_name = "PATH")]
    pub dump_store: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Allowed distance from 100 for percentage sums.
    #[arg(long = "tolerance", value_name = "N")]
    pub tolerance: Option<f64>,

    /// TOML file with import options.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
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
