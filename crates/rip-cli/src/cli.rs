//! CLI argument definitions for the asset diagnostic tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use rip_model::Version;

#[derive(Parser)]
#[command(
    name = "rip",
    version,
    about = "Decode versioned asset objects and print their export form",
    long_about = "Decode versioned asset objects and print their export form.\n\n\
                  Object layouts come from the built-in schema table, optionally\n\
                  extended or overridden with --schema files."
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
    /// Decode one raw object and print it as YAML or JSON.
    Decode(DecodeArgs),

    /// List the types of the schema catalog.
    Types(TypesArgs),

    /// Show the layout steps of one type at a given version.
    Layout(LayoutArgs),
}

/// Schema files layered over the built-in table.
#[derive(Args, Clone, Default)]
pub struct SchemaArgs {
    /// Extra schema table (TOML); types in it replace built-in types of the
    /// same name. May be repeated.
    #[arg(long = "schema", value_name = "PATH")]
    pub schemas: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct DecodeArgs {
    /// File holding exactly one object's bytes.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Type name of the object.
    #[arg(
        long = "type",
        value_name = "NAME",
        conflicts_with = "class_id",
        required_unless_present = "class_id"
    )]
    pub type_name: Option<String>,

    /// Class id of the object.
    #[arg(long = "class-id", value_name = "ID")]
    pub class_id: Option<i32>,

    /// Engine version the object was written by (e.g. 5.6.1f1).
    #[arg(long = "engine-version", value_name = "VERSION")]
    pub engine_version: Version,

    /// Path id written into the document header.
    #[arg(long = "path-id", value_name = "ID", default_value_t = 1)]
    pub path_id: i64,

    /// Read the object as big-endian.
    #[arg(long = "big-endian")]
    pub big_endian: bool,

    /// Emit the newest schema revision instead of the source version's.
    #[arg(long = "topmost-revision")]
    pub topmost_revision: bool,

    /// Fail when the decoder leaves bytes unconsumed.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Print the export tree as JSON instead of YAML.
    #[arg(long = "json")]
    pub json: bool,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Parser)]
pub struct TypesArgs {
    /// Show the revision each type exports at this version.
    #[arg(long = "engine-version", value_name = "VERSION")]
    pub engine_version: Option<Version>,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Parser)]
pub struct LayoutArgs {
    /// Type to describe.
    #[arg(value_name = "TYPE")]
    pub type_name: String,

    /// Version the steps are evaluated at.
    #[arg(long = "engine-version", value_name = "VERSION")]
    pub engine_version: Version,

    #[command(flatten)]
    pub schema: SchemaArgs,
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
