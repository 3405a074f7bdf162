//! CLI argument definitions for the unipost transformation engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "unipost",
    version,
    about = "Unipost - Normalize crawled social posts into analytical records",
    long_about = "Normalize raw crawler output from TikTok, Instagram, and YouTube\n\
                  into flat, strongly typed records ready for warehouse loading.\n\
                  Field extraction, derivations, and typing are driven entirely by\n\
                  per-platform schema configs."
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
    /// Transform a crawler dump into normalized records.
    Process(ProcessArgs),

    /// Inspect and verify schema configs.
    Schema(SchemaArgs),

    /// List supported platforms and their schema status.
    Platforms {
        /// Directory holding one schema config per platform.
        #[arg(long = "schema-dir", value_name = "DIR")]
        schema_dir: Option<PathBuf>,
    },
}

#[derive(Parser)]
pub struct ProcessArgs {
    /// Path to the crawler dump (NDJSON or a JSON array of posts).
    #[arg(value_name = "POSTS_FILE")]
    pub input: PathBuf,

    /// Path to the crawl metadata sidecar JSON.
    #[arg(long = "metadata", value_name = "PATH")]
    pub metadata: PathBuf,

    /// Platform the dump came from (tiktok, instagram, youtube).
    #[arg(long = "platform", value_name = "PLATFORM")]
    pub platform: String,

    /// Directory holding one schema config per platform.
    #[arg(long = "schema-dir", value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,

    /// Directory output and reject files are written under.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum posts transformed at once.
    #[arg(long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Abandon posts still unfinished after this many seconds.
    #[arg(long = "deadline-secs", value_name = "SECS")]
    pub deadline_secs: Option<u64>,

    /// Transform and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Path to a TOML config file (flags override its values).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Allow crawled post content to appear in logs.
    ///
    /// By default payload values are redacted from diagnostics so logs can
    /// be shared without leaking crawled content.
    #[arg(long = "log-content")]
    pub log_content: bool,

    /// Exit 0 even when some posts fail validation.
    ///
    /// By default the run exits nonzero when any post is rejected. Rejected
    /// posts are written to the reject file either way and never reach the
    /// output.
    #[arg(long = "no-fail-on-invalid")]
    pub no_fail_on_invalid: bool,
}

#[derive(Parser)]
pub struct SchemaArgs {
    /// Directory holding one schema config per platform.
    #[arg(long = "schema-dir", value_name = "DIR", global = true)]
    pub schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Subcommand)]
pub enum SchemaCommand {
    /// Load and verify every schema config in the directory.
    Check {
        /// Emit the verification report as JSON instead of a table.
        #[arg(long = "json")]
        json: bool,
    },

    /// Show the resolved field layout for one platform.
    Show {
        /// Platform whose schema to display.
        #[arg(value_name = "PLATFORM")]
        platform: String,
    },
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
