//! CLI argument parsing for quire
//!
//! Global flags: --root, --format, --quiet, --verbose, --log-level, --log-json

pub mod args;
pub mod output;
pub mod parse;
pub mod paths;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{ChapterArgs, CompressArgs, GenerateArgs, IndexArgs, ProjectArgs, RetrieveArgs};
pub use output::OutputFormat;

/// Quire - context assembly for long-form writing with language models
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace root holding `projects/` and `.quire/`
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Debug logging and extra detail in human output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log filter, e.g. `debug` or `quire_core=trace`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index one chapter, or rebuild the whole project index
    Index(IndexArgs),

    /// Drop a chapter from the index
    Remove(ChapterArgs),

    /// Retrieve scored chunks of a chapter
    Retrieve(RetrieveArgs),

    /// Assemble the raw context pack for a chapter
    Pack(ChapterArgs),

    /// Assemble and compress context into a token budget
    Compress(CompressArgs),

    /// Show index statistics for a project
    Stats(ProjectArgs),

    /// Empty a project's index
    Clear(ProjectArgs),

    /// Generate text from the compressed context with the configured model
    Generate(GenerateArgs),

    /// Check that the configured model backend is reachable
    Ping,
}
