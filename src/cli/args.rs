use clap::Args;

use super::parse::parse_strategy;
use quire_core::config::CompressionStrategy;

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project id (directory under `projects/`)
    pub project: String,
}

#[derive(Args, Debug, Clone)]
pub struct ChapterArgs {
    /// Project id (directory under `projects/`)
    pub project: String,

    /// Chapter id
    pub chapter: String,
}

#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Project id (directory under `projects/`)
    pub project: String,

    /// Index only this chapter instead of rebuilding every chapter
    #[arg(long, short)]
    pub chapter: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RetrieveArgs {
    /// Project id (directory under `projects/`)
    pub project: String,

    /// Chapter id
    pub chapter: String,

    /// Query text; keywords and the chapter title are matched against it
    #[arg(long, default_value = "")]
    pub query: String,

    /// Maximum chunks returned
    #[arg(long, short, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct CompressArgs {
    /// Project id (directory under `projects/`)
    pub project: String,

    /// Chapter id
    pub chapter: String,

    /// Override the configured token budget
    #[arg(long)]
    pub token_budget: Option<usize>,

    /// Override the configured per-chapter character cap
    #[arg(long)]
    pub max_chapter_chars: Option<usize>,

    /// First tier allowed: slice, summary or core
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<CompressionStrategy>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Project id (directory under `projects/`)
    pub project: String,

    /// Chapter id
    pub chapter: String,

    /// Writing instruction appended to the context
    #[arg(long, short)]
    pub instruction: String,

    /// Override the configured token budget
    #[arg(long)]
    pub token_budget: Option<usize>,
}
