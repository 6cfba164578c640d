//! Command trait and context for dispatching commands

use std::path::PathBuf;
use std::time::Instant;

use crate::cli::Cli;
use quire_core::config::QuireConfig;
use quire_core::error::Result;
use quire_core::store::ProjectStore;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub root: &'a PathBuf,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, root: &'a PathBuf, start: Instant) -> Self {
        Self { cli, root, start }
    }

    pub fn open_store(&self) -> ProjectStore {
        ProjectStore::open(self.root)
    }

    /// Workspace configuration, defaults when `.quire/config.toml` is absent
    pub fn load_config(&self, store: &ProjectStore) -> Result<QuireConfig> {
        let config = store.load_config()?;
        tracing::debug!(elapsed = ?self.start.elapsed(), "load_config");
        Ok(config)
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("quire {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Context assembly for long-form writing with language models.");
        println!();
        println!("Run `quire --help` for usage information.");
        Ok(())
    }
}
