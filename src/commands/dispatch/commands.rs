//! Command implementations for all quire commands

use crate::cli::Commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use crate::commands::{generate, index, pack, retrieve};
use quire_core::error::Result;

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let store = ctx.open_store();
        let config = ctx.load_config(&store)?;

        match self {
            Commands::Index(args) => index::execute_index(ctx.cli, &store, &config, args),
            Commands::Remove(args) => index::execute_remove(ctx.cli, &store, &config, args),
            Commands::Stats(args) => index::execute_stats(ctx.cli, &store, &config, args),
            Commands::Clear(args) => index::execute_clear(ctx.cli, &store, &config, args),
            Commands::Retrieve(args) => retrieve::execute(ctx.cli, &store, &config, args),
            Commands::Pack(args) => pack::execute_pack(ctx.cli, &store, &config, args),
            Commands::Compress(args) => pack::execute_compress(ctx.cli, &store, config, args),
            Commands::Generate(args) => generate::execute_generate(ctx.cli, &store, config, args),
            Commands::Ping => generate::execute_ping(ctx.cli, config),
        }
    }
}
