//! `quire generate` and `quire ping` - talk to the configured model backend

use std::time::Instant;

use crate::cli::{Cli, GenerateArgs, OutputFormat};
use crate::commands::pack::open_assembler;
use quire_core::compression::TieredCompressor;
use quire_core::config::QuireConfig;
use quire_core::error::Result;
use quire_core::generation::{render_prompt, ModelBackend};
use quire_core::store::ProjectStore;
use quire_core::{bail_usage, trace_time};

pub fn execute_generate(
    cli: &Cli,
    store: &ProjectStore,
    mut config: QuireConfig,
    args: &GenerateArgs,
) -> Result<()> {
    if args.instruction.trim().is_empty() {
        bail_usage!("--instruction must not be empty");
    }
    if let Some(budget) = args.token_budget {
        config.compression.token_budget = budget;
    }

    let compressor = TieredCompressor::new(config.compression);
    let mut assembler = open_assembler(store, &config);
    let assembled = assembler.assemble(&args.project, &args.chapter, &compressor);
    let prompt = render_prompt(&assembled.compressed, &args.instruction);

    let backend = ModelBackend::from_config(config.model);
    let start = Instant::now();
    let output = backend.generate(&prompt)?;
    trace_time!(start, "generate", chars = output.len());

    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "project": args.project,
                "chapter": args.chapter,
                "strategy": assembled.compressed.strategy,
                "estimatedTokens": assembled.compressed.estimated_tokens,
                "output": output,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Human => {
            if cli.verbose {
                eprintln!(
                    "context: {} strategy, ~{} tokens",
                    assembled.compressed.strategy, assembled.compressed.estimated_tokens
                );
            }
            println!("{}", output);
        }
    }
    Ok(())
}

pub fn execute_ping(cli: &Cli, config: QuireConfig) -> Result<()> {
    let backend = ModelBackend::from_config(config.model);
    backend.ping()?;

    let model = backend.config();
    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "status": "ok",
                "backend": model.backend,
                "endpoint": model.endpoint,
                "model": model.model,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!(
                    "Model backend {:?} is reachable ({} at {})",
                    model.backend, model.model, model.endpoint
                );
            }
        }
    }
    Ok(())
}
