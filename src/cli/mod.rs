//! CLI module for Project Memory
//!
//! Every command prints its result as JSON on stdout; logs go to stderr.

pub mod cache;
pub mod embed;
pub mod memory;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Project Memory - cached embeddings and semantic memory for AI agents
#[derive(Parser)]
#[command(name = "project-memory")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Embed one or more texts
    Embed(embed::EmbedArgs),

    /// Write a single memory
    Write(memory::WriteArgs),

    /// Write memories from a JSON file holding an array of records
    WriteBatch(memory::WriteBatchArgs),

    /// Search memories by semantic similarity
    Search(memory::SearchArgs),

    /// Inspect or clear the embedding cache
    #[command(subcommand)]
    Cache(cache::CacheCommand),

    /// Create the memory class in the vector store if missing
    InitSchema,
}

/// Load `.env`, read configuration and install logging
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
