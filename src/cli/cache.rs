//! Cache command - inspect or clear the embedding cache

use anyhow::bail;
use clap::Subcommand;
use serde_json::json;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::cache::EmbeddingCache;

#[derive(Subcommand, Clone, Debug)]
pub enum CacheCommand {
    /// Show entry count and on-disk size
    Info,

    /// Delete every cached embedding
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Run a cache subcommand
pub async fn run(command: CacheCommand, config: &AppConfig) -> anyhow::Result<()> {
    let cache = crate::create_embedding_cache(&config.embedding)?;

    match command {
        CacheCommand::Info => super::print_json(&cache.info().await?),
        CacheCommand::Clear { yes } => {
            if !yes {
                bail!("Refusing to clear {} without --yes", cache.cache_dir().display());
            }

            let removed = cache.clear().await?;
            info!(removed, "Embedding cache cleared");
            super::print_json(&json!({ "removed": removed }))
        }
    }
}
