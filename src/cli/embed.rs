//! Embed command - generate embeddings through the cache-aware router

use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;

/// Arguments for the embed command
#[derive(Args, Clone, Debug)]
pub struct EmbedArgs {
    /// Texts to embed
    #[arg(required = true)]
    pub texts: Vec<String>,

    /// Skip the embedding cache for both reads and writes
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Debug, Serialize)]
struct EmbeddingOutput<'a> {
    text: &'a str,
    dimensions: usize,
    embedding: &'a [f64],
}

/// Run the embed command
pub async fn run(args: EmbedArgs, config: &AppConfig) -> anyhow::Result<()> {
    let router = crate::create_router(config)?;
    let use_cache = !args.no_cache;

    let vectors = match args.texts.as_slice() {
        [text] => vec![router.get_embedding(text, use_cache, None).await?],
        texts => router.get_embeddings(texts, use_cache, None).await?,
    };

    let output: Vec<EmbeddingOutput> = args
        .texts
        .iter()
        .zip(&vectors)
        .map(|(text, vector)| EmbeddingOutput {
            text,
            dimensions: vector.len(),
            embedding: vector,
        })
        .collect();

    super::print_json(&output)
}
