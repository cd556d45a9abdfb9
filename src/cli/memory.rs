//! Memory commands - write, batch write, search and schema bootstrap

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::domain::memory::{NewMemory, DEFAULT_SOURCE};
use crate::domain::DomainError;
use crate::infrastructure::services::{MemoryService, DEFAULT_SEARCH_LIMIT};

/// Arguments for the write command
#[derive(Args, Clone, Debug)]
pub struct WriteArgs {
    #[arg(long)]
    pub content: String,

    #[arg(long)]
    pub project: String,

    #[arg(long)]
    pub repo: String,

    #[arg(long)]
    pub agent: String,

    /// Tag to attach; repeat for several
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    #[arg(long, default_value = DEFAULT_SOURCE)]
    pub source: String,
}

impl WriteArgs {
    pub fn into_memory(self) -> NewMemory {
        NewMemory::new(self.content, self.project, self.repo, self.agent)
            .with_tags(self.tags)
            .with_source(self.source)
    }
}

/// Arguments for the write-batch command
#[derive(Args, Clone, Debug)]
pub struct WriteBatchArgs {
    /// JSON file containing an array of memory records
    pub file: PathBuf,
}

/// Arguments for the search command
#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    pub query: String,

    /// Only return memories from this project
    #[arg(long)]
    pub project: Option<String>,

    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,
}

fn memory_service(config: &AppConfig) -> anyhow::Result<MemoryService> {
    let router = crate::create_router(config)?;
    crate::create_memory_service(config, router)
}

/// Run the write command
pub async fn write(args: WriteArgs, config: &AppConfig) -> anyhow::Result<()> {
    let service = memory_service(config)?;
    let id = service.write_one(args.into_memory()).await?;

    super::print_json(&json!({ "id": id }))
}

/// Run the write-batch command
///
/// When the store fails partway, the ids already written are printed before
/// the error is returned.
pub async fn write_batch(args: WriteBatchArgs, config: &AppConfig) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.file.display()))?;
    let Value::Array(records) = document else {
        return Err(
            DomainError::validation("Batch file must contain a JSON array of memories").into(),
        );
    };

    let service = memory_service(config)?;

    match service.write_batch_values(&records).await {
        Ok(ids) => super::print_json(&json!({ "ids": ids })),
        Err(DomainError::Batch {
            message,
            written_ids,
        }) => {
            super::print_json(&json!({ "ids": written_ids }))?;
            Err(DomainError::batch(message, written_ids).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the search command
pub async fn search(args: SearchArgs, config: &AppConfig) -> anyhow::Result<()> {
    let service = memory_service(config)?;
    let hits = service
        .search(&args.query, args.project.as_deref(), args.limit)
        .await?;

    super::print_json(&hits)
}

/// Run the init-schema command
pub async fn init_schema(config: &AppConfig) -> anyhow::Result<()> {
    let service = memory_service(config)?;
    let created = service.init_schema().await?;

    super::print_json(&json!({
        "class": config.vector_store.class_name,
        "created": created,
    }))
}
