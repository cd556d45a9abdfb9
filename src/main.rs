use clap::Parser;
use project_memory::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::bootstrap()?;

    match cli.command {
        Command::Embed(args) => cli::embed::run(args, &config).await,
        Command::Write(args) => cli::memory::write(args, &config).await,
        Command::WriteBatch(args) => cli::memory::write_batch(args, &config).await,
        Command::Search(args) => cli::memory::search(args, &config).await,
        Command::Cache(command) => cli::cache::run(command, &config).await,
        Command::InitSchema => cli::memory::init_schema(&config).await,
    }
}
