//! skillscout CLI — skills marketplace indexing pipeline.
//!
//! Crawls the marketplace leaderboards, enriches the index with SKILL.md
//! descriptions, and categorizes every entry.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
