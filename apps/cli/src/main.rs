//! mcpdoc CLI: serve llms.txt documentation sources to AI agents.
//!
//! Loads doc sources from YAML, JSON and the command line, then lists or
//! fetches them through the domain allow-list.

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
