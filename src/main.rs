mod cli;
mod conversation;
mod export;
mod logging;
mod model;
mod orchestrator;
mod service;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_non_tui = !args.prompt.is_empty();

    match cli::run(args).await {
        // Explicitly exit with code 0 on success in text mode
        Ok(()) if is_non_tui => std::process::exit(0),
        Ok(()) => Ok(()),
        Err(e) => Err(e),
    }
}
