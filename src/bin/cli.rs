// src/bin/cli.rs
use board_scrape::cli::{self, Cli};
use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    cli::run(Cli::parse()).await
}
