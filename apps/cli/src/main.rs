//! userdb CLI: build a merged DMR user database for radio programming tools.
//!
//! Downloads the public registries, merges them by radio ID and writes the
//! result in the md380tools or MD-2017 layout.

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
