//! Trainforge CLI: turn ingested documents into structured training modules.
//!
//! Documents are chunked into a local store; `generate` retrieves the
//! relevant chunks for a request and writes a module with slides and/or a
//! manual.

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
