//! askbase CLI — snapshot-grounded question answering over a fixed set of
//! web sources.
//!
//! `ingest` crawls the configured sources into a durable snapshot;
//! `ask`/`chat` answer questions grounded in a size-bounded context built
//! from that snapshot.

mod chat;
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
