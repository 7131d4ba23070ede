//! Parley - terminal chat client with a normalizing transcript core.
//!
//! Architecture:
//! - `session` owns the append-only transcript and drives exactly one
//!   reply-service call per submitted turn
//! - `normalize` strips markup from replies before they enter the transcript
//! - `reply` abstracts the request/response boundary behind a trait
//! - `server` is the backing reply server (Gemini upstream plus an
//!   in-process similarity memory)
//! - `cli` is a thin presentation layer over session snapshots

mod cli;
mod models;
mod normalize;
mod reply;
mod server;
mod session;

use anyhow::Result;
use clap::Parser;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    execute(cli).await
}
