//! Warden CLI
//!
//! Command-line interface for the Warden access gate.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use warden_cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    warden_cli::app::run(args).await?;
    Ok(())
}
