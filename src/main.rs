//! # roomservice CLI
//!
//! This is the binary entry point for the `roomservice` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Running the resolution for the given product.
//! - Translating library errors into user-facing output and a non-zero exit.
//!
//! The resolution logic lives in the `roomservice` library crate; the binary
//! is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
