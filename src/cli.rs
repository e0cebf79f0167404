//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::Parser;

use crate::commands;
use roomservice::output::OutputConfig;

/// roomservice - register a device tree and its dependencies in a local manifest
#[derive(Parser, Debug)]
#[command(name = "roomservice")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    resolve: commands::resolve::ResolveArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        commands::resolve::execute(self.resolve, &output)
    }
}

/// Routes `log` records to stderr. `RUST_LOG` takes precedence over the flag.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
