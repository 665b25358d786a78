//! Command-line interface definitions.
//!
//! The configuration file itself is named by the `CONF_PATH` environment
//! variable, not a flag; the CLI only selects what to do with it.

use clap::{Parser, Subcommand};

/// Host-level disk I/O monitoring agent.
#[derive(Parser, Debug)]
#[command(name = "diskmon", version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the log level based on verbosity flags.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available subcommands for the agent.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the agent and watch the configuration file for changes.
    Run,

    /// Validate the configuration file without starting.
    #[command(name = "config-validate")]
    ConfigValidate,

    /// Display the parsed configuration.
    #[command(name = "config-show")]
    ConfigShow,
}
