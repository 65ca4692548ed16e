//! CLI command definitions
//!
//! Defines the clap commands for the stdio-script CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Check that scenario files parse and make sense
    Lint {
        /// Scenario files (.yaml, .yml or .json)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the command queue a scenario expands to
    Show {
        /// Scenario file (.yaml, .yml or .json)
        file: PathBuf,

        /// Also print the scenario settings
        #[arg(long, short)]
        verbose: bool,
    },

    /// Print where session settings are read from and their values
    Config,
}
