//! CLI argument definitions using clap
//!
//! Commands:
//! - holdline init --config <path>
//! - holdline start --config <path>
//! - holdline roster --config <path> --shift <A|B|C>
//! - holdline seed --config <path> --shift <A|B|C> [--count N]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::roster::Shift;

/// holdline - shift-hold rotation tracker for fire department rosters
#[derive(Parser, Debug)]
#[command(name = "holdline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new holdline config and data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./holdline.json")]
        config: PathBuf,
    },

    /// Start the holdline server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./holdline.json")]
        config: PathBuf,
    },

    /// Print a shift's hold list
    Roster {
        /// Path to configuration file
        #[arg(long, default_value = "./holdline.json")]
        config: PathBuf,

        /// Shift to print (A, B, or C)
        #[arg(long)]
        shift: Shift,
    },

    /// Populate a shift with demo members
    Seed {
        /// Path to configuration file
        #[arg(long, default_value = "./holdline.json")]
        config: PathBuf,

        /// Shift to seed (A, B, or C)
        #[arg(long)]
        shift: Shift,

        /// Number of members to create
        #[arg(long, default_value_t = 6)]
        count: usize,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
