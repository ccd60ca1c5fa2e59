//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Practice writing against criteria drawn from what the piece is for
#[derive(Parser)]
#[command(name = "writing-gym")]
#[command(about = "writing-gym - Draft, self-assess and revise with an AI writing coach", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the coaching API
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run an interactive coaching session in the terminal
    Coach {
        /// Use a running Writing Gym API instead of calling the model directly
        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },
}
