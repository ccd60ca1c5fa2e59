//! CLI command handlers
//!
//! Argument parsing, command routing and terminal rendering.

pub mod args;
pub mod commands;
pub mod render;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;

/// Log filter for a `-v` count
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,hyper=debug,tower=debug",
    }
}
