//! Command line interface for release_publisher.
//!
//! This module provides argument parsing, command execution and colored
//! user feedback around the publishing pipeline.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, GatherArgs, PublishArgs, RepoArgs, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::config::EnvConfig;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let env = EnvConfig::from_process();
    execute_command(args, &env).await
}
