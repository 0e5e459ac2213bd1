//! Command line interface for shipwright.

mod args;
pub mod commands;
mod retry_config;

pub use args::{Args, Command};
pub use commands::execute_command;
pub use retry_config::RetryConfig;

use crate::error::Result;

/// Main CLI entry point
pub async fn run(args: Args) -> Result<i32> {
    execute_command(args).await
}

/// Parse arguments without executing (for testing)
pub fn parse_args() -> Args {
    Args::parse_args()
}
