//! Command execution.

mod check;
mod release;

use crate::cli::{Args, Command};
use crate::error::{ReleaseError, Result};

use check::execute_check;
use release::execute_release;

/// Exit code for invalid command line arguments
pub const EXIT_USAGE: i32 = 2;
/// Exit code when the run was interrupted
pub const EXIT_CANCELLED: i32 = 130;

/// Execute the parsed command and map its outcome to an exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        eprintln!("Invalid arguments: {validation_error}");
        return Ok(EXIT_USAGE);
    }

    let result = match &args.command {
        Command::Release { .. } => execute_release(&args).await,
        Command::Check => execute_check(&args).await,
    };

    match result {
        Ok(()) => Ok(0),
        Err(ReleaseError::Cancelled) => {
            eprintln!("Command '{}' cancelled", args.command.name());
            Ok(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("Command '{}' failed: {e}", args.command.name());

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                eprintln!("\nRecovery suggestions:");
                for suggestion in suggestions {
                    eprintln!("  • {suggestion}");
                }
            }

            Ok(1)
        }
    }
}

/// Token from `GITHUB_TOKEN`, falling back to `GH_TOKEN`
pub(crate) fn github_token() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|token| !token.trim().is_empty())
}
