//! Shipwright - publish GitHub releases for an existing tag.

use shipwright::cli::{self, Args};
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    match cli::run(args).await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("Fatal error: {e}");

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                eprintln!("\nRecovery suggestions:");
                for suggestion in suggestions {
                    eprintln!("  • {suggestion}");
                }
            }

            process::exit(1);
        }
    }
}
