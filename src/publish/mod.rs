//! Publishing pipes and their fixed execution order.

mod changelog;
mod discord;
mod manifest;
mod milestone;
mod release;
pub mod retry;

pub use changelog::ChangelogPipe;
pub use discord::DiscordPipe;
pub use manifest::ManifestPipe;
pub use milestone::MilestonePipe;
pub use release::ReleasePipe;

use crate::cli::RetryConfig;
use crate::github::GitHubClient;
use crate::pipeline::{Pipe, Pipeline};

/// Built-in pipes in execution order.
///
/// Notes must exist before the release is created, and the release URL must
/// exist before anything announces or records it.
pub fn default_pipes(client: GitHubClient, retry: RetryConfig) -> Vec<Box<dyn Pipe>> {
    vec![
        Box::new(ChangelogPipe::new(client.clone())),
        Box::new(ReleasePipe::new(client.clone(), retry)),
        Box::new(MilestonePipe::new(client.clone())),
        Box::new(ManifestPipe::new(client)),
        Box::new(DiscordPipe::new()),
    ]
}

/// Pipeline over [`default_pipes`]
pub fn pipeline(client: GitHubClient, retry: RetryConfig) -> Pipeline {
    Pipeline::new(default_pipes(client, retry))
}
