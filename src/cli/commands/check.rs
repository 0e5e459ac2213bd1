//! Check command implementation.
//!
//! Loads the configuration and applies every pipe's defaults without talking
//! to any remote service.

use super::github_token;
use crate::cli::{Args, RetryConfig};
use crate::config::Config;
use crate::context::{Context, GitInfo};
use crate::error::Result;
use crate::github::{GitHubClient, HttpGitHubApi};
use crate::pipeline::Pipeline;
use crate::publish;
use std::sync::Arc;

const PLACEHOLDER_TAG: &str = "v0.0.0";

/// Execute check command
pub(super) async fn execute_check(args: &Args) -> Result<()> {
    let config = Config::load(&args.config)?;
    let git = GitInfo {
        current_tag: PLACEHOLDER_TAG.to_string(),
        ..GitInfo::default()
    };
    let mut ctx = Context::new(config, git);

    let token = github_token();
    if token.is_none() {
        log::warn!("no GitHub token found in GITHUB_TOKEN or GH_TOKEN; `release` will fail");
    }
    let client = GitHubClient::new(Arc::new(HttpGitHubApi::new(
        &ctx,
        token.as_deref().unwrap_or_default(),
    )?));
    let pipeline: Pipeline = publish::pipeline(client, RetryConfig::from_env());

    pipeline.apply_defaults(&mut ctx)?;

    println!("{}: configuration OK", args.config.display());
    for name in pipeline.names() {
        println!("  {name}");
    }
    Ok(())
}
