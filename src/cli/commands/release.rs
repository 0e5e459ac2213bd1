//! Release command implementation.
//!
//! Builds the run context from the configuration file and the command line,
//! then drives the publishing pipeline until it completes, fails or is
//! interrupted.

use super::github_token;
use crate::cli::{Args, Command, RetryConfig};
use crate::config::Config;
use crate::context::{Artifact, Context, GitInfo};
use crate::error::{ReleaseError, Result};
use crate::github::{GitHubClient, HttpGitHubApi};
use crate::pipeline::PipeStatus;
use crate::publish;
use std::sync::Arc;

/// Execute release command
pub(super) async fn execute_release(args: &Args) -> Result<()> {
    let Command::Release {
        tag,
        previous_tag,
        commit,
        release_notes,
        artifacts,
    } = &args.command
    else {
        unreachable!("execute_release called with non-Release command");
    };

    let config = Config::load(&args.config)?;
    let git = GitInfo {
        current_tag: tag.clone(),
        previous_tag: previous_tag.clone(),
        commit: commit.clone(),
    };
    let mut ctx = Context::new(config, git);

    if let Some(path) = release_notes {
        ctx.release_notes = Some(tokio::fs::read_to_string(path).await?);
    }
    for path in artifacts {
        if !path.is_file() {
            return Err(ReleaseError::config(format!(
                "artifact not found: {}",
                path.display()
            )));
        }
        ctx.artifacts.push(Artifact::from_path(path)?);
    }

    let token = github_token().ok_or_else(|| {
        ReleaseError::config("no GitHub token found in GITHUB_TOKEN or GH_TOKEN")
    })?;
    let client = GitHubClient::new(Arc::new(HttpGitHubApi::new(&ctx, &token)?));
    let pipeline = publish::pipeline(client, RetryConfig::from_env());

    let cancel = ctx.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, cancelling release");
            cancel.cancel();
        }
    });

    log::info!(
        tag = ctx.git.current_tag.as_str(),
        artifacts = ctx.artifacts.len() as u64;
        "starting release"
    );
    let outcome = pipeline.run(&mut ctx).await;
    interrupt.abort();
    let report = outcome?;

    for (pipe, status) in &report.pipes {
        if *status == PipeStatus::Completed {
            log::debug!(pipe = *pipe; "completed");
        }
    }
    if let Some(url) = &ctx.release_url {
        println!("{url}");
    }
    Ok(())
}
