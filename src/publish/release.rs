//! Creates or updates the GitHub release and uploads the artifacts.

use super::retry::retry_with_backoff;
use crate::cli::RetryConfig;
use crate::context::{Artifact, Context};
use crate::error::{ReleaseError, Result};
use crate::github::GitHubClient;
use crate::pipeline::Pipe;
use async_trait::async_trait;
use bytes::Bytes;

const DEFAULT_NAME_TEMPLATE: &str = "{{tag}}";

/// Publishes the release for the current tag
pub struct ReleasePipe {
    client: GitHubClient,
    retry: RetryConfig,
}

impl ReleasePipe {
    /// Pipe backed by the given client and upload retry policy
    pub fn new(client: GitHubClient, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    async fn upload_all(&self, ctx: &Context, release_id: &str) -> Result<()> {
        for artifact in &ctx.artifacts {
            let content = Bytes::from(tokio::fs::read(&artifact.path).await?);
            retry_with_backoff(
                ctx,
                || self.client.upload(ctx, release_id, artifact, content.clone()),
                &self.retry,
                &artifact.name,
            )
            .await?;
            log::info!(
                name = artifact.name.as_str(),
                size = content.len() as u64;
                "uploaded"
            );
        }
        Ok(())
    }
}

/// Expand `release.extra_files` globs into artifacts not already listed
fn extra_files(ctx: &Context) -> Result<Vec<Artifact>> {
    let mut found: Vec<Artifact> = Vec::new();
    for pattern in &ctx.config.release.extra_files {
        let paths = glob::glob(pattern).map_err(|e| {
            ReleaseError::config(format!("invalid extra_files pattern '{pattern}': {e}"))
        })?;
        for entry in paths {
            let path = entry.map_err(|e| ReleaseError::Io(e.into_error()))?;
            if !path.is_file() {
                continue;
            }
            let artifact = Artifact::from_path(path)?;
            let known = ctx.artifacts.iter().chain(found.iter()).any(|a| a.path == artifact.path);
            if !known {
                found.push(artifact);
            }
        }
    }
    Ok(found)
}

#[async_trait]
impl Pipe for ReleasePipe {
    fn name(&self) -> &'static str {
        "release"
    }

    fn skip(&self, ctx: &Context) -> bool {
        ctx.config.release.disable
    }

    fn default(&self, ctx: &mut Context) -> Result<()> {
        ctx.release_repo()?;
        let release = &mut ctx.config.release;
        if release.name_template.is_empty() {
            release.name_template = DEFAULT_NAME_TEMPLATE.to_string();
        }
        if release.replace_existing_draft && !release.draft {
            log::warn!("release.replace_existing_draft only applies to draft releases");
        }
        Ok(())
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let extra = extra_files(ctx)?;
        ctx.artifacts.extend(extra);

        let notes = ctx.release_notes.clone().unwrap_or_default();
        let release_id = self.client.create_release(ctx, &notes).await?;
        let url = self.client.release_url(ctx)?;
        log::info!(url = url.as_str(), release_id = release_id.as_str(); "release published");
        ctx.release_url = Some(url);

        self.upload_all(ctx, &release_id).await
    }
}
