//! Commits a JSON manifest describing the release to a repository.

use crate::config::Config;
use crate::context::Context;
use crate::error::{ReleaseError, Result};
use crate::github::GitHubClient;
use crate::pipeline::Pipe;
use crate::template::Template;
use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};

const DEFAULT_PATH: &str = "releases/{{tag}}.json";
const DEFAULT_COMMIT_MESSAGE: &str = "Release manifest for {{project_name}} {{tag}}";
const DEFAULT_AUTHOR_NAME: &str = "shipwrightbot";
const DEFAULT_AUTHOR_EMAIL: &str = "bot@shipwright.dev";

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    project_name: &'a str,
    tag: &'a str,
    version: String,
    commit: &'a str,
    prerelease: bool,
    release_url: Option<&'a str>,
    date: String,
    artifacts: Vec<ManifestArtifact>,
}

#[derive(Debug, Serialize)]
struct ManifestArtifact {
    name: String,
    url: String,
    sha256: String,
    size: u64,
}

/// Records the release in a repository file
pub struct ManifestPipe {
    client: GitHubClient,
}

impl ManifestPipe {
    /// Pipe backed by the given client
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

/// Digest each artifact; `url_template` is rendered per artifact with
/// `{{artifact_name}}` bound
async fn describe(ctx: &Context, url_template: &str) -> Result<Vec<ManifestArtifact>> {
    let mut artifacts = Vec::with_capacity(ctx.artifacts.len());
    for artifact in &ctx.artifacts {
        let content = tokio::fs::read(&artifact.path).await?;
        let url = Template::new(ctx)
            .with_field("artifact_name", artifact.name.as_str())
            .apply(url_template)?;
        artifacts.push(ManifestArtifact {
            name: artifact.name.clone(),
            url,
            sha256: hex::encode(Sha256::digest(&content)),
            size: content.len() as u64,
        });
    }
    Ok(artifacts)
}

fn apply_defaults(config: &mut Config) {
    let fallback = config.release.github.clone();
    let manifest = &mut config.manifest;
    if !manifest.repo.is_set() {
        manifest.repo = fallback;
    }
    if manifest.path.is_empty() {
        manifest.path = DEFAULT_PATH.to_string();
    }
    if manifest.commit_message_template.is_empty() {
        manifest.commit_message_template = DEFAULT_COMMIT_MESSAGE.to_string();
    }
    if manifest.commit_author.name.is_empty() {
        manifest.commit_author.name = DEFAULT_AUTHOR_NAME.to_string();
    }
    if manifest.commit_author.email.is_empty() {
        manifest.commit_author.email = DEFAULT_AUTHOR_EMAIL.to_string();
    }
}

#[async_trait]
impl Pipe for ManifestPipe {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn skip(&self, ctx: &Context) -> bool {
        !ctx.config.manifest.enabled
    }

    fn default(&self, ctx: &mut Context) -> Result<()> {
        apply_defaults(&mut ctx.config);
        if !ctx.config.manifest.repo.is_set() {
            return Err(ReleaseError::config("manifest repository is not set"));
        }
        Ok(())
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let ctx: &Context = ctx;
        let template = Template::new(ctx);
        let config = &ctx.config.manifest;

        let path = template.apply(&config.path)?;
        let message = template.apply(&config.commit_message_template)?;
        let download = self.client.release_url_template(ctx)?;

        let manifest = Manifest {
            project_name: &ctx.config.project_name,
            tag: &ctx.git.current_tag,
            version: ctx
                .version
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| ctx.git.current_tag.trim_start_matches('v').to_string()),
            commit: &ctx.git.commit,
            prerelease: ctx.prerelease,
            release_url: ctx.release_url.as_deref(),
            date: ctx.date.to_rfc3339(),
            artifacts: describe(ctx, &download).await?,
        };
        let mut content = serde_json::to_vec_pretty(&manifest)?;
        content.push(b'\n');

        let repo = config.repo.to_repo();
        self.client
            .create_file(ctx, &config.commit_author, &repo, content, &path, &message)
            .await?;

        log::info!(repo:% = repo, path = path.as_str(); "manifest committed");
        Ok(())
    }
}
