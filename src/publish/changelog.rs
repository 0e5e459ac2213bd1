//! Release notes for the current tag.

use crate::context::Context;
use crate::error::{ReleaseError, Result};
use crate::github::GitHubClient;
use crate::pipeline::Pipe;
use crate::template::Template;
use async_trait::async_trait;

const USE_GITHUB: &str = "github";
const USE_GITHUB_NATIVE: &str = "github-native";

/// Builds the release notes and stores them on the context
pub struct ChangelogPipe {
    client: GitHubClient,
}

impl ChangelogPipe {
    /// Pipe backed by the given client
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    async fn build(&self, ctx: &Context) -> Result<String> {
        let Some(previous) = ctx.git.previous_tag.as_deref() else {
            log::info!(tag = ctx.git.current_tag.as_str(); "no previous tag, changelog is empty");
            return Ok(String::new());
        };
        let repo = ctx.release_repo()?;
        let current = ctx.git.current_tag.as_str();

        if ctx.config.changelog.source == USE_GITHUB_NATIVE {
            return self
                .client
                .generate_release_notes(ctx, &repo, previous, current)
                .await;
        }

        let log = self.client.changelog(ctx, &repo, previous, current).await?;
        if log.is_empty() {
            return Ok(String::new());
        }
        let entries: Vec<String> = log.lines().map(|line| format!("* {line}")).collect();
        Ok(format!("## Changelog\n\n{}", entries.join("\n")))
    }
}

#[async_trait]
impl Pipe for ChangelogPipe {
    fn name(&self) -> &'static str {
        "changelog"
    }

    fn skip(&self, ctx: &Context) -> bool {
        ctx.config.changelog.disable
    }

    fn default(&self, ctx: &mut Context) -> Result<()> {
        let changelog = &mut ctx.config.changelog;
        if changelog.source.is_empty() {
            changelog.source = USE_GITHUB.to_string();
        }
        if changelog.source != USE_GITHUB && changelog.source != USE_GITHUB_NATIVE {
            return Err(ReleaseError::config(format!(
                "invalid changelog.use '{}': expected '{USE_GITHUB}' or '{USE_GITHUB_NATIVE}'",
                changelog.source
            )));
        }
        Ok(())
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let notes = match ctx.release_notes.take() {
            Some(notes) => notes,
            None => self.build(ctx).await?,
        };

        let template = Template::new(ctx);
        let changelog = &ctx.config.changelog;
        let header = template.apply(&changelog.header)?;
        let footer = template.apply(&changelog.footer)?;

        let body = [header.as_str(), notes.as_str(), footer.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        ctx.release_notes = Some(body);
        Ok(())
    }
}
