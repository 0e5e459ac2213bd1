//! Closes milestones named after the release.

use crate::context::Context;
use crate::error::{ReleaseError, Result};
use crate::github::GitHubClient;
use crate::pipeline::Pipe;
use crate::template::Template;
use async_trait::async_trait;

const DEFAULT_NAME_TEMPLATE: &str = "{{tag}}";

/// Closes every milestone configured with `close = true`
pub struct MilestonePipe {
    client: GitHubClient,
}

impl MilestonePipe {
    /// Pipe backed by the given client
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Pipe for MilestonePipe {
    fn name(&self) -> &'static str {
        "milestone"
    }

    fn skip(&self, ctx: &Context) -> bool {
        !ctx.config.milestones.iter().any(|m| m.close)
    }

    fn default(&self, ctx: &mut Context) -> Result<()> {
        let fallback = ctx.config.release.github.clone();
        for milestone in &mut ctx.config.milestones {
            if !milestone.repo.is_set() {
                milestone.repo = fallback.clone();
            }
            if milestone.name_template.is_empty() {
                milestone.name_template = DEFAULT_NAME_TEMPLATE.to_string();
            }
            if milestone.close && !milestone.repo.is_set() {
                return Err(ReleaseError::config(
                    "milestone repository is not set and there is no release repository to fall back to",
                ));
            }
        }
        Ok(())
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        let ctx: &Context = ctx;
        let template = Template::new(ctx);

        for milestone in ctx.config.milestones.iter().filter(|m| m.close) {
            let title = template.apply(&milestone.name_template)?;
            let repo = milestone.repo.to_repo();

            match self.client.close_milestone(ctx, &repo, &title).await {
                Ok(()) => {
                    log::info!(repo:% = repo, title = title.as_str(); "closed milestone");
                }
                Err(ReleaseError::Cancelled) => return Err(ReleaseError::Cancelled),
                Err(e) if milestone.fail_on_error => return Err(e),
                Err(e) => {
                    log::warn!(
                        repo:% = repo,
                        title = title.as_str(),
                        err:% = e;
                        "failed to close milestone"
                    );
                }
            }
        }
        Ok(())
    }
}
