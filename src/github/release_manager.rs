//! GitHub Release management: create-or-update, draft deduplication,
//! notes merging and classified asset uploads.
//!
//! The create-or-update protocol is not safe under concurrent invocation for
//! the same tag. Callers that parallelise uploads must still create the
//! release once, up front.

use super::api::{GitHubApi, ListOptions, Release, ReleaseRequest};
use super::classify::{Outcome, classify};
use super::pagination::Paginator;
use super::Repo;
use crate::config::NotesMode;
use crate::context::{Artifact, Context};
use crate::error::{ReleaseError, Result};
use crate::template::Template;
use bytes::Bytes;
use std::sync::Arc;

/// Longest release body the provider accepts, in characters
pub const MAX_RELEASE_BODY_LENGTH: usize = 125_000;

const RELEASES_PER_PAGE: u32 = 50;

/// Release lifecycle operations against a hosting provider
#[derive(Clone)]
pub struct GitHubClient {
    pub(super) api: Arc<dyn GitHubApi>,
}

impl GitHubClient {
    /// Wrap a provider API
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self { api }
    }

    /// Create the release for the current tag, or update the existing one.
    ///
    /// Returns the provider release id as a string; [`GitHubClient::upload`]
    /// is the only consumer of it.
    pub async fn create_release(&self, ctx: &Context, body: &str) -> Result<String> {
        let release_config = &ctx.config.release;
        let repo = ctx.release_repo()?;
        let template = Template::new(ctx);
        let title = template.apply(&release_config.name_template)?;

        if release_config.draft && release_config.replace_existing_draft {
            self.delete_existing_draft_release(ctx, &repo, &title)
                .await?;
        }

        let body = truncate_release_body(body);

        let mut data = ReleaseRequest {
            name: title,
            tag_name: ctx.git.current_tag.clone(),
            body: body.to_string(),
            draft: release_config.draft,
            prerelease: ctx.prerelease,
            discussion_category_name: None,
            target_commitish: None,
        };

        if !release_config.discussion_category_name.is_empty() {
            data.discussion_category_name = Some(release_config.discussion_category_name.clone());
        }

        if !release_config.target_commitish.is_empty() {
            let target = template.apply(&release_config.target_commitish)?;
            if !target.is_empty() {
                data.target_commitish = Some(target);
            }
        }

        let release = self
            .create_or_update_release(ctx, &repo, data)
            .await
            .map_err(|e| match e {
                ReleaseError::Remote { context, source } => {
                    ReleaseError::remote(format!("could not release: {context}"), source)
                }
                other => other,
            })?;

        Ok(release.id.to_string())
    }

    async fn create_or_update_release(
        &self,
        ctx: &Context,
        repo: &Repo,
        mut data: ReleaseRequest,
    ) -> Result<Release> {
        let existing = ctx
            .cancellable(self.api.get_release_by_tag(repo, &data.tag_name))
            .await?;

        let existing = match existing {
            Ok(release) => release,
            Err(e) if e.is_not_found() => {
                let created = ctx
                    .cancellable(self.api.create_release(repo, &data))
                    .await?
                    .map_err(|e| ReleaseError::remote("create release", e))?;
                log::info!(
                    name = data.name.as_str(),
                    release_id = created.body.id,
                    request_id:? = created.request_id;
                    "release created"
                );
                return Ok(created.body);
            }
            Err(e) => return Err(ReleaseError::remote("get release by tag", e)),
        };

        let merged = merge_release_notes(
            existing.body.as_deref().unwrap_or_default(),
            &data.body,
            ctx.config.release.mode,
        );
        data.body = truncate_release_body(&merged).to_string();
        self.update_release(ctx, repo, existing.id, &data).await
    }

    async fn update_release(
        &self,
        ctx: &Context,
        repo: &Repo,
        id: u64,
        data: &ReleaseRequest,
    ) -> Result<Release> {
        let updated = ctx
            .cancellable(self.api.edit_release(repo, id, data))
            .await?
            .map_err(|e| ReleaseError::remote("edit release", e))?;
        log::info!(
            name = data.name.as_str(),
            release_id = updated.body.id,
            request_id:? = updated.request_id;
            "release updated"
        );
        Ok(updated.body)
    }

    /// Delete the newest draft titled `name`.
    ///
    /// Pages are scanned in provider order (newest first) until a match is
    /// deleted or the listing is exhausted. No match is not an error.
    async fn delete_existing_draft_release(
        &self,
        ctx: &Context,
        repo: &Repo,
        name: &str,
    ) -> Result<()> {
        let api = self.api.as_ref();
        let opts = ListOptions::per_page(RELEASES_PER_PAGE);
        let mut pages = Paginator::new(|page| api.list_releases(repo, opts.at(page)));

        while let Some(page) = ctx.cancellable(pages.next_page()).await? {
            let releases =
                page.map_err(|e| ReleaseError::remote("could not delete existing drafts", e))?;

            let Some(draft) = releases
                .into_iter()
                .find(|r| r.draft && r.name.as_deref() == Some(name))
            else {
                continue;
            };

            ctx.cancellable(self.api.delete_release(repo, draft.id))
                .await?
                .map_err(|e| ReleaseError::remote("could not delete previous draft release", e))?;

            log::info!(
                commit:? = draft.target_commitish,
                tag = draft.tag_name.as_str(),
                name = name;
                "deleted previous draft release"
            );
            return Ok(());
        }

        Ok(())
    }

    /// Upload one artifact to a release created by [`GitHubClient::create_release`].
    ///
    /// A 422 (asset name taken) is returned as [`ReleaseError::UploadFatal`];
    /// any other failure is [`ReleaseError::Retriable`].
    pub async fn upload(
        &self,
        ctx: &Context,
        release_id: &str,
        artifact: &Artifact,
        content: Bytes,
    ) -> Result<()> {
        let id: u64 = release_id
            .parse()
            .map_err(|source| ReleaseError::InvalidReleaseId {
                id: release_id.to_string(),
                source,
            })?;
        let repo = ctx.release_repo()?;

        let result = ctx
            .cancellable(
                self.api
                    .upload_release_asset(&repo, id, &artifact.name, content),
            )
            .await?;

        let outcome = classify(&result);
        let Err(err) = result else {
            return Ok(());
        };

        log::warn!(
            name = artifact.name.as_str(),
            release_id = release_id,
            request_id = err.request_id.as_deref().unwrap_or_default();
            "upload failed"
        );

        match outcome {
            Outcome::Fatal => Err(ReleaseError::UploadFatal {
                name: artifact.name.clone(),
                source: err,
            }),
            Outcome::Success | Outcome::Retriable => Err(ReleaseError::Retriable { source: err }),
        }
    }

    /// Download URL pattern for assets of this project.
    ///
    /// The result still contains `{{tag}}` and `{{artifact_name}}` for later
    /// rendering.
    pub fn release_url_template(&self, ctx: &Context) -> Result<String> {
        let download = download_url(ctx)?;
        let repo = ctx.release_repo()?;
        Ok(format!(
            "{}/{}/{}/releases/download/{{{{tag}}}}/{{{{artifact_name}}}}",
            download, repo.owner, repo.name
        ))
    }

    /// Public page of the release for the current tag
    pub fn release_url(&self, ctx: &Context) -> Result<String> {
        let download = download_url(ctx)?;
        let repo = ctx.release_repo()?;
        Ok(format!(
            "{}/{}/{}/releases/tag/{}",
            download, repo.owner, repo.name, ctx.git.current_tag
        ))
    }
}

const DEFAULT_DOWNLOAD_URL: &str = "https://github.com";

fn download_url(ctx: &Context) -> Result<String> {
    let configured = &ctx.config.github_urls.download;
    if configured.is_empty() {
        return Ok(DEFAULT_DOWNLOAD_URL.to_string());
    }
    let rendered = Template::new(ctx).apply(configured)?;
    Ok(rendered.trim_end_matches('/').to_string())
}

/// Cut `body` to at most [`MAX_RELEASE_BODY_LENGTH`] characters
pub fn truncate_release_body(body: &str) -> &str {
    match body.char_indices().nth(MAX_RELEASE_BODY_LENGTH) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

/// Combine the notes on an existing release with newly generated ones
pub fn merge_release_notes(existing: &str, proposed: &str, mode: NotesMode) -> String {
    match mode {
        NotesMode::Replace => proposed.to_string(),
        NotesMode::Append => format!("{existing}\n\n{proposed}"),
        NotesMode::Prepend => format!("{proposed}\n\n{existing}"),
        NotesMode::KeepExisting if existing.is_empty() => proposed.to_string(),
        NotesMode::KeepExisting => existing.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_bodies() {
        assert_eq!(truncate_release_body("notes"), "notes");
        let exact = "a".repeat(MAX_RELEASE_BODY_LENGTH);
        assert_eq!(truncate_release_body(&exact).len(), MAX_RELEASE_BODY_LENGTH);
    }

    #[test]
    fn test_truncate_long_body_is_prefix() {
        let body = "x".repeat(MAX_RELEASE_BODY_LENGTH + 10);
        let truncated = truncate_release_body(&body);
        assert_eq!(truncated.chars().count(), MAX_RELEASE_BODY_LENGTH);
        assert!(body.starts_with(truncated));
    }

    #[test]
    fn test_truncate_respects_multibyte_characters() {
        let body = "é".repeat(MAX_RELEASE_BODY_LENGTH + 1);
        let truncated = truncate_release_body(&body);
        assert_eq!(truncated.chars().count(), MAX_RELEASE_BODY_LENGTH);
        assert!(body.starts_with(truncated));
    }

    #[test]
    fn test_merge_modes() {
        assert_eq!(merge_release_notes("old", "new", NotesMode::Replace), "new");
        assert_eq!(merge_release_notes("old", "new", NotesMode::Append), "old\n\nnew");
        assert_eq!(merge_release_notes("old", "new", NotesMode::Prepend), "new\n\nold");
        assert_eq!(merge_release_notes("old", "new", NotesMode::KeepExisting), "old");
        assert_eq!(merge_release_notes("", "new", NotesMode::KeepExisting), "new");
    }
}
