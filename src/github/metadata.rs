//! Changelogs, default branches, milestones and single-file commits.

use super::api::{CommitAuthorInfo, FileOptions, ListOptions, Milestone};
use super::pagination::{Paginator, collect_pages};
use super::{GitHubClient, Repo};
use crate::config::CommitAuthor;
use crate::context::Context;
use crate::error::{ReleaseError, Result};

const COMMITS_PER_PAGE: u32 = 100;
const MILESTONES_PER_PAGE: u32 = 100;

impl GitHubClient {
    /// One line per commit between `prev` and `current`, oldest first
    pub async fn changelog(
        &self,
        ctx: &Context,
        repo: &Repo,
        prev: &str,
        current: &str,
    ) -> Result<String> {
        let api = self.api.as_ref();
        let opts = ListOptions::per_page(COMMITS_PER_PAGE);
        let commits = ctx
            .cancellable(collect_pages(|page| {
                api.compare_commits(repo, prev, current, opts.at(page))
            }))
            .await?
            .map_err(|e| ReleaseError::remote(format!("compare {prev}...{current}"), e))?;

        let lines: Vec<String> = commits
            .iter()
            .map(|commit| {
                format!(
                    "{}: {} (@{})",
                    commit.sha.chars().take(7).collect::<String>(),
                    commit.commit.message.lines().next().unwrap_or_default(),
                    commit
                        .author
                        .as_ref()
                        .map(|a| a.login.as_str())
                        .unwrap_or_default(),
                )
            })
            .collect();

        Ok(lines.join("\n"))
    }

    /// Notes generated by the provider between two tags
    pub async fn generate_release_notes(
        &self,
        ctx: &Context,
        repo: &Repo,
        prev: &str,
        current: &str,
    ) -> Result<String> {
        ctx.cancellable(self.api.generate_release_notes(repo, current, prev))
            .await?
            .map_err(|e| ReleaseError::remote("generate release notes", e))
    }

    /// Default branch of a repository
    pub async fn default_branch(&self, ctx: &Context, repo: &Repo) -> Result<String> {
        match ctx.cancellable(self.api.get_repository(repo)).await? {
            Ok(info) => Ok(info.default_branch),
            Err(e) => {
                log::warn!(
                    project_id:% = repo,
                    status_code = e.status.unwrap_or_default(),
                    err:% = e;
                    "error checking for default branch"
                );
                Err(ReleaseError::remote("get repository", e))
            }
        }
    }

    /// Close the first milestone titled `title`, in provider listing order
    pub async fn close_milestone(&self, ctx: &Context, repo: &Repo, title: &str) -> Result<()> {
        let Some(mut milestone) = self.milestone_by_title(ctx, repo, title).await? else {
            return Err(ReleaseError::MilestoneNotFound {
                title: title.to_string(),
            });
        };

        milestone.state = "closed".to_string();
        ctx.cancellable(self.api.edit_milestone(repo, &milestone))
            .await?
            .map_err(|e| ReleaseError::remote("edit milestone", e))
    }

    // The provider has no lookup by title.
    async fn milestone_by_title(
        &self,
        ctx: &Context,
        repo: &Repo,
        title: &str,
    ) -> Result<Option<Milestone>> {
        let api = self.api.as_ref();
        let opts = ListOptions::per_page(MILESTONES_PER_PAGE);
        let mut pages = Paginator::new(|page| api.list_milestones(repo, opts.at(page)));

        while let Some(page) = ctx.cancellable(pages.next_page()).await? {
            let milestones = page.map_err(|e| ReleaseError::remote("list milestones", e))?;
            if let Some(found) = milestones.into_iter().find(|m| m.title == title) {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// Create or update a single file on the repository's target branch
    pub async fn create_file(
        &self,
        ctx: &Context,
        commit_author: &CommitAuthor,
        repo: &Repo,
        content: Vec<u8>,
        path: &str,
        message: &str,
    ) -> Result<()> {
        let branch = match &repo.branch {
            Some(branch) => Some(branch.clone()),
            None => match self.default_branch(ctx, repo).await {
                Ok(branch) => Some(branch),
                Err(ReleaseError::Cancelled) => return Err(ReleaseError::Cancelled),
                Err(e) => {
                    log::warn!(
                        file_name = path,
                        project_id:% = repo,
                        err:% = e;
                        "error checking for default branch, using provider default"
                    );
                    None
                }
            },
        };

        let mut options = FileOptions {
            message: message.to_string(),
            content,
            branch,
            sha: None,
            committer: CommitAuthorInfo {
                name: commit_author.name.clone(),
                email: commit_author.email.clone(),
            },
        };

        let existing = ctx
            .cancellable(
                self.api
                    .get_contents(repo, path, options.branch.as_deref()),
            )
            .await?;

        match existing {
            Ok(file) => {
                options.sha = Some(file.sha);
                ctx.cancellable(self.api.update_file(repo, path, &options))
                    .await?
                    .map_err(|e| ReleaseError::remote(format!("update {path}"), e))
            }
            Err(e) if e.is_not_found() => ctx
                .cancellable(self.api.create_file(repo, path, &options))
                .await?
                .map_err(|e| ReleaseError::remote(format!("create {path}"), e)),
            Err(e) => Err(ReleaseError::remote(format!("get contents of {path}"), e)),
        }
    }
}
