//! Provider API surface consumed by the release manager.
//!
//! [`GitHubApi`] is one method per REST call. The release manager layers the
//! lifecycle protocol on top; [`super::HttpGitHubApi`] is the production
//! implementation.

use super::Repo;
use crate::error::ApiError;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Release as returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Provider identifier
    pub id: u64,
    /// Release title
    #[serde(default)]
    pub name: Option<String>,
    /// Tag the release is attached to
    pub tag_name: String,
    /// Release notes
    #[serde(default)]
    pub body: Option<String>,
    /// Draft flag
    #[serde(default)]
    pub draft: bool,
    /// Pre-release flag
    #[serde(default)]
    pub prerelease: bool,
    /// Commit or branch the tag is created from
    #[serde(default)]
    pub target_commitish: Option<String>,
    /// Discussion category opened for the release
    #[serde(default)]
    pub discussion_category_name: Option<String>,
    /// Public page of the release
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Payload for creating or editing a release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseRequest {
    /// Release title
    pub name: String,
    /// Tag name
    pub tag_name: String,
    /// Release notes
    pub body: String,
    /// Draft flag
    pub draft: bool,
    /// Pre-release flag
    pub prerelease: bool,
    /// Discussion category to open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discussion_category_name: Option<String>,
    /// Commit or branch to tag from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
}

/// Successful response with the request id the provider assigned
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// Decoded body
    pub body: T,
    /// `X-GitHub-Request-Id` header
    pub request_id: Option<String>,
}

/// Query parameters shared by every listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Page to request; `None` requests the first page
    pub page: Option<u32>,
    /// Items per page
    pub per_page: u32,
}

impl ListOptions {
    /// First page with the given size
    pub fn per_page(per_page: u32) -> Self {
        Self {
            page: None,
            per_page,
        }
    }

    /// Same options pointed at another page
    pub fn at(self, page: Option<u32>) -> Self {
        Self { page, ..self }
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in provider order
    pub items: Vec<T>,
    /// Next page number; `None` or `Some(0)` marks the last page
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    /// Final page
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }
}

/// Account reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name
    pub login: String,
}

/// Git-level commit data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    /// Full commit message
    pub message: String,
}

/// Commit entry from a compare listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit SHA
    pub sha: String,
    /// Git commit data
    pub commit: CommitDetail,
    /// Linked provider account, absent for unknown emails
    #[serde(default)]
    pub author: Option<User>,
}

/// Repository metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// Default branch name
    pub default_branch: String,
}

/// Milestone entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Provider number
    pub number: u64,
    /// Title
    pub title: String,
    /// `open` or `closed`
    pub state: String,
}

/// Existing file in a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    /// Blob SHA required to update the file
    pub sha: String,
}

/// Commit identity for file writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitAuthorInfo {
    /// Author name
    pub name: String,
    /// Author email
    pub email: String,
}

/// Parameters of a single-file create or update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Commit message
    pub message: String,
    /// Raw file content
    pub content: Vec<u8>,
    /// Target branch; provider default when absent
    pub branch: Option<String>,
    /// Blob SHA of the file being replaced
    pub sha: Option<String>,
    /// Committer
    pub committer: CommitAuthorInfo,
}

/// Hosting provider REST calls
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Fetch the release attached to a tag
    async fn get_release_by_tag(&self, repo: &Repo, tag: &str) -> Result<Release, ApiError>;

    /// Create a release
    async fn create_release(
        &self,
        repo: &Repo,
        release: &ReleaseRequest,
    ) -> Result<Response<Release>, ApiError>;

    /// Replace the attributes of an existing release
    async fn edit_release(
        &self,
        repo: &Repo,
        id: u64,
        release: &ReleaseRequest,
    ) -> Result<Response<Release>, ApiError>;

    /// Delete a release
    async fn delete_release(&self, repo: &Repo, id: u64) -> Result<(), ApiError>;

    /// List releases, newest first
    async fn list_releases(&self, repo: &Repo, opts: ListOptions)
    -> Result<Page<Release>, ApiError>;

    /// Upload an asset to a release
    async fn upload_release_asset(
        &self,
        repo: &Repo,
        release_id: u64,
        name: &str,
        content: Bytes,
    ) -> Result<(), ApiError>;

    /// List commits between two refs in chronological order
    async fn compare_commits(
        &self,
        repo: &Repo,
        base: &str,
        head: &str,
        opts: ListOptions,
    ) -> Result<Page<Commit>, ApiError>;

    /// Let the provider generate notes between two tags
    async fn generate_release_notes(
        &self,
        repo: &Repo,
        tag: &str,
        previous_tag: &str,
    ) -> Result<String, ApiError>;

    /// Fetch repository metadata
    async fn get_repository(&self, repo: &Repo) -> Result<RepositoryInfo, ApiError>;

    /// List milestones
    async fn list_milestones(
        &self,
        repo: &Repo,
        opts: ListOptions,
    ) -> Result<Page<Milestone>, ApiError>;

    /// Persist a milestone
    async fn edit_milestone(&self, repo: &Repo, milestone: &Milestone) -> Result<(), ApiError>;

    /// Look up a file, optionally on a branch
    async fn get_contents(
        &self,
        repo: &Repo,
        path: &str,
        branch: Option<&str>,
    ) -> Result<FileContent, ApiError>;

    /// Create a file
    async fn create_file(&self, repo: &Repo, path: &str, opts: &FileOptions)
    -> Result<(), ApiError>;

    /// Update a file; `opts.sha` identifies the replaced blob
    async fn update_file(&self, repo: &Repo, path: &str, opts: &FileOptions)
    -> Result<(), ApiError>;
}
