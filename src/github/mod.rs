//! GitHub integration for release operations

mod api;
mod classify;
mod http;
mod metadata;
mod pagination;
mod release_manager;

pub use api::{
    Commit, CommitAuthorInfo, CommitDetail, FileContent, FileOptions, GitHubApi, ListOptions,
    Milestone, Page, Release, ReleaseRequest, RepositoryInfo, Response, User,
};
pub use classify::{Outcome, classify};
pub use http::{HttpGitHubApi, parse_next_page};
pub use pagination::{Paginator, collect_pages};
pub use release_manager::{
    GitHubClient, MAX_RELEASE_BODY_LENGTH, merge_release_notes, truncate_release_body,
};

use std::fmt;

/// Remote project addressed by lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Branch override for file commits
    pub branch: Option<String>,
}

impl Repo {
    /// Create a repository handle without a branch override
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch: None,
        }
    }

    /// Set the branch override; empty strings count as no override
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch.filter(|b| !b.is_empty());
        self
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
