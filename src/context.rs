//! Per-run execution context shared by every pipe.

use crate::config::{Config, PrereleaseMode};
use crate::error::{ReleaseError, Result};
use crate::github::Repo;
use chrono::{DateTime, Utc};
use semver::Version;
use std::future::Future;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Git state of the revision being released
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    /// Tag being released
    pub current_tag: String,
    /// Tag of the previous release, if any
    pub previous_tag: Option<String>,
    /// Commit the tag points to
    pub commit: String,
}

/// Locally built file to attach to the release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Asset name on the release
    pub name: String,
    /// Location on disk
    pub path: PathBuf,
}

impl Artifact {
    /// Artifact named after its file name
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ReleaseError::config(format!("invalid artifact file name: {}", path.display()))
            })?
            .to_string();
        Ok(Self { name, path })
    }
}

/// State of one release run.
///
/// Created once before the first pipe runs and dropped when the run ends.
/// Pipes read configuration from it and record their outputs on it.
#[derive(Debug)]
pub struct Context {
    /// Resolved configuration
    pub config: Config,
    /// Revision being released
    pub git: GitInfo,
    /// Semantic version parsed from the tag
    pub version: Option<Version>,
    /// Whether the release is a pre-release
    pub prerelease: bool,
    /// Run start time
    pub date: DateTime<Utc>,
    /// Files to upload
    pub artifacts: Vec<Artifact>,
    /// Notes for the release body
    pub release_notes: Option<String>,
    /// Public URL of the release once created
    pub release_url: Option<String>,
    cancel: CancellationToken,
}

impl Context {
    /// Create the context for a run
    pub fn new(config: Config, git: GitInfo) -> Self {
        let version = Version::parse(git.current_tag.trim_start_matches('v')).ok();
        let prerelease = match config.release.prerelease {
            PrereleaseMode::Always => true,
            PrereleaseMode::Never => false,
            PrereleaseMode::Auto => version.as_ref().is_some_and(|v| !v.pre.is_empty()),
        };

        Self {
            config,
            git,
            version,
            prerelease,
            date: Utc::now(),
            artifacts: Vec::new(),
            release_notes: None,
            release_url: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that cancels this run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the run has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` unless the run is cancelled first
    pub async fn cancellable<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ReleaseError::Cancelled),
            output = fut => Ok(output),
        }
    }

    /// Repository receiving the release
    pub fn release_repo(&self) -> Result<Repo> {
        let github = &self.config.release.github;
        if !github.is_set() {
            return Err(ReleaseError::config(
                "release.github.owner and release.github.name are required",
            ));
        }
        Ok(github.to_repo())
    }
}
