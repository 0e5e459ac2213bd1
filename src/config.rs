//! Release configuration loaded from `.shipwright.toml`.
//!
//! Parsing only; each pipe fills in defaults for its own subtree.

use crate::error::{ReleaseError, Result};
use crate::github::Repo;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".shipwright.toml";

/// Complete configuration for a release run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project name exposed to templates
    pub project_name: String,
    /// GitHub release settings
    pub release: ReleaseConfig,
    /// Changelog settings
    pub changelog: ChangelogConfig,
    /// Milestones to close after releasing
    pub milestones: Vec<MilestoneConfig>,
    /// Release manifest committed to a repository
    pub manifest: ManifestConfig,
    /// Announcement settings
    pub announce: AnnounceConfig,
    /// Provider endpoints
    pub github_urls: GitHubUrls,
}

impl Config {
    /// Load and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ReleaseError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&raw)
    }

    /// Parse configuration from TOML source
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// Repository coordinates as written in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Branch override for file commits
    pub branch: Option<String>,
}

impl RepoConfig {
    /// Whether owner and name are both set
    pub fn is_set(&self) -> bool {
        !self.owner.is_empty() && !self.name.is_empty()
    }

    /// Convert into a provider repository handle
    pub fn to_repo(&self) -> Repo {
        Repo::new(&self.owner, &self.name).with_branch(self.branch.clone())
    }
}

/// How new notes combine with notes already on an existing release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotesMode {
    /// Existing notes win; new notes are used only when there are none
    #[default]
    KeepExisting,
    /// Existing notes, a blank line, then the new notes
    Append,
    /// New notes, a blank line, then the existing notes
    Prepend,
    /// New notes win
    Replace,
}

/// Whether the release is marked as a pre-release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrereleaseMode {
    /// Pre-release when the tag carries a semver pre-release component
    #[default]
    Auto,
    /// Always a pre-release
    #[serde(rename = "true")]
    Always,
    /// Never a pre-release
    #[serde(rename = "false")]
    Never,
}

/// GitHub release settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Repository receiving the release
    pub github: RepoConfig,
    /// Create the release as a draft
    pub draft: bool,
    /// Delete an existing draft with the same name before creating
    pub replace_existing_draft: bool,
    /// Pre-release policy
    pub prerelease: PrereleaseMode,
    /// Release title template
    pub name_template: String,
    /// Target commitish template
    pub target_commitish: String,
    /// Discussion category to open for the release
    pub discussion_category_name: String,
    /// Notes merge policy for existing releases
    pub mode: NotesMode,
    /// Glob patterns of additional files to upload
    pub extra_files: Vec<String>,
    /// Skip the release pipe
    pub disable: bool,
}

/// Changelog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Skip changelog generation
    pub disable: bool,
    /// Source of the changelog: `github` or `github-native`
    #[serde(rename = "use")]
    pub source: String,
    /// Template rendered above the notes
    pub header: String,
    /// Template rendered below the notes
    pub footer: String,
}

/// Milestone closing settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneConfig {
    /// Repository owning the milestone; defaults to the release repository
    pub repo: RepoConfig,
    /// Close the milestone
    pub close: bool,
    /// Fail the run when closing fails
    pub fail_on_error: bool,
    /// Milestone title template
    pub name_template: String,
}

/// Commit author for files pushed to repositories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    /// Author name
    pub name: String,
    /// Author email
    pub email: String,
}

/// Release manifest settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Commit a manifest after releasing
    pub enabled: bool,
    /// Repository receiving the manifest; defaults to the release repository
    pub repo: RepoConfig,
    /// File path template
    pub path: String,
    /// Commit message template
    pub commit_message_template: String,
    /// Commit author
    pub commit_author: CommitAuthor,
}

/// Announcement settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnounceConfig {
    /// Discord webhook announcement
    pub discord: DiscordConfig,
}

/// Discord announcement settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Post the announcement
    pub enabled: bool,
    /// Message template
    pub message_template: String,
    /// Embed author
    pub author: String,
    /// Embed color as a decimal string
    pub color: String,
    /// Embed author icon
    pub icon_url: String,
}

/// Provider endpoint overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubUrls {
    /// REST API base URL template
    pub api: String,
    /// Asset upload base URL template
    pub upload: String,
    /// Download base URL template
    pub download: String,
    /// Accept invalid TLS certificates
    pub skip_tls_verify: bool,
}
