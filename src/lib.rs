//! # Shipwright
//!
//! Publishes GitHub releases for an existing tag.
//!
//! A run is a fixed pipeline of publishing stages sharing one [`Context`]:
//!
//! - **changelog**: release notes from the commits between two tags, or from
//!   GitHub's generated notes
//! - **release**: idempotent create-or-update of the release for the tag,
//!   followed by artifact uploads with classified retries
//! - **milestone**: closes milestones named after the release
//! - **manifest**: commits a JSON description of the release to a repository
//! - **discord**: posts an announcement to a webhook
//!
//! ## Usage
//!
//! ```bash
//! shipwright release --tag v1.2.0 --previous-tag v1.1.0 dist/*.tar.gz
//! shipwright check --config .shipwright.toml
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod github;
pub mod pipeline;
pub mod publish;
pub mod template;

pub use cli::{Args, RetryConfig};
pub use config::Config;
pub use context::{Artifact, Context, GitInfo};
pub use error::{ApiError, Phase, ReleaseError, Result};
pub use github::{GitHubApi, GitHubClient, Repo};
pub use pipeline::{Pipe, PipeStatus, Pipeline, PipelineReport};
pub use template::Template;
