//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

/// Publish GitHub releases for an existing tag
#[derive(Parser, Debug)]
#[command(
    name = "shipwright",
    version,
    about = "Publish GitHub releases for an existing tag",
    long_about = "Create or update the GitHub release for a tag, upload artifacts,
close milestones, commit a release manifest and announce the release.

Usage:
  shipwright release --tag v1.2.0 --previous-tag v1.1.0 dist/*.tar.gz
  shipwright check --config .shipwright.toml"
)]
pub struct Args {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the publishing pipeline for a tag
    Release {
        /// Tag being released
        #[arg(long, env = "SHIPWRIGHT_TAG")]
        tag: String,

        /// Previous tag; the changelog is empty without it
        #[arg(long)]
        previous_tag: Option<String>,

        /// Commit the tag points at
        #[arg(long, default_value = "")]
        commit: String,

        /// Use this file as the release notes instead of generating them
        #[arg(long, value_name = "FILE")]
        release_notes: Option<PathBuf>,

        /// Files to upload to the release
        #[arg(value_name = "ARTIFACT")]
        artifacts: Vec<PathBuf>,
    },

    /// Validate the configuration without publishing
    Check,
}

impl Command {
    /// Command name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Release { .. } => "release",
            Command::Check => "check",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Release {
            tag, previous_tag, ..
        } = &self.command
        {
            if tag.trim().is_empty() {
                return Err("--tag must not be empty".to_string());
            }
            if previous_tag.as_deref() == Some(tag.as_str()) {
                return Err("--previous-tag must differ from --tag".to_string());
            }
        }
        Ok(())
    }
}
