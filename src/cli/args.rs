//! Command line argument parsing and validation.

use crate::error::CliError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Staged release publisher
#[derive(Parser, Debug)]
#[command(
    name = "release_publisher",
    version,
    about = "Create a draft release, upload every artifact, publish only if all uploads succeed",
    long_about = "Create a draft release, upload every artifact, publish only if all uploads succeed.

Usage:
  release_publisher publish --tag v1.0.0 --repo owner/repo
  release_publisher publish --tag v1.0.0 --asset dist/app.zip --asset dist/app.dmg
  release_publisher preview --tag v1.0.0
  release_publisher status --repo owner/repo --release-id 42

The API token is read from --token, GH_TOKEN or GITHUB_TOKEN."
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Suppress everything but errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show detailed progress
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a draft release, upload artifacts and publish it
    Publish(PublishArgs),

    /// Show what would be published without contacting the service
    Preview(GatherArgs),

    /// Show the state of an existing release
    Status {
        /// Repository and credentials
        #[command(flatten)]
        repo: RepoArgs,

        /// Release identifier printed by a previous run
        #[arg(long, value_name = "ID")]
        release_id: u64,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Publish(_) => "publish",
            Command::Preview(_) => "preview",
            Command::Status { .. } => "status",
        }
    }
}

/// Inputs gathered before any network call
#[derive(clap::Args, Debug, Clone)]
pub struct GatherArgs {
    /// Release tag, e.g. v1.0.0
    #[arg(long)]
    pub tag: String,

    /// Release title (default: "Release <version>")
    #[arg(long)]
    pub title: Option<String>,

    /// Directory scanned for installers when no --asset is given
    #[arg(long, default_value = "dist", value_name = "DIR")]
    pub dist: PathBuf,

    /// Explicit artifact to upload; repeatable, order is kept
    #[arg(long = "asset", value_name = "FILE")]
    pub assets: Vec<PathBuf>,

    /// Changelog the release notes are extracted from
    #[arg(long, default_value = "CHANGELOG.md", value_name = "FILE")]
    pub changelog: PathBuf,

    /// Use this file's content as release notes instead of the changelog
    #[arg(long, value_name = "FILE", conflicts_with = "changelog")]
    pub notes_file: Option<PathBuf>,
}

/// Repository identity and credentials
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RepoArgs {
    /// Repository as owner/repo or remote URL (default: $GITHUB_REPOSITORY)
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// API token (default: $GH_TOKEN, then $GITHUB_TOKEN)
    #[arg(long)]
    pub token: Option<String>,
}

/// Arguments of the `publish` command
#[derive(clap::Args, Debug, Clone)]
pub struct PublishArgs {
    /// Artifacts and notes
    #[command(flatten)]
    pub gather: GatherArgs,

    /// Repository and credentials
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Always mark the release as prerelease
    #[arg(long, conflicts_with = "no_prerelease")]
    pub prerelease: bool,

    /// Never mark the release as prerelease (default: decided from the tag)
    #[arg(long)]
    pub no_prerelease: bool,

    /// Concurrent upload workers (default: $RELEASE_UPLOAD_WORKERS or 4)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Do not retry draft creation or publishing on network errors
    #[arg(long)]
    pub no_retry: bool,

    /// Write the run result as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        let gather = match &self.command {
            Command::Publish(publish) => {
                if publish.workers == Some(0) {
                    return Err(CliError::InvalidArguments {
                        reason: "--workers must be at least 1".to_string(),
                    });
                }
                &publish.gather
            }
            Command::Preview(gather) => gather,
            Command::Status { .. } => return Ok(()),
        };

        if gather.tag.trim().is_empty() {
            return Err(CliError::InvalidArguments {
                reason: "--tag must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}
