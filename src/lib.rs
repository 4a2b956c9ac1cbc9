//! # Release Publisher
//!
//! Staged release publishing against a GitHub-style release service.
//!
//! A run creates the release as a draft, uploads every artifact exactly once,
//! and only then decides whether the draft may become public. A release is
//! never published while any of its artifacts failed to upload.
//!
//! ## Features
//!
//! - **Publish Gate**: Draft first, public only when every upload succeeded
//! - **Failure Isolation**: One failed upload never stops the others
//! - **Bounded Parallelism**: Uploads on a fixed-size worker pool, outcomes kept in input order
//! - **Bounded Retry**: Backoff for draft creation and publishing on network errors only
//! - **Structured Results**: Every run ends in a [`PipelineResult`], never an error
//!
//! ## Usage
//!
//! ```bash
//! release_publisher publish --tag v1.0.0 --repo owner/repo
//! release_publisher preview --tag v1.0.0
//! release_publisher status --repo owner/repo --release-id 42
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod notes;
pub mod pipeline;

// Re-export main types for public API
pub use artifact::{ArtifactDescriptor, ArtifactLocator, ArtifactSet};
pub use cli::Args;
pub use config::{EnvConfig, PipelineConfig, RetryConfig, ServiceConfig};
pub use error::{ReleaseError, Result, ServiceError};
pub use github::{GitHubClient, ReleaseDescriptor, ReleaseService, RemoteAssetId, RemoteId};
pub use notes::NotesProvider;
pub use pipeline::{FailureReason, PipelineResult, PipelineState, ReleasePipeline, UploadOutcome};
