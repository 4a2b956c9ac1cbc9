//! The release service contract the pipeline drives.

use crate::artifact::ArtifactDescriptor;
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier the service assigns to a release on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(pub u64);

impl std::fmt::Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier the service assigns to an uploaded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteAssetId(pub u64);

impl std::fmt::Display for RemoteAssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A release-in-progress as known to the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDescriptor {
    /// Version tag, immutable once created
    pub tag_name: String,
    /// Display name
    pub title: String,
    /// Release notes
    pub body: String,
    /// `true` until the publish gate succeeds
    pub is_draft: bool,
    /// Fixed at creation
    pub is_prerelease: bool,
    /// Service-assigned identifier
    pub remote_id: RemoteId,
    /// Canonical link to the release
    pub url: String,
    /// Names of assets attached so far (filled by `get_release`)
    pub asset_names: Vec<String>,
}

/// Parameters for [`ReleaseService::create_release`]
#[derive(Debug, Clone)]
pub struct NewRelease<'a> {
    /// Version tag, must be non-empty
    pub tag: &'a str,
    /// Display name
    pub title: &'a str,
    /// Release notes
    pub body: &'a str,
    /// Create as draft
    pub draft: bool,
    /// Mark as prerelease
    pub prerelease: bool,
}

/// Narrow transport over the remote release service.
///
/// Implementations carry no retry or business logic; that belongs to
/// [`ReleasePipeline`](crate::pipeline::ReleasePipeline).
#[async_trait]
pub trait ReleaseService: Send + Sync {
    /// Allocate a new release record
    async fn create_release(
        &self,
        release: NewRelease<'_>,
    ) -> Result<ReleaseDescriptor, ServiceError>;

    /// Transmit one artifact's full content in a single request
    async fn upload_asset(
        &self,
        remote_id: RemoteId,
        artifact: &ArtifactDescriptor,
    ) -> Result<RemoteAssetId, ServiceError>;

    /// Set the draft flag; idempotent
    async fn set_draft_state(&self, remote_id: RemoteId, draft: bool) -> Result<(), ServiceError>;

    /// Fetch the current state of a release
    async fn get_release(&self, remote_id: RemoteId) -> Result<ReleaseDescriptor, ServiceError>;
}
