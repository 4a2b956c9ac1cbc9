//! Pipeline states, per-asset outcomes and the run result.

use crate::artifact::ArtifactDescriptor;
use crate::error::{Result, ServiceError};
use crate::github::{ReleaseDescriptor, RemoteAssetId, RemoteId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Stage of a publishing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    /// Validating inputs; no network calls yet
    Gathering,
    /// Draft release exists on the service
    DraftCreated,
    /// Uploading every artifact once
    UploadingAssets,
    /// Publish gate
    Evaluating,
    /// Release is public with every artifact attached
    Published,
    /// At least one upload failed; the draft was left in place
    AbortedAsDraft,
    /// Run stopped before the publish gate could pass
    Failed,
}

impl PipelineState {
    /// No further calls are issued once a terminal state is reached
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PipelineState::Published | PipelineState::AbortedAsDraft | PipelineState::Failed
        )
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Gathering => "gathering",
            PipelineState::DraftCreated => "draft created",
            PipelineState::UploadingAssets => "uploading assets",
            PipelineState::Evaluating => "evaluating",
            PipelineState::Published => "published",
            PipelineState::AbortedAsDraft => "aborted as draft",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a run ended in [`PipelineState::Failed`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The artifact set was empty
    NoArtifacts,
    /// The tag was empty
    InvalidTag,
    /// The tag is already used; pick a new one
    TagConflict(String),
    /// Credentials missing or rejected
    Authentication(String),
    /// Network failure that outlived the retry budget
    Transport(String),
    /// The release disappeared between stages
    NotFound(String),
    /// The service refused the request
    Rejected(String),
    /// The run was cancelled between stages
    Cancelled,
}

impl From<ServiceError> for FailureReason {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Conflict { tag } => FailureReason::TagConflict(tag),
            ServiceError::Authentication { reason } => FailureReason::Authentication(reason),
            ServiceError::Transport { reason } => FailureReason::Transport(reason),
            ServiceError::NotFound { remote_id } => FailureReason::NotFound(remote_id),
            other @ (ServiceError::Quota { .. }
            | ServiceError::Rejected { .. }
            | ServiceError::Unreadable { .. }) => FailureReason::Rejected(other.to_string()),
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NoArtifacts => write!(f, "no artifacts to publish"),
            FailureReason::InvalidTag => write!(f, "release tag must not be empty"),
            FailureReason::TagConflict(tag) => {
                write!(f, "tag '{}' already exists; choose a new tag", tag)
            }
            FailureReason::Authentication(reason) => write!(f, "authentication failed: {}", reason),
            FailureReason::Transport(reason) => write!(f, "transport error: {}", reason),
            FailureReason::NotFound(id) => write!(f, "release {} no longer exists", id),
            FailureReason::Rejected(reason) => write!(f, "request rejected: {}", reason),
            FailureReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of one upload attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    /// Artifact attempted
    pub artifact: ArtifactDescriptor,
    /// Whether the upload succeeded
    pub succeeded: bool,
    /// Present only on success
    pub remote_asset_id: Option<RemoteAssetId>,
    /// Present only on failure
    pub failure_reason: Option<String>,
}

impl UploadOutcome {
    /// Successful upload
    pub fn success(artifact: ArtifactDescriptor, remote_asset_id: RemoteAssetId) -> Self {
        Self {
            artifact,
            succeeded: true,
            remote_asset_id: Some(remote_asset_id),
            failure_reason: None,
        }
    }

    /// Failed upload
    pub fn failure(artifact: ArtifactDescriptor, reason: impl Into<String>) -> Self {
        Self {
            artifact,
            succeeded: false,
            remote_asset_id: None,
            failure_reason: Some(reason.into()),
        }
    }

    pub(crate) fn from_result(
        artifact: ArtifactDescriptor,
        result: std::result::Result<RemoteAssetId, ServiceError>,
    ) -> Self {
        match result {
            Ok(id) => Self::success(artifact, id),
            Err(e) => Self::failure(artifact, e.to_string()),
        }
    }
}

/// Everything a caller needs to decide on remediation
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Terminal state
    pub final_state: PipelineState,
    /// Tag the run was for
    pub tag: String,
    /// Release as created (and, when published, with `is_draft == false`)
    pub release: Option<ReleaseDescriptor>,
    /// One outcome per artifact, in input order
    pub outcomes: Vec<UploadOutcome>,
    /// Set when `final_state` is `Failed`
    pub failure: Option<FailureReason>,
    /// States visited, in order
    pub history: Vec<PipelineState>,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
}

impl PipelineResult {
    /// Identifier of the release, once created; needed to resume a draft
    pub fn remote_id(&self) -> Option<RemoteId> {
        self.release.as_ref().map(|r| r.remote_id)
    }

    /// Link to the release, once created
    pub fn url(&self) -> Option<&str> {
        self.release.as_ref().map(|r| r.url.as_str())
    }

    /// Outcomes that did not succeed
    pub fn failed_outcomes(&self) -> impl Iterator<Item = &UploadOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }

    /// Number of successful uploads
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    /// Process exit code for this result
    pub fn exit_code(&self) -> i32 {
        match self.final_state {
            PipelineState::Published => 0,
            PipelineState::AbortedAsDraft => 2,
            _ => 1,
        }
    }

    /// Result of a run stopped while gathering, before any service call
    pub fn failed_before_start(tag: &str, reason: FailureReason) -> Self {
        RunRecord::new(tag).fail(reason)
    }

    /// Write the result as pretty JSON
    pub fn write_report(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Mutable record of a run in progress
#[derive(Debug)]
pub(crate) struct RunRecord {
    state: PipelineState,
    tag: String,
    release: Option<ReleaseDescriptor>,
    outcomes: Vec<UploadOutcome>,
    history: Vec<PipelineState>,
    started_at: DateTime<Utc>,
}

impl RunRecord {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            state: PipelineState::Gathering,
            tag: tag.to_string(),
            release: None,
            outcomes: Vec::new(),
            history: vec![PipelineState::Gathering],
            started_at: Utc::now(),
        }
    }

    pub(crate) fn state(&self) -> PipelineState {
        self.state
    }

    pub(crate) fn transition(&mut self, next: PipelineState) {
        debug_assert!(!self.state.is_terminal(), "transition out of terminal state");
        log::debug!("{} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    pub(crate) fn set_release(&mut self, release: ReleaseDescriptor) {
        self.release = Some(release);
    }

    pub(crate) fn release_mut(&mut self) -> Option<&mut ReleaseDescriptor> {
        self.release.as_mut()
    }

    pub(crate) fn set_outcomes(&mut self, outcomes: Vec<UploadOutcome>) {
        self.outcomes = outcomes;
    }

    pub(crate) fn outcomes(&self) -> &[UploadOutcome] {
        &self.outcomes
    }

    /// Close the run in `terminal`
    pub(crate) fn finish(mut self, terminal: PipelineState, failure: Option<FailureReason>) -> PipelineResult {
        self.transition(terminal);
        PipelineResult {
            final_state: terminal,
            tag: self.tag,
            release: self.release,
            outcomes: self.outcomes,
            failure,
            history: self.history,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }

    /// Close the run as `Failed`
    pub(crate) fn fail(self, reason: FailureReason) -> PipelineResult {
        log::error!("release {} failed during {}: {}", self.tag, self.state, reason);
        self.finish(PipelineState::Failed, Some(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::Published.is_terminal());
        assert!(PipelineState::AbortedAsDraft.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Evaluating.is_terminal());
    }

    #[test]
    fn test_failure_reason_from_service_error() {
        assert_eq!(
            FailureReason::from(ServiceError::Conflict {
                tag: "v1.0.0".to_string()
            }),
            FailureReason::TagConflict("v1.0.0".to_string())
        );
        assert_eq!(
            FailureReason::from(ServiceError::Quota {
                detail: String::new()
            }),
            FailureReason::Rejected("quota exceeded".to_string())
        );
        assert!(FailureReason::NoArtifacts.to_string().contains("no artifacts"));
    }

    #[test]
    fn test_record_finish_and_report() {
        let mut record = RunRecord::new("v1.0.0");
        record.set_outcomes(vec![
            UploadOutcome::success(
                ArtifactDescriptor::from_bytes("a.zip", vec![0u8; 4]),
                RemoteAssetId(1),
            ),
            UploadOutcome::failure(ArtifactDescriptor::from_bytes("b.zip", Vec::new()), "boom"),
        ]);
        record.transition(PipelineState::Evaluating);
        let result = record.finish(PipelineState::AbortedAsDraft, None);

        assert_eq!(
            result.history,
            [
                PipelineState::Gathering,
                PipelineState::Evaluating,
                PipelineState::AbortedAsDraft
            ]
        );
        assert_eq!(result.succeeded_count(), 1);
        assert_eq!(result.failed_outcomes().count(), 1);
        assert_eq!(result.exit_code(), 2);
        assert_eq!(result.remote_id(), None);

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");
        result.write_report(&path).expect("report");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(json["final_state"], "AbortedAsDraft");
        assert_eq!(json["outcomes"][1]["failure_reason"], "boom");
        assert_eq!(json["outcomes"][0]["artifact"]["display_name"], "a.zip");
    }
}
