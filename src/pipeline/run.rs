//! Staged publish protocol.
//!
//! `Gathering -> DraftCreated -> UploadingAssets -> Evaluating`, then one of
//! `Published`, `AbortedAsDraft` or `Failed`. The release is only made public
//! when every artifact uploaded successfully.

use super::retry::retry_with_backoff;
use super::state::{FailureReason, PipelineResult, PipelineState, RunRecord};
use super::upload::upload_all;
use crate::artifact::ArtifactSet;
use crate::config::PipelineConfig;
use crate::github::{NewRelease, ReleaseService};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Drives a [`ReleaseService`] through one publishing run
pub struct ReleasePipeline {
    service: Arc<dyn ReleaseService>,
    config: PipelineConfig,
}

impl ReleasePipeline {
    /// Pipeline over `service`
    pub fn new(service: Arc<dyn ReleaseService>, config: PipelineConfig) -> Self {
        Self { service, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Publish `artifacts` under `tag`. Never fails; the outcome is in the result.
    pub async fn run(
        &self,
        tag: &str,
        title: &str,
        notes: &str,
        artifacts: ArtifactSet,
    ) -> PipelineResult {
        self.run_with_cancel(tag, title, notes, artifacts, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), observing `cancel` between stages.
    ///
    /// An upload batch that has started always runs to completion and its
    /// outcomes are recorded; a cancelled run never publishes.
    pub async fn run_with_cancel(
        &self,
        tag: &str,
        title: &str,
        notes: &str,
        artifacts: ArtifactSet,
        cancel: &CancellationToken,
    ) -> PipelineResult {
        let mut run = RunRecord::new(tag);

        // Gathering: nothing here touches the network
        if tag.trim().is_empty() {
            return run.fail(FailureReason::InvalidTag);
        }
        if artifacts.is_empty() {
            return run.fail(FailureReason::NoArtifacts);
        }
        if cancel.is_cancelled() {
            return run.fail(FailureReason::Cancelled);
        }

        let title = if title.trim().is_empty() { tag } else { title };
        let prerelease = self.config.prerelease.is_prerelease(tag);
        log::info!(
            "creating draft release {} ({} artifact(s), prerelease={})",
            tag,
            artifacts.len(),
            prerelease
        );

        let created = retry_with_backoff(
            || {
                self.service.create_release(NewRelease {
                    tag,
                    title,
                    body: notes,
                    draft: true,
                    prerelease,
                })
            },
            self.config.retry.create_release,
            "Create draft release",
            &self.config.retry,
            self.config.call_timeout,
        )
        .await;

        let release = match created {
            Ok(release) => release,
            Err(e) => return run.fail(e.into()),
        };
        let remote_id = release.remote_id;
        log::info!("draft release {} created: {}", remote_id, release.url);
        run.set_release(release);
        run.transition(PipelineState::DraftCreated);

        if cancel.is_cancelled() {
            return run.fail(FailureReason::Cancelled);
        }

        run.transition(PipelineState::UploadingAssets);
        let outcomes = upload_all(
            &self.service,
            remote_id,
            &artifacts,
            self.config.upload_workers,
            self.config.call_timeout,
        )
        .await;
        debug_assert_eq!(outcomes.len(), artifacts.len());
        run.set_outcomes(outcomes);

        run.transition(PipelineState::Evaluating);
        if cancel.is_cancelled() {
            return run.fail(FailureReason::Cancelled);
        }

        let failed: Vec<&str> = run
            .outcomes()
            .iter()
            .filter(|o| !o.succeeded)
            .map(|o| o.artifact.display_name.as_str())
            .collect();
        if !failed.is_empty() {
            log::warn!(
                "{} of {} upload(s) failed ({}); leaving release {} as draft",
                failed.len(),
                artifacts.len(),
                failed.join(", "),
                remote_id
            );
            return run.finish(PipelineState::AbortedAsDraft, None);
        }

        let published = retry_with_backoff(
            || self.service.set_draft_state(remote_id, false),
            self.config.retry.publish_release,
            "Publish release",
            &self.config.retry,
            self.config.call_timeout,
        )
        .await;

        match published {
            Ok(()) => {
                if let Some(release) = run.release_mut() {
                    release.is_draft = false;
                }
                log::info!("published release {} ({})", tag, remote_id);
                debug_assert_eq!(run.state(), PipelineState::Evaluating);
                run.finish(PipelineState::Published, None)
            }
            Err(e) => run.fail(e.into()),
        }
    }
}
