//! Upload stage: every artifact attempted exactly once, failures isolated.
//!
//! With more than one worker, uploads run on a bounded pool. Each task
//! reports `(index, outcome)` and the collector stores it in the slot for
//! that index, so the outcome list always matches input order.

use super::retry::with_timeout;
use super::state::UploadOutcome;
use crate::artifact::ArtifactDescriptor;
use crate::github::{ReleaseService, RemoteId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Upload every artifact to `remote_id` and return one outcome per artifact
pub(crate) async fn upload_all(
    service: &Arc<dyn ReleaseService>,
    remote_id: RemoteId,
    artifacts: &[ArtifactDescriptor],
    workers: usize,
    call_timeout: Duration,
) -> Vec<UploadOutcome> {
    if workers <= 1 || artifacts.len() <= 1 {
        let mut outcomes = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            outcomes.push(upload_one(service.as_ref(), remote_id, artifact.clone(), call_timeout).await);
        }
        return outcomes;
    }

    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    for (index, artifact) in artifacts.iter().cloned().enumerate() {
        let service = Arc::clone(service);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            (index, upload_one(service.as_ref(), remote_id, artifact, call_timeout).await)
        });
    }

    let mut slots: Vec<Option<UploadOutcome>> = vec![None; artifacts.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            // The slot stays empty and is filled as a failure below
            Err(e) => log::error!("upload worker did not complete: {}", e),
        }
    }

    slots
        .into_iter()
        .zip(artifacts)
        .map(|(slot, artifact)| {
            slot.unwrap_or_else(|| {
                UploadOutcome::failure(artifact.clone(), "upload worker did not complete")
            })
        })
        .collect()
}

async fn upload_one(
    service: &dyn ReleaseService,
    remote_id: RemoteId,
    artifact: ArtifactDescriptor,
    call_timeout: Duration,
) -> UploadOutcome {
    log::info!(
        "uploading {} ({} bytes) to release {}",
        artifact.display_name,
        artifact.size_bytes,
        remote_id
    );
    let result = with_timeout(call_timeout, service.upload_asset(remote_id, &artifact)).await;
    match &result {
        Ok(asset_id) => log::info!("uploaded {} as asset {}", artifact.display_name, asset_id),
        Err(e) => log::warn!("upload of {} failed: {}", artifact.display_name, e),
    }
    UploadOutcome::from_result(artifact, result)
}
