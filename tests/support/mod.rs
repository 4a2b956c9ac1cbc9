//! In-memory release service that records every call.

#![allow(dead_code)]

use async_trait::async_trait;
use release_publisher::artifact::ArtifactDescriptor;
use release_publisher::config::{PipelineConfig, PrereleasePolicy, RetryConfig};
use release_publisher::github::NewRelease;
use release_publisher::{ReleaseDescriptor, ReleaseService, RemoteAssetId, RemoteId, ServiceError};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { tag: String, draft: bool, prerelease: bool },
    Upload { remote_id: u64, name: String },
    SetDraft { remote_id: u64, draft: bool },
    Get { remote_id: u64 },
}

#[derive(Default)]
pub struct FakeService {
    pub remote_id: u64,
    calls: Mutex<Vec<Call>>,
    create_errors: Mutex<VecDeque<ServiceError>>,
    publish_errors: Mutex<VecDeque<ServiceError>>,
    upload_failures: HashMap<String, ServiceError>,
    upload_delays: HashMap<String, Duration>,
    cancel_on_upload: Option<CancellationToken>,
    next_asset_id: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeService {
    pub fn new(remote_id: u64) -> Self {
        Self {
            remote_id,
            next_asset_id: AtomicU64::new(1000),
            ..Self::default()
        }
    }

    /// Errors returned by successive `create_release` calls before succeeding
    pub fn with_create_errors(self, errors: Vec<ServiceError>) -> Self {
        *self.create_errors.lock().expect("lock") = errors.into();
        self
    }

    /// Errors returned by successive `set_draft_state` calls before succeeding
    pub fn with_publish_errors(self, errors: Vec<ServiceError>) -> Self {
        *self.publish_errors.lock().expect("lock") = errors.into();
        self
    }

    /// Every upload of `name` fails with `error`
    pub fn failing_upload(mut self, name: &str, error: ServiceError) -> Self {
        self.upload_failures.insert(name.to_string(), error);
        self
    }

    /// Uploads of `name` take `delay`
    pub fn slow_upload(mut self, name: &str, delay: Duration) -> Self {
        self.upload_delays.insert(name.to_string(), delay);
        self
    }

    /// Cancel `token` as soon as the first upload starts
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_upload = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn set_draft_calls(&self) -> Vec<(u64, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetDraft { remote_id, draft } => Some((remote_id, draft)),
                _ => None,
            })
            .collect()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl ReleaseService for FakeService {
    async fn create_release(
        &self,
        release: NewRelease<'_>,
    ) -> Result<ReleaseDescriptor, ServiceError> {
        self.record(Call::Create {
            tag: release.tag.to_string(),
            draft: release.draft,
            prerelease: release.prerelease,
        });
        if let Some(error) = self.create_errors.lock().expect("lock").pop_front() {
            return Err(error);
        }
        Ok(ReleaseDescriptor {
            tag_name: release.tag.to_string(),
            title: release.title.to_string(),
            body: release.body.to_string(),
            is_draft: release.draft,
            is_prerelease: release.prerelease,
            remote_id: RemoteId(self.remote_id),
            url: format!("https://example.test/releases/{}", self.remote_id),
            asset_names: Vec::new(),
        })
    }

    async fn upload_asset(
        &self,
        remote_id: RemoteId,
        artifact: &ArtifactDescriptor,
    ) -> Result<RemoteAssetId, ServiceError> {
        self.record(Call::Upload {
            remote_id: remote_id.0,
            name: artifact.display_name.clone(),
        });
        if let Some(token) = &self.cancel_on_upload {
            token.cancel();
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.upload_delays.get(&artifact.display_name) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.upload_failures.get(&artifact.display_name) {
            return Err(error.clone());
        }
        Ok(RemoteAssetId(self.next_asset_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn set_draft_state(&self, remote_id: RemoteId, draft: bool) -> Result<(), ServiceError> {
        self.record(Call::SetDraft {
            remote_id: remote_id.0,
            draft,
        });
        if let Some(error) = self.publish_errors.lock().expect("lock").pop_front() {
            return Err(error);
        }
        Ok(())
    }

    async fn get_release(&self, remote_id: RemoteId) -> Result<ReleaseDescriptor, ServiceError> {
        self.record(Call::Get {
            remote_id: remote_id.0,
        });
        Err(ServiceError::NotFound {
            remote_id: remote_id.to_string(),
        })
    }
}

/// Fast, deterministic pipeline settings
pub fn test_config(workers: usize) -> PipelineConfig {
    PipelineConfig {
        retry: RetryConfig {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            ..RetryConfig::default()
        },
        call_timeout: Duration::from_secs(5),
        upload_workers: workers,
        prerelease: PrereleasePolicy::Never,
    }
}

pub fn artifact(name: &str, size: usize) -> ArtifactDescriptor {
    ArtifactDescriptor::from_bytes(name, vec![0u8; size])
}
