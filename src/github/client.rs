//! HTTP implementation of [`ReleaseService`] against the GitHub REST API.

use super::service::{NewRelease, ReleaseDescriptor, ReleaseService, RemoteAssetId, RemoteId};
use super::types::{
    ApiErrorBody, AssetResponse, CreateReleaseRequest, PatchReleaseRequest, ReleaseResponse,
};
use crate::artifact::{ArtifactContent, ArtifactDescriptor};
use crate::config::ServiceConfig;
use crate::error::{ConfigError, ServiceError};
use async_trait::async_trait;
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode, header};
use tokio_util::io::ReaderStream;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Which call a response belongs to; drives status classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Upload,
    Patch,
    Get,
}

/// Release service client holding the credentials for one run
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    config: ServiceConfig,
}

impl GitHubClient {
    /// Build a client; a missing token is reported on the first call, not here
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    /// Configuration in use
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.config.api_base.trim_end_matches('/'),
            self.config.repo.owner,
            self.config.repo.repo
        )
    }

    fn release_url(&self, remote_id: RemoteId) -> String {
        format!("{}/{}", self.releases_url(), remote_id)
    }

    fn assets_url(&self, remote_id: RemoteId) -> String {
        format!(
            "{}/repos/{}/{}/releases/{}/assets",
            self.config.uploads_base.trim_end_matches('/'),
            self.config.repo.owner,
            self.config.repo.repo,
            remote_id
        )
    }

    /// Attach credentials and API headers
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ServiceError> {
        let token = self
            .config
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Authentication {
                reason: "no API token configured (set GH_TOKEN or GITHUB_TOKEN)".to_string(),
            })?;

        Ok(request
            .bearer_auth(token)
            .header(header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION))
    }

    /// Send and map non-success statuses onto the error taxonomy
    async fn send(
        &self,
        request: RequestBuilder,
        operation: Operation,
        subject: &str,
    ) -> Result<Response, ServiceError> {
        let response = self.authorized(request)?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
        log::debug!("{:?} {} -> {}: {}", operation, subject, status, text);
        Err(classify(operation, status, &body, subject))
    }
}

/// Map an unsuccessful status onto the error taxonomy
fn classify(operation: Operation, status: StatusCode, body: &ApiErrorBody, subject: &str) -> ServiceError {
    let message = if body.message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    } else {
        body.message.clone()
    };
    let rate_limited = message.to_ascii_lowercase().contains("rate limit");

    match status {
        StatusCode::UNAUTHORIZED => ServiceError::Authentication { reason: message },
        StatusCode::FORBIDDEN if rate_limited => ServiceError::Quota { detail: message },
        StatusCode::FORBIDDEN => ServiceError::Authentication { reason: message },
        StatusCode::TOO_MANY_REQUESTS | StatusCode::PAYLOAD_TOO_LARGE => {
            ServiceError::Quota { detail: message }
        }
        StatusCode::NOT_FOUND if operation == Operation::Create => ServiceError::Authentication {
            reason: format!("repository not found or token lacks access: {message}"),
        },
        StatusCode::NOT_FOUND => ServiceError::NotFound {
            remote_id: subject.to_string(),
        },
        StatusCode::CONFLICT if operation == Operation::Create => ServiceError::Conflict {
            tag: subject.to_string(),
        },
        StatusCode::UNPROCESSABLE_ENTITY if operation == Operation::Create && body.already_exists() => {
            ServiceError::Conflict {
                tag: subject.to_string(),
            }
        }
        StatusCode::REQUEST_TIMEOUT => ServiceError::transport(message),
        s if s.is_server_error() => ServiceError::transport(format!("{}: {}", s, message)),
        s => ServiceError::Rejected {
            status: s.as_u16(),
            message,
        },
    }
}

fn descriptor_from(response: ReleaseResponse) -> ReleaseDescriptor {
    ReleaseDescriptor {
        title: response.name.unwrap_or_else(|| response.tag_name.clone()),
        tag_name: response.tag_name,
        body: response.body.unwrap_or_default(),
        is_draft: response.draft,
        is_prerelease: response.prerelease,
        remote_id: RemoteId(response.id),
        url: response.html_url,
        asset_names: response.assets.into_iter().map(|a| a.name).collect(),
    }
}

#[async_trait]
impl ReleaseService for GitHubClient {
    async fn create_release(
        &self,
        release: NewRelease<'_>,
    ) -> Result<ReleaseDescriptor, ServiceError> {
        let payload = CreateReleaseRequest {
            tag_name: release.tag,
            name: release.title,
            body: release.body,
            draft: release.draft,
            prerelease: release.prerelease,
        };

        let response = self
            .send(
                self.http.post(self.releases_url()).json(&payload),
                Operation::Create,
                release.tag,
            )
            .await?;
        let created: ReleaseResponse = response.json().await?;
        log::info!("created release {} ({})", created.id, created.html_url);
        Ok(descriptor_from(created))
    }

    async fn upload_asset(
        &self,
        remote_id: RemoteId,
        artifact: &ArtifactDescriptor,
    ) -> Result<RemoteAssetId, ServiceError> {
        let unreadable = |e: std::io::Error| ServiceError::Unreadable {
            name: artifact.display_name.clone(),
            reason: e.to_string(),
        };

        // Files are streamed; the length header comes from the descriptor
        let (content, length) = match &artifact.content {
            ArtifactContent::File(path) => {
                let file = tokio::fs::File::open(path).await.map_err(unreadable)?;
                let length = file.metadata().await.map_err(unreadable)?.len();
                (Body::wrap_stream(ReaderStream::new(file)), length)
            }
            ArtifactContent::Memory(_) => {
                let bytes = artifact.read().await.map_err(unreadable)?;
                let length = bytes.len() as u64;
                (Body::from(bytes), length)
            }
        };
        if length != artifact.size_bytes {
            log::warn!(
                "{} changed size since discovery ({} -> {} bytes)",
                artifact.display_name,
                artifact.size_bytes,
                length
            );
        }

        let request = self
            .http
            .post(self.assets_url(remote_id))
            .query(&[("name", artifact.display_name.as_str())])
            .header(header::CONTENT_TYPE, artifact.content_type())
            .header(header::CONTENT_LENGTH, length)
            .body(content);

        let response = self
            .send(request, Operation::Upload, &remote_id.to_string())
            .await?;
        let asset: AssetResponse = response.json().await?;
        log::debug!(
            "uploaded {} as asset {} ({} bytes, {})",
            asset.name,
            asset.id,
            asset.size,
            asset.browser_download_url.as_deref().unwrap_or("no download url")
        );
        Ok(RemoteAssetId(asset.id))
    }

    async fn set_draft_state(&self, remote_id: RemoteId, draft: bool) -> Result<(), ServiceError> {
        let response = self
            .send(
                self.http
                    .patch(self.release_url(remote_id))
                    .json(&PatchReleaseRequest { draft }),
                Operation::Patch,
                &remote_id.to_string(),
            )
            .await?;
        let updated: ReleaseResponse = response.json().await?;
        if updated.draft != draft {
            return Err(ServiceError::transport(format!(
                "release {} still reports draft={} after update",
                remote_id, updated.draft
            )));
        }
        Ok(())
    }

    async fn get_release(&self, remote_id: RemoteId) -> Result<ReleaseDescriptor, ServiceError> {
        let response = self
            .send(
                self.http.get(self.release_url(remote_id)),
                Operation::Get,
                &remote_id.to_string(),
            )
            .await?;
        let release: ReleaseResponse = response.json().await?;
        Ok(descriptor_from(release))
    }
}
