//! Wire payloads for the release REST API.

use serde::{Deserialize, Serialize};

/// Body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Serialize)]
pub struct CreateReleaseRequest<'a> {
    pub tag_name: &'a str,
    pub name: &'a str,
    pub body: &'a str,
    pub draft: bool,
    pub prerelease: bool,
}

/// Body of `PATCH /repos/{owner}/{repo}/releases/{id}`
#[derive(Debug, Serialize)]
pub struct PatchReleaseRequest {
    pub draft: bool,
}

/// Release record as returned by create, get and patch
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseResponse {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
    pub html_url: String,
    #[serde(default)]
    pub assets: Vec<AssetResponse>,
}

/// Uploaded asset record
#[derive(Debug, Clone, Deserialize)]
pub struct AssetResponse {
    pub id: u64,
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

/// Error body returned with 4xx responses
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// One validation failure inside an [`ApiErrorBody`]
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
}

impl ApiErrorBody {
    /// Whether the service reported an `already_exists` validation failure
    pub fn already_exists(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.code.as_deref() == Some("already_exists"))
    }
}
