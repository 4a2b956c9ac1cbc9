//! Artifact descriptors and discovery.
//!
//! An [`ArtifactSet`] is an ordered list of binaries to attach to a release.
//! The order is significant: upload outcomes are reported in the same order.

use bytes::Bytes;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Installer patterns picked up from the dist directory, in listing order
pub const INSTALLER_PATTERNS: &[&str] = &["*.exe", "*.dmg", "*.deb", "*.tar.gz", "*.zip"];

/// Where an artifact's bytes come from
#[derive(Debug, Clone)]
pub enum ArtifactContent {
    /// File on disk, opened afresh for every upload attempt
    File(PathBuf),
    /// Content already in memory
    Memory(Bytes),
}

/// One binary to attach to a release
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactDescriptor {
    /// Filename the service will expose
    pub display_name: String,
    /// Handle to the bytes
    #[serde(skip_serializing)]
    pub content: ArtifactContent,
    /// Size known up front
    pub size_bytes: u64,
}

impl PartialEq for ArtifactDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.display_name == other.display_name
            && self.size_bytes == other.size_bytes
            && match (&self.content, &other.content) {
                (ArtifactContent::File(a), ArtifactContent::File(b)) => a == b,
                (ArtifactContent::Memory(a), ArtifactContent::Memory(b)) => a == b,
                _ => false,
            }
    }
}

impl ArtifactDescriptor {
    /// Describe a file on disk; the display name is its file name
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid artifact filename: {:?}", path),
                )
            })?
            .to_string();

        Ok(Self {
            display_name,
            size_bytes: metadata.len(),
            content: ArtifactContent::File(path),
        })
    }

    /// Describe in-memory content
    pub fn from_bytes(display_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            display_name: display_name.into(),
            size_bytes: content.len() as u64,
            content: ArtifactContent::Memory(content),
        }
    }

    /// Read the full content for one upload attempt
    pub async fn read(&self) -> std::io::Result<Bytes> {
        match &self.content {
            ArtifactContent::File(path) => tokio::fs::read(path).await.map(Bytes::from),
            ArtifactContent::Memory(bytes) => Ok(bytes.clone()),
        }
    }

    /// Local path, if the content lives on disk
    pub fn path(&self) -> Option<&Path> {
        match &self.content {
            ArtifactContent::File(path) => Some(path),
            ArtifactContent::Memory(_) => None,
        }
    }

    /// MIME type derived from the file extension
    pub fn content_type(&self) -> &'static str {
        let name = self.display_name.as_str();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") || name.ends_with(".gz") {
            return "application/gzip";
        }
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some("deb") => "application/vnd.debian.binary-package",
            Some("rpm") => "application/x-rpm",
            Some("exe") | Some("msi") => "application/x-msdownload",
            Some("dmg") => "application/x-apple-diskimage",
            Some("zip") => "application/zip",
            _ => "application/octet-stream",
        }
    }
}

/// Ordered artifacts for one run
pub type ArtifactSet = Vec<ArtifactDescriptor>;

/// Supplies the artifacts to publish
pub trait ArtifactLocator {
    /// List artifacts in upload order; may be empty
    fn list_artifacts(&self) -> std::io::Result<ArtifactSet>;
}

/// Finds installers in a build output directory
#[derive(Debug, Clone)]
pub struct DistDirLocator {
    dir: PathBuf,
}

impl DistDirLocator {
    /// Locator over `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactLocator for DistDirLocator {
    fn list_artifacts(&self) -> std::io::Result<ArtifactSet> {
        if !self.dir.is_dir() {
            log::debug!("artifact directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }

        // The directory is literal; only the installer pattern is a glob
        let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let mut artifacts = Vec::new();
        for pattern in INSTALLER_PATTERNS {
            let full = Path::new(&dir).join(pattern);
            let full = full.to_string_lossy();
            let entries = glob::glob(&full).map_err(|e| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
            })?;

            let mut matched: Vec<PathBuf> = entries
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        log::warn!("skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|path| path.is_file())
                .collect();
            matched.sort();

            for path in matched {
                artifacts.push(ArtifactDescriptor::from_path(path)?);
            }
        }

        log::debug!(
            "found {} artifact(s) in {}",
            artifacts.len(),
            self.dir.display()
        );
        Ok(artifacts)
    }
}

/// An explicit list of files, kept in the given order
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    paths: Vec<PathBuf>,
}

impl StaticLocator {
    /// Locator over explicit paths
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl ArtifactLocator for StaticLocator {
    fn list_artifacts(&self) -> std::io::Result<ArtifactSet> {
        self.paths
            .iter()
            .map(ArtifactDescriptor::from_path)
            .collect()
    }
}
