//! Release service transport

mod client;
mod service;
mod types;

pub use client::GitHubClient;
pub use service::{
    NewRelease, ReleaseDescriptor, ReleaseService, RemoteAssetId, RemoteId,
};
