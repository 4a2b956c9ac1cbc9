//! `status` command: inspect an existing release by id.

use crate::cli::RuntimeConfig;
use crate::cli::args::RepoArgs;
use crate::config::{EnvConfig, PipelineConfig, RepoId, ServiceConfig};
use crate::error::Result;
use crate::github::{GitHubClient, ReleaseService, RemoteId};

pub(super) async fn execute_status(
    repo_args: &RepoArgs,
    release_id: u64,
    config: &RuntimeConfig,
    env: &EnvConfig,
) -> Result<i32> {
    let repo = RepoId::resolve(repo_args.repo.as_deref(), env)?;
    let call_timeout = PipelineConfig::from_env(env).call_timeout;
    let client = GitHubClient::new(
        ServiceConfig::new(repo, env.token(repo_args.token.as_deref()))
            .with_request_timeout(call_timeout),
    )?;

    let release = client.get_release(RemoteId(release_id)).await?;

    config.section(&format!("Release {}", release.tag_name));
    config.indent(&format!("Title: {}", release.title));
    config.indent(&format!("Id: {}", release.remote_id));
    config.indent(&format!("URL: {}", release.url));
    config.indent(&format!(
        "State: {}{}",
        if release.is_draft { "draft" } else { "published" },
        if release.is_prerelease { " (prerelease)" } else { "" }
    ));
    config.indent(&format!("Assets ({}):", release.asset_names.len()));
    for name in &release.asset_names {
        config.indent(&format!("  {}", name));
    }

    Ok(0)
}
