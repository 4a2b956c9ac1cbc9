//! `publish` command: run the full pipeline against the service.

use super::gather::gather;
use crate::cli::RuntimeConfig;
use crate::cli::args::PublishArgs;
use crate::config::{EnvConfig, PipelineConfig, PrereleasePolicy, RepoId, RetryConfig, ServiceConfig};
use crate::error::Result;
use crate::github::GitHubClient;
use crate::pipeline::{FailureReason, PipelineResult, PipelineState, ReleasePipeline};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Build the pipeline configuration from flags layered over the environment
pub(super) fn pipeline_config(args: &PublishArgs, env: &EnvConfig) -> PipelineConfig {
    let mut config = PipelineConfig::from_env(env);
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if args.no_retry {
        config.retry = RetryConfig::none();
    }
    config.prerelease = if args.prerelease {
        PrereleasePolicy::Always
    } else if args.no_prerelease {
        PrereleasePolicy::Never
    } else {
        PrereleasePolicy::Auto
    };
    config
}

/// Release client whose transport timeout matches the pipeline's call timeout
pub(super) fn build_client(
    repo: RepoId,
    token: Option<String>,
    pipeline_config: &PipelineConfig,
) -> Result<GitHubClient> {
    let service_config =
        ServiceConfig::new(repo, token).with_request_timeout(pipeline_config.call_timeout);
    let client = GitHubClient::new(service_config)?;
    log::debug!(
        "release client for {} at {} (request timeout {}s)",
        client.config().repo,
        client.config().api_base,
        client.config().request_timeout.as_secs()
    );
    Ok(client)
}

/// Cancel `cancel` on the first interrupt. Resolves to `true` on a second one.
pub(super) async fn watch_interrupts<F, Fut>(cancel: CancellationToken, mut next_signal: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    log::warn!("interrupt received; stopping after the current stage (press Ctrl-C again to exit now)");
    cancel.cancel();

    next_signal().await.is_ok()
}

pub(super) async fn execute_publish(
    args: &PublishArgs,
    config: &RuntimeConfig,
    env: &EnvConfig,
) -> Result<i32> {
    let gathered = gather(&args.gather)?;
    if gathered.artifacts.is_empty() {
        let result = PipelineResult::failed_before_start(&gathered.tag, FailureReason::NoArtifacts);
        return finish(&result, args, config);
    }

    let repo = RepoId::resolve(args.repo.repo.as_deref(), env)?;
    let token = env.token(args.repo.token.as_deref());
    if token.is_none() {
        config.warning_println("No API token found; set GH_TOKEN or GITHUB_TOKEN or pass --token");
    }

    let pipeline_config = pipeline_config(args, env);
    pipeline_config.validate()?;

    config.section(&format!("Publishing {} to {}", gathered.tag, repo));
    let client = build_client(repo, token, &pipeline_config)?;
    let pipeline = ReleasePipeline::new(Arc::new(client), pipeline_config);

    config.indent(&format!("Title: {}", gathered.title));
    config.indent(&format!(
        "Artifacts: {} (upload workers: {}, call timeout: {}s)",
        gathered.artifacts.len(),
        pipeline.config().upload_workers,
        pipeline.config().call_timeout.as_secs()
    ));
    for artifact in &gathered.artifacts {
        config.verbose_println(&format!(
            "{} ({} bytes)",
            artifact.display_name, artifact.size_bytes
        ));
    }

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if watch_interrupts(cancel, tokio::signal::ctrl_c).await {
                log::error!("second interrupt received; exiting");
                std::process::exit(130);
            }
        })
    };

    let result = pipeline
        .run_with_cancel(
            &gathered.tag,
            &gathered.title,
            &gathered.notes,
            gathered.artifacts,
            &cancel,
        )
        .await;
    watcher.abort();

    finish(&result, args, config)
}

/// Print the outcome, write the optional report and pick the exit code
fn finish(result: &PipelineResult, args: &PublishArgs, config: &RuntimeConfig) -> Result<i32> {
    report(result, config);
    if let Some(path) = &args.report {
        result.write_report(path)?;
        config.verbose_println(&format!("Wrote report to {}", path.display()));
    }
    Ok(result.exit_code())
}

/// Print per-asset outcomes and the final state
pub(super) fn report(result: &PipelineResult, config: &RuntimeConfig) {
    if !result.outcomes.is_empty() {
        config.section("Uploads");
        for outcome in &result.outcomes {
            if outcome.succeeded {
                config.indent(&format!(
                    "✓ {} ({} bytes)",
                    outcome.artifact.display_name, outcome.artifact.size_bytes
                ));
            } else {
                config.indent(&format!(
                    "✗ {}: {}",
                    outcome.artifact.display_name,
                    outcome.failure_reason.as_deref().unwrap_or("unknown error")
                ));
            }
        }
    }

    let location = result
        .url()
        .map(|u| format!(" ({u})"))
        .unwrap_or_default();
    match result.final_state {
        PipelineState::Published => {
            config.success_println(&format!(
                "Published {} with {} artifact(s){}",
                result.tag,
                result.succeeded_count(),
                location
            ));
        }
        PipelineState::AbortedAsDraft => {
            let failed = result.failed_outcomes().count();
            config.warning_println(&format!(
                "{} of {} upload(s) failed; release {} left as draft{}",
                failed,
                result.outcomes.len(),
                result.tag,
                location
            ));
            if let Some(id) = result.remote_id() {
                config.indent(&format!(
                    "Draft release id: {} (upload the missing artifacts, then publish it)",
                    id
                ));
            }
        }
        _ => {
            let reason = result
                .failure
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown failure".to_string());
            config.error_println(&format!("Release {} failed: {}", result.tag, reason));
            if let Some(id) = result.remote_id() {
                config.indent(&format!("Draft release id: {}{}", id, location));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{GatherArgs, RepoArgs};
    use std::path::PathBuf;
    use std::time::Duration;

    fn publish_args() -> PublishArgs {
        PublishArgs {
            gather: GatherArgs {
                tag: "v1.0.0".to_string(),
                title: None,
                dist: PathBuf::from("dist"),
                assets: Vec::new(),
                changelog: PathBuf::from("CHANGELOG.md"),
                notes_file: None,
            },
            repo: RepoArgs::default(),
            prerelease: false,
            no_prerelease: false,
            workers: None,
            no_retry: false,
            report: None,
        }
    }

    #[test]
    fn test_pipeline_config_flags_override_env() {
        let env = EnvConfig::from_pairs([("RELEASE_UPLOAD_WORKERS", "8")]);
        let mut args = publish_args();
        assert_eq!(pipeline_config(&args, &env).upload_workers, 8);
        assert_eq!(pipeline_config(&args, &env).prerelease, PrereleasePolicy::Auto);

        args.workers = Some(2);
        args.no_retry = true;
        args.prerelease = true;
        let config = pipeline_config(&args, &env);
        assert_eq!(config.upload_workers, 2);
        assert_eq!(config.retry, RetryConfig::none());
        assert_eq!(config.prerelease, PrereleasePolicy::Always);
    }

    #[test]
    fn test_client_timeout_follows_call_timeout() {
        let env = EnvConfig::from_pairs([("RELEASE_CALL_TIMEOUT_SECS", "1800")]);
        let pipeline_config = pipeline_config(&publish_args(), &env);
        let repo = RepoId::parse("octo/widgets").expect("repo");

        let client = build_client(repo, Some("t".to_string()), &pipeline_config).expect("client");
        assert_eq!(client.config().request_timeout, Duration::from_secs(1800));
        assert_eq!(client.config().request_timeout, pipeline_config.call_timeout);
    }

    #[tokio::test]
    async fn test_first_interrupt_cancels_second_exits() {
        let cancel = CancellationToken::new();
        let second = watch_interrupts(cancel.clone(), || async { Ok(()) }).await;
        assert!(cancel.is_cancelled());
        assert!(second);
    }

    #[tokio::test]
    async fn test_interrupt_listener_failure_is_ignored() {
        let cancel = CancellationToken::new();
        let second = watch_interrupts(cancel.clone(), || async {
            Err(std::io::Error::other("no signal handler"))
        })
        .await;
        assert!(!cancel.is_cancelled());
        assert!(!second);

        let cancel = CancellationToken::new();
        let mut calls = 0;
        let second = watch_interrupts(cancel.clone(), || {
            calls += 1;
            let result = if calls == 1 {
                Ok(())
            } else {
                Err(std::io::Error::other("listener closed"))
            };
            async move { result }
        })
        .await;
        assert!(cancel.is_cancelled());
        assert!(!second);
    }

    #[tokio::test]
    async fn test_empty_artifacts_reported_before_repository_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut args = publish_args();
        args.gather.dist = dir.path().join("dist");
        args.gather.changelog = dir.path().join("CHANGELOG.md");
        args.report = Some(dir.path().join("report.json"));
        let config = RuntimeConfig::new(false, true);

        let code = execute_publish(&args, &config, &EnvConfig::default())
            .await
            .expect("no repository error");
        assert_eq!(code, 1);

        let report = std::fs::read_to_string(dir.path().join("report.json")).expect("report");
        assert!(report.contains("no_artifacts"));
    }
}
