//! `preview` command: show what `publish` would do, without network access.

use super::gather::gather;
use crate::cli::RuntimeConfig;
use crate::cli::args::GatherArgs;
use crate::config::PrereleasePolicy;
use crate::error::Result;

pub(super) fn execute_preview(args: &GatherArgs, config: &RuntimeConfig) -> Result<i32> {
    let gathered = gather(args)?;

    config.section(&format!("Preview {}", gathered.tag));
    config.indent(&format!("Title: {}", gathered.title));
    config.indent(&format!(
        "Prerelease (auto): {}",
        PrereleasePolicy::Auto.is_prerelease(&gathered.tag)
    ));

    if gathered.artifacts.is_empty() {
        config.warning_println("No artifacts found; publish would fail without contacting the service");
        return Ok(1);
    }

    config.println("");
    config.println(&format!("Artifacts ({}):", gathered.artifacts.len()));
    for artifact in &gathered.artifacts {
        config.indent(&format!(
            "{} ({} bytes, {})",
            artifact.display_name,
            artifact.size_bytes,
            artifact.content_type()
        ));
    }

    config.println("");
    config.println("Release notes:");
    for line in gathered.notes.lines() {
        config.indent(line);
    }

    let _ = config.output().info(&format!("Version {} is ready to publish", gathered.version));
    Ok(0)
}
