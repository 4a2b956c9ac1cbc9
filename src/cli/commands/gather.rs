//! Collect artifacts and notes for a tag. No network access.

use crate::artifact::{ArtifactLocator, ArtifactSet, DistDirLocator, StaticLocator};
use crate::cli::args::GatherArgs;
use crate::error::Result;
use crate::notes::{ChangelogNotes, NotesProvider, StaticNotes};
use anyhow::Context;

/// Everything the pipeline needs before its first network call
#[derive(Debug)]
pub(super) struct Gathered {
    pub tag: String,
    pub version: String,
    pub title: String,
    pub notes: String,
    pub artifacts: ArtifactSet,
}

/// Version string for a tag (`v1.2.3` -> `1.2.3`)
pub(super) fn version_of(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

pub(super) fn gather(args: &GatherArgs) -> Result<Gathered> {
    let tag = args.tag.trim().to_string();
    let version = version_of(&tag).to_string();

    let artifacts = if args.assets.is_empty() {
        DistDirLocator::new(&args.dist)
            .list_artifacts()
            .with_context(|| format!("Failed to list artifacts in {}", args.dist.display()))?
    } else {
        StaticLocator::new(args.assets.clone())
            .list_artifacts()
            .context("Failed to read --asset files")?
    };

    let notes = match &args.notes_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read notes file {}", path.display()))?;
            StaticNotes(text).get_notes(&version)
        }
        None => ChangelogNotes::new(&args.changelog).get_notes(&version),
    };

    let title = args
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("Release {}", version));

    Ok(Gathered {
        tag,
        version,
        title,
        notes,
        artifacts,
    })
}
