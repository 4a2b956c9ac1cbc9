//! Release notes providers.

use std::path::PathBuf;

/// Notes used when nothing better is available
pub fn default_notes(version: &str) -> String {
    format!("Release {}", version)
}

/// Supplies the release description for a version
pub trait NotesProvider {
    /// Notes for `version`; never fails, falls back to [`default_notes`]
    fn get_notes(&self, version: &str) -> String;
}

/// Fixed notes text
#[derive(Debug, Clone)]
pub struct StaticNotes(pub String);

impl NotesProvider for StaticNotes {
    fn get_notes(&self, version: &str) -> String {
        if self.0.trim().is_empty() {
            default_notes(version)
        } else {
            self.0.clone()
        }
    }
}

/// Reads the `## [<version>]` section of a keep-a-changelog style file
#[derive(Debug, Clone)]
pub struct ChangelogNotes {
    path: PathBuf,
}

impl ChangelogNotes {
    /// Provider over the changelog at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NotesProvider for ChangelogNotes {
    fn get_notes(&self, version: &str) -> String {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => extract_section(&text, version).unwrap_or_else(|| default_notes(version)),
            Err(e) => {
                log::debug!("no changelog at {}: {}", self.path.display(), e);
                default_notes(version)
            }
        }
    }
}

/// Body of the section headed `## [<version>]`, up to the next `## [` header
fn extract_section(text: &str, version: &str) -> Option<String> {
    let header = format!("## [{}]", version);
    let mut lines = text.lines().skip_while(|line| !line.starts_with(&header));
    lines.next()?;

    let body: Vec<&str> = lines.take_while(|line| !line.starts_with("## [")).collect();
    let body = body.join("\n");
    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}
