//! Source resolution: turn a card's `source` entries into a flat file list.
//!
//! A source is joined onto the configured base directory (absolute sources
//! stand on their own) and then:
//! - a directory contributes every audio file below it, recursively, sorted
//!   by full path
//! - a file is taken as-is, whatever its extension
//! - anything else is skipped with a warning
//!
//! Results are concatenated in declaration order, so the same file system
//! state always yields the same list.

use crate::error::{Issue, ordinal};
use crate::models::Card;
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Extensions picked up when expanding a directory source
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "opus", "ogg"];

/// Case-insensitive check against [`AUDIO_EXTENSIONS`]
pub fn is_audio_file(path: &Utf8Path) -> bool {
    path.extension().is_some_and(|ext| {
        AUDIO_EXTENSIONS
            .iter()
            .any(|audio| ext.eq_ignore_ascii_case(audio))
    })
}

fn raise(issues: &mut Vec<Issue>, issue: Issue) {
    issue.log();
    issues.push(issue);
}

/// Resolve `card.sources` against `base_dir` and append the results to
/// `card.resolved_files`.
///
/// Never fails: missing or empty sources become [`Issue`]s and the card goes
/// on with whatever was found.
pub fn resolve_sources(card: &mut Card, base_dir: &Utf8Path) -> Vec<Issue> {
    let mut issues = Vec::new();

    if card.sources.is_empty() {
        raise(&mut issues, Issue::EmptySourceDefinition);
        return issues;
    }

    for (idx, source_str) in card.sources.iter().enumerate() {
        if source_str.is_empty() {
            raise(
                &mut issues,
                Issue::EmptySourceEntry {
                    ordinal: ordinal(idx + 1),
                },
            );
            continue;
        }

        let source = base_dir.join(source_str);
        tracing::debug!("Parsing source {}", source);

        if source.is_dir() {
            tracing::debug!("{} has been detected as a directory", source);
            let files = audio_files_below(&source, &mut issues);
            card.resolved_files.extend(files);
        } else if source.is_file() {
            tracing::debug!("{} has been detected as a file", source);
            card.resolved_files.push(source);
        } else {
            raise(
                &mut issues,
                Issue::SourceNotFound {
                    path: source,
                    ordinal: ordinal(idx + 1),
                },
            );
        }
    }

    issues
}

/// Every audio file below `directory`, sorted by full path
pub fn audio_files_below(directory: &Utf8Path, issues: &mut Vec<Issue>) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(directory).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| directory.to_string());
                raise(
                    issues,
                    Issue::UnreadableEntry {
                        path,
                        reason: e.to_string(),
                    },
                );
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) if is_audio_file(&path) => files.push(path),
            Ok(path) => tracing::debug!("Skipping {}, not an audio file", path),
            Err(path) => raise(
                issues,
                Issue::UnreadableEntry {
                    path: path.display().to_string(),
                    reason: "path is not valid UTF-8".to_string(),
                },
            ),
        }
    }

    files.sort();
    files
}
