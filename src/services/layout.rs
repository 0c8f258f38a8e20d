//! SD card layout: one numbered folder per card, one renamed copy per track.
//!
//! ```text
//! <destination>/01/001-Artist-Title.mp3   (mp3tags)
//! <destination>/01/001.mp3                (tracknumber)
//! ```

use crate::error::{Error, Issue, Result};
use crate::models::{Card, FilenameStyle};
use crate::services::sources::resolve_sources;
use crate::services::tags::TagReader;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs::{self, FileTimes, OpenOptions};
use std::sync::LazyLock;

/// Tracks per folder a Tonuino player can address
pub const MAX_FILES_PER_FOLDER: usize = 255;

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-zÄÖÜäöü0-9_-]+").expect("Invalid filename regex"));

/// Make a name safe for the player's FAT file system.
///
/// Each space becomes one underscore (runs are not collapsed), then every
/// character other than ASCII letters, `ÄÖÜäöü`, digits, `-` and `_` is
/// dropped. The result may be empty.
pub fn sanitize_filename(filename: &str) -> String {
    DISALLOWED_CHARS
        .replace_all(&filename.replace(' ', "_"), "")
        .into_owned()
}

/// Folder name for a card: two digits at least, never truncated
pub fn proper_dirname(number: u32) -> String {
    format!("{number:02}")
}

/// Name of the `index`-th (0-based) copy of `source` in its card folder
pub fn destination_name(
    index: usize,
    source: &Utf8Path,
    style: FilenameStyle,
    tags: &dyn TagReader,
) -> String {
    let track = index + 1;
    match style {
        FilenameStyle::TrackNumberOnly => format!("{track:03}.mp3"),
        FilenameStyle::TagBased => {
            let name = match tags.artist_title(source) {
                Some((artist, title)) => sanitize_filename(&format!("{artist}-{title}")),
                None => {
                    tracing::debug!(
                        "File {} does not contain any tags. Using its file name",
                        source.file_name().unwrap_or(source.as_str())
                    );
                    sanitize_filename(source.file_stem().unwrap_or_default())
                }
            };
            format!("{track:03}-{name}.mp3")
        }
    }
}

/// Delete every regular file directly inside `directory`.
///
/// Sub-directories and their contents stay. Returns the number of removed
/// files.
pub fn clear_directory(directory: &Utf8Path) -> Result<usize> {
    let entries = fs::read_dir(directory).map_err(|e| Error::io(directory, e))?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(directory, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(directory, e))?;
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        tracing::debug!("Delete {} from destination", path.display());
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::io(
                    Utf8PathBuf::from(path.to_string_lossy().into_owned()),
                    e,
                ));
            }
        }
    }

    Ok(removed)
}

/// Copy `source` to `destination`, carrying over access and modification
/// times where the target file system supports it. Returns bytes copied.
pub fn copy_preserving_times(source: &Utf8Path, destination: &Utf8Path) -> Result<u64> {
    let bytes = fs::copy(source, destination).map_err(|e| Error::io(destination, e))?;

    if let Err(e) = preserve_times(source, destination) {
        tracing::debug!("Could not preserve timestamps on {}: {}", destination, e);
    }

    Ok(bytes)
}

fn preserve_times(source: &Utf8Path, destination: &Utf8Path) -> std::io::Result<()> {
    let metadata = fs::metadata(source)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    OpenOptions::new()
        .write(true)
        .open(destination)?
        .set_times(times)
}

/// Copy a single file into a card folder under its generated name
pub fn copy_to_sdcard(
    index: usize,
    source: &Utf8Path,
    destination_dir: &Utf8Path,
    style: FilenameStyle,
    tags: &dyn TagReader,
) -> Result<(Utf8PathBuf, u64)> {
    tracing::debug!("Processing {}", source);
    let destination = destination_dir.join(destination_name(index, source, style, tags));

    tracing::debug!("Copying {} to {}", source, destination);
    let bytes = copy_preserving_times(source, &destination)?;
    Ok((destination, bytes))
}

/// What [`layout`] did for one card
#[derive(Debug, Clone, Default)]
pub struct LayoutOutcome {
    pub folder: Utf8PathBuf,
    /// Destination paths, parallel to `Card::resolved_files`
    pub copied: Vec<Utf8PathBuf>,
    pub bytes_copied: u64,
    pub removed_stale: usize,
    pub issues: Vec<Issue>,
}

/// Write a card's folder.
///
/// The folder is created if missing and emptied of stale files otherwise,
/// sources are resolved fresh, and every resolved file is copied under its
/// generated name. More than [`MAX_FILES_PER_FOLDER`] files is only a
/// warning. Copy failures abort.
pub fn layout(
    card: &mut Card,
    destination_root: &Utf8Path,
    source_base_dir: &Utf8Path,
    style: FilenameStyle,
    tags: &dyn TagReader,
) -> Result<LayoutOutcome> {
    let folder = destination_root.join(proper_dirname(card.number));

    fs::create_dir_all(&folder).map_err(|e| Error::io(&folder, e))?;
    let removed_stale = clear_directory(&folder)?;

    card.resolved_files.clear();
    let mut issues = resolve_sources(card, source_base_dir);

    if card.resolved_files.len() > MAX_FILES_PER_FOLDER {
        let issue = Issue::TooManyFiles {
            count: card.resolved_files.len(),
        };
        issue.log();
        issues.push(issue);
    }

    let mut copied = Vec::with_capacity(card.resolved_files.len());
    let mut bytes_copied = 0;
    for (idx, source) in card.resolved_files.iter().enumerate() {
        let (destination, bytes) = copy_to_sdcard(idx, source, &folder, style, tags)?;
        copied.push(destination);
        bytes_copied += bytes;
    }

    Ok(LayoutOutcome {
        folder,
        copied,
        bytes_copied,
        removed_stale,
        issues,
    })
}
