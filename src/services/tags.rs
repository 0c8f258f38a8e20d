//! Audio tag access.
//!
//! [`TagReader`] is the seam between file naming and the tag library, so the
//! layout code can be tested without real audio files. Every failure to read
//! tags is reported as "no metadata" (`None`), never as an error.

use camino::Utf8Path;
use lofty::file::TaggedFile;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
pub trait TagReader {
    /// Artist and title, only if both are present and non-empty
    fn artist_title(&self, path: &Utf8Path) -> Option<(String, String)>;

    /// Playing time, if the file can be read
    fn duration(&self, path: &Utf8Path) -> Option<Duration>;
}

/// [`TagReader`] backed by lofty (ID3v1/v2, Vorbis comments, APE, ...)
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagReader;

impl LoftyTagReader {
    pub fn new() -> Self {
        Self
    }

    fn open_tagged(path: &Utf8Path) -> Option<TaggedFile> {
        match Probe::open(path).and_then(|file| file.read()) {
            Ok(tagged_file) => Some(tagged_file),
            Err(e) => {
                tracing::debug!("Could not read tags of {}: {}", path, e);
                None
            }
        }
    }
}

impl TagReader for LoftyTagReader {
    fn artist_title(&self, path: &Utf8Path) -> Option<(String, String)> {
        let tagged_file = Self::open_tagged(path)?;
        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())?;

        let artist = tag.artist().filter(|a| !a.is_empty())?.to_string();
        let title = tag.title().filter(|t| !t.is_empty())?.to_string();
        Some((artist, title))
    }

    fn duration(&self, path: &Utf8Path) -> Option<Duration> {
        let tagged_file = Self::open_tagged(path)?;
        let duration = tagged_file.properties().duration();
        (!duration.is_zero()).then_some(duration)
    }
}

/// [`TagReader`] that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTags;

impl TagReader for NoTags {
    fn artist_title(&self, _path: &Utf8Path) -> Option<(String, String)> {
        None
    }

    fn duration(&self, _path: &Utf8Path) -> Option<Duration> {
        None
    }
}
