//! Table of contents for the printed card set.
//!
//! Rows are collected while cards are compiled and handed to a [`TocWriter`]
//! once all cards are done.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt::Write as _;
use std::fs;
use std::time::Duration;

pub const TOC_FILE_NAME: &str = "tableofcontents.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocTrack {
    /// Name of the copy on the SD card
    pub file_name: String,
    pub duration: Option<Duration>,
}

/// One card in the table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocRow {
    pub number: u32,
    pub summary: String,
    pub bytecode: String,
    pub tracks: Vec<TocTrack>,
}

impl TocRow {
    pub fn total_duration(&self) -> Option<Duration> {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TocWriter {
    /// Write the document into `destination_root`, returning its path
    fn write(&self, rows: &[TocRow], destination_root: &Utf8Path) -> Result<Utf8PathBuf>;
}

/// `m:ss`, or `h:mm:ss` from one hour on
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Markdown rendition: a heading per card, a table of its tracks
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownToc;

impl MarkdownToc {
    pub fn render(&self, rows: &[TocRow]) -> String {
        // Writing into a String cannot fail
        let mut out = String::from("# Table of contents\n");

        for row in rows {
            let _ = writeln!(out, "\n## {}\n", row.summary);
            let _ = write!(out, "Folder `{:02}`, code `{}`", row.number, row.bytecode);
            if let Some(total) = row.total_duration() {
                let _ = write!(out, ", total {}", format_duration(total));
            }
            out.push('\n');

            if row.tracks.is_empty() {
                out.push_str("\n_No tracks_\n");
                continue;
            }

            out.push_str("\n| # | File | Length |\n|---|------|--------|\n");
            for (idx, track) in row.tracks.iter().enumerate() {
                let length = track.duration.map(format_duration).unwrap_or_default();
                let _ = writeln!(out, "| {} | {} | {} |", idx + 1, track.file_name, length);
            }
        }

        out
    }
}

impl TocWriter for MarkdownToc {
    fn write(&self, rows: &[TocRow], destination_root: &Utf8Path) -> Result<Utf8PathBuf> {
        let path = destination_root.join(TOC_FILE_NAME);
        fs::write(&path, self.render(rows)).map_err(|e| Error::io(&path, e))?;
        tracing::info!("Wrote table of contents to {}", path);
        Ok(path)
    }
}
