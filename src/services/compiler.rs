//! Whole-config driver.
//!
//! Walks the cards in ascending number order: mode parameters, SD card
//! folder, byte code, payload. Then packs every payload into QR code
//! batches and writes the table of contents if asked to.

use crate::error::{Issue, Result};
use crate::metrics::Metrics;
use crate::models::Config;
use crate::services::bytecode::encode;
use crate::services::layout::layout;
use crate::services::qrcode::{Batch, pack};
use crate::services::tags::TagReader;
use crate::services::toc::{MarkdownToc, TocRow, TocTrack, TocWriter};
use camino::Utf8PathBuf;

/// Result of compiling one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOutcome {
    pub number: u32,
    pub summary: String,
    pub bytecode: String,
    /// `<bytecode>;<summary>`, the text stored in the QR code
    pub payload: String,
    /// Copies written to the SD card, in track order
    pub files: Vec<Utf8PathBuf>,
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct CompileReport {
    pub cards: Vec<CardOutcome>,
    pub batches: Vec<Batch>,
    /// Recoverable problems, in the order they were raised
    pub issues: Vec<Issue>,
    pub table_of_contents: Option<Utf8PathBuf>,
}

impl CompileReport {
    pub fn payloads(&self) -> Vec<String> {
        self.cards.iter().map(|c| c.payload.clone()).collect()
    }
}

pub struct CardCompiler<'a> {
    destination: Utf8PathBuf,
    tags: &'a dyn TagReader,
    toc: Box<dyn TocWriter + 'a>,
}

impl<'a> CardCompiler<'a> {
    pub fn new(destination: impl Into<Utf8PathBuf>, tags: &'a dyn TagReader) -> Self {
        Self {
            destination: destination.into(),
            tags,
            toc: Box::new(MarkdownToc),
        }
    }

    /// Replace the Markdown table of contents
    pub fn with_toc_writer(mut self, toc: impl TocWriter + 'a) -> Self {
        self.toc = Box::new(toc);
        self
    }

    /// Compile every card of `config` into the destination.
    ///
    /// Fails on the first fatal error; files already copied for earlier cards
    /// stay where they are. Issues are collected into the report.
    pub fn compile(&self, config: &mut Config, metrics: &Metrics) -> Result<CompileReport> {
        let cookie = config.card_cookie.clone();
        let version = config.version;
        let style = config.filename_style;
        let base_dir = config.source_base_dir.clone();
        let with_toc = config.create_table_of_contents;

        let mut report = CompileReport::default();
        let mut toc_rows = Vec::new();

        if let Some(issue) = config.check_card_count() {
            metrics.record_issue(&issue);
            report.issues.push(issue);
        }

        for card in config.cards.values_mut() {
            tracing::info!("Processing {}", card.summary());

            if let Some(issue) = card.apply_mode_parameters()? {
                metrics.record_issue(&issue);
                report.issues.push(issue);
            }

            let outcome = layout(card, &self.destination, &base_dir, style, self.tags)?;
            for issue in &outcome.issues {
                metrics.record_issue(issue);
            }
            report.issues.extend(outcome.issues);
            metrics.record_files_copied(outcome.copied.len(), outcome.bytes_copied);
            metrics.record_stale_removed(outcome.removed_stale);

            // Summary is taken after layout so it can name the first file
            let summary = card.summary();
            let bytecode = encode(
                &cookie,
                version,
                card.number,
                &card.mode,
                card.extra1,
                card.extra2,
            )?;
            tracing::info!("Card {} byte code: {}", card.number, bytecode);

            if with_toc {
                let tracks = outcome
                    .copied
                    .iter()
                    .zip(&card.resolved_files)
                    .map(|(copy, source)| TocTrack {
                        file_name: copy.file_name().unwrap_or(copy.as_str()).to_string(),
                        duration: self.tags.duration(source),
                    })
                    .collect();
                toc_rows.push(TocRow {
                    number: card.number,
                    summary: summary.clone(),
                    bytecode: bytecode.clone(),
                    tracks,
                });
            }

            report.cards.push(CardOutcome {
                number: card.number,
                payload: format!("{bytecode};{summary}"),
                summary,
                bytecode,
                files: outcome.copied,
            });
            metrics.record_card_processed();
        }

        report.batches = pack(&report.payloads(), config.max_cards_per_qrcode)?;

        if with_toc {
            report.table_of_contents = Some(self.toc.write(&toc_rows, &self.destination)?);
        }

        Ok(report)
    }
}
