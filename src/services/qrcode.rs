//! QR code batching.
//!
//! All card payloads (`<bytecode>;<summary>`) are split into batches of at
//! most `maxcardsperqrcode` entries, one QR code per batch. A batch whose
//! text does not fit into a QR code fails the whole run instead of being
//! truncated or re-split.

use crate::error::{Error, Result};
use std::io::{self, Write};

/// Payload capacity of a single QR code symbol in bytes (version 40, level L)
pub const QR_CODE_CAPACITY: usize = 2953;

/// A group of payloads rendered into one QR code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based batch number
    pub number: usize,
    /// 1-based position of the first payload in the full sequence
    pub first: usize,
    /// 1-based position of the last payload in the full sequence
    pub last: usize,
    pub payloads: Vec<String>,
}

impl Batch {
    /// Text encoded into the QR code, one payload per line
    pub fn data(&self) -> String {
        self.payloads.join("\n")
    }

    pub fn byte_len(&self) -> usize {
        self.data().len()
    }
}

/// Split `payloads` into batches of at most `max_per_batch`, keeping order.
///
/// Fails if `max_per_batch` is 0 or if any batch exceeds
/// [`QR_CODE_CAPACITY`]; nothing is returned in that case.
pub fn pack(payloads: &[String], max_per_batch: usize) -> Result<Vec<Batch>> {
    if max_per_batch == 0 {
        return Err(Error::ConfigValidation(
            "'maxcardsperqrcode' must be at least 1, found 0".to_string(),
        ));
    }

    let batches: Vec<Batch> = payloads
        .chunks(max_per_batch)
        .enumerate()
        .map(|(idx, chunk)| {
            let start = idx * max_per_batch;
            Batch {
                number: idx + 1,
                first: start + 1,
                last: start + chunk.len(),
                payloads: chunk.to_vec(),
            }
        })
        .collect();

    if let Some(batch) = batches.iter().find(|b| b.byte_len() > QR_CODE_CAPACITY) {
        return Err(Error::QrCapacityExceeded {
            batch: batch.number,
            bytes: batch.byte_len(),
            limit: QR_CODE_CAPACITY,
        });
    }

    tracing::debug!(
        "Packed {} payloads into {} QR code batches",
        payloads.len(),
        batches.len()
    );
    Ok(batches)
}

/// Output side of the batching step
pub trait QrRenderer {
    fn render(&mut self, batch: &Batch) -> Result<()>;
}

/// Writes each batch as a headed text block, for reading the payloads off a
/// terminal or feeding them to an external QR generator
pub struct TextQrRenderer<W: Write> {
    out: W,
}

impl TextQrRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TextQrRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> QrRenderer for TextQrRenderer<W> {
    fn render(&mut self, batch: &Batch) -> Result<()> {
        writeln!(
            self.out,
            "QR code for cards batch {} (cards {} - {})",
            batch.number, batch.first, batch.last
        )
        .and_then(|_| writeln!(self.out, "{}\n", batch.data()))
        .map_err(Error::Output)
    }
}

/// Render every batch in order
pub fn render_batches(batches: &[Batch], renderer: &mut dyn QrRenderer) -> Result<()> {
    for batch in batches {
        tracing::info!(
            "Rendering QR code batch {} (cards {} - {})",
            batch.number,
            batch.first,
            batch.last
        );
        renderer.render(batch)?;
    }
    Ok(())
}
