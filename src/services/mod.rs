//! Services module - the card compilation pipeline.
//!
//! Each step is a plain function or small type that takes its inputs
//! explicitly and touches the file system only where it says so.
//!
//! # Components
//!
//! - [`sources`]: expand a card's `source` entries into a sorted file list
//! - [`layout`]: create and clear the card folder, copy files under generated names
//! - [`bytecode`]: the hex byte code written to an RFID card
//! - [`qrcode`]: pack payloads into size-bounded QR code batches
//! - [`tags`]: artist/title and duration lookup behind the [`TagReader`] seam
//! - [`toc`]: table of contents for the printed card set
//! - [`CardCompiler`]: drives all of the above for a whole [`Config`](crate::models::Config)
//!
//! # Usage Example
//!
//! ```ignore
//! use tonuino_cards::metrics::Metrics;
//! use tonuino_cards::services::{CardCompiler, LoftyTagReader};
//!
//! let tags = LoftyTagReader::new();
//! let report = CardCompiler::new("/media/sdcard", &tags).compile(&mut config, &Metrics::new())?;
//! for batch in &report.batches {
//!     println!("{}", batch.data());
//! }
//! ```

pub mod bytecode;
pub mod compiler;
pub mod layout;
pub mod qrcode;
pub mod sources;
pub mod tags;
pub mod toc;

pub use bytecode::{decimal_to_hex, encode, encode_card, hex_to_int};
pub use compiler::{CardCompiler, CardOutcome, CompileReport};
pub use layout::{LayoutOutcome, MAX_FILES_PER_FOLDER, proper_dirname, sanitize_filename};
pub use qrcode::{Batch, QR_CODE_CAPACITY, QrRenderer, TextQrRenderer, pack, render_batches};
pub use sources::resolve_sources;
pub use tags::{LoftyTagReader, NoTags, TagReader};
pub use toc::{MarkdownToc, TocRow, TocTrack, TocWriter};
