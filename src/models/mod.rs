//! Data models for the card configuration.
//!
//! - [`Config`]: global settings plus the ordered card map, built from the
//!   top level of the YAML file
//! - [`Card`]: one RFID card, its sources and play mode
//! - [`PlayMode`]: the nine Tonuino play modes and their byte codes
//! - [`FilenameStyle`]: how copied files are named on the SD card
//!
//! # Lifecycle
//!
//! Both records are deserialized once from the YAML tree with serde, which
//! refuses unknown keys; bounds are checked right after. Afterwards only
//! [`Card::resolved_files`] and the derived `extra1`/`extra2` bytes change
//! while a card is processed.

pub mod card;
pub mod config;

pub use card::{Card, PlayMode};
pub use config::{Config, FilenameStyle, check_consecutive};
