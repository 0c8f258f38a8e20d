// tonuino-cards - SD card layout and RFID card codes for Tonuino music boxes
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides the command line entry point.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::{Error, Issue, Result, Severity};
pub use metrics::Metrics;
pub use models::{Card, Config, FilenameStyle, PlayMode};
pub use services::{CardCompiler, CompileReport};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
