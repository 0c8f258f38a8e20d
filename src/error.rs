//! Error and issue types.
//!
//! Two tiers exist:
//! - [`Error`]: fatal problems. Every variant aborts the whole run; the binary
//!   maps them to a non-zero exit code.
//! - [`Issue`]: recoverable problems. They are logged when raised, collected in
//!   the [`CompileReport`](crate::services::CompileReport), and processing
//!   continues with the next source or card.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Fatal errors that abort the run
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration is invalid: {0}")]
    ConfigValidation(String),

    #[error("Card identifiers must be numeric. Found '{0}' instead")]
    NonNumericKey(String),

    #[error(
        "The {0} cards don't seem to be numbered consecutively, \
         or you used the same card identifier multiple times"
    )]
    NonConsecutive(usize),

    #[error("The mode '{0}' is unknown, this will not work.")]
    UnknownMode(String),

    #[error("The filename type '{0}' is unknown. Use 'mp3tags' or 'tracknumber'")]
    UnknownFilenameStyle(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "QR code batch {batch} holds {bytes} bytes, more than the {limit} bytes a QR code can store. \
         Lower 'maxcardsperqrcode' or shorten the card descriptions"
    )]
    QrCapacityExceeded {
        batch: usize,
        bytes: usize,
        limit: usize,
    },

    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Log level an [`Issue`] is reported with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Recoverable problems. The affected source or card is skipped or flagged,
/// the run goes on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    #[error("{path} seems to be neither a file nor a directory. Will not process ({ordinal} source of this card)")]
    SourceNotFound { path: Utf8PathBuf, ordinal: String },

    #[error("{ordinal} source of this card appears to be empty. Will not process")]
    EmptySourceEntry { ordinal: String },

    #[error("The source definition for this card seems to be empty")]
    EmptySourceDefinition,

    #[error("Could not read {path}: {reason}")]
    UnreadableEntry { path: String, reason: String },

    #[error(
        "This card and therefore a directory on the SD card is handling more than 255 files ({count}). \
         This will not work in typical Tonuino MP3 players!"
    )]
    TooManyFiles { count: usize },

    #[error(
        "You've set a mode with from-to song ranges, but you haven't defined this range. \
         Set the keys 'from_song' and 'to_song' in your card configuration. \
         Card {card} will not work as expected!"
    )]
    MissingSongRange { card: u32 },

    #[error(
        "You have defined more than 99 cards ({count}). \
         This will not work in typical Tonuino MP3 players!"
    )]
    TooManyCards { count: usize },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::EmptySourceDefinition | Issue::MissingSongRange { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// Write the issue to the log at its severity
    pub fn log(&self) {
        match self.severity() {
            Severity::Warning => tracing::warn!("{}", self),
            Severity::Error => tracing::error!("{}", self),
        }
    }
}

/// English ordinal for a 1-based position: 1st, 2nd, 3rd, 4th, 11th, 21st...
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(112), "112th");
    }

    #[test]
    fn test_issue_severity() {
        assert_eq!(Issue::EmptySourceDefinition.severity(), Severity::Error);
        assert_eq!(Issue::MissingSongRange { card: 3 }.severity(), Severity::Error);
        assert_eq!(Issue::TooManyFiles { count: 300 }.severity(), Severity::Warning);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::NonNumericKey("two".to_string()).to_string(),
            "Card identifiers must be numeric. Found 'two' instead"
        );
        assert!(Error::NonConsecutive(2)
            .to_string()
            .starts_with("The 2 cards don't seem to be numbered consecutively"));
        assert_eq!(
            Error::UnknownMode("nonexistent-mode".to_string()).to_string(),
            "The mode 'nonexistent-mode' is unknown, this will not work."
        );
    }
}
