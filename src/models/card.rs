use crate::config::schema;
use crate::error::{Error, Issue, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml_ng::Value;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Highest folder number the firmware can address
const MAX_DEST_FOLDER: u64 = 99;

/// Playback behaviour the Tonuino firmware applies to a card's folder.
///
/// The discriminant is the mode byte written into the card's byte code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayMode {
    PlayRandom = 1,
    Album = 2,
    Party = 3,
    Single = 4,
    Audiobook = 5,
    Admin = 6,
    PlayFromTo = 7,
    AlbumFromTo = 8,
    PartyFromTo = 9,
}

impl PlayMode {
    pub const ALL: [PlayMode; 9] = [
        PlayMode::PlayRandom,
        PlayMode::Album,
        PlayMode::Party,
        PlayMode::Single,
        PlayMode::Audiobook,
        PlayMode::Admin,
        PlayMode::PlayFromTo,
        PlayMode::AlbumFromTo,
        PlayMode::PartyFromTo,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayMode::PlayRandom => "play-random",
            PlayMode::Album => "album",
            PlayMode::Party => "party",
            PlayMode::Single => "single",
            PlayMode::Audiobook => "audiobook",
            PlayMode::Admin => "admin",
            PlayMode::PlayFromTo => "play-from-to",
            PlayMode::AlbumFromTo => "album-from-to",
            PlayMode::PartyFromTo => "party-from-to",
        }
    }

    /// Modes that play a `from_song`..`to_song` range of the folder
    pub fn is_range(self) -> bool {
        matches!(
            self,
            PlayMode::PlayFromTo | PlayMode::AlbumFromTo | PlayMode::PartyFromTo
        )
    }
}

impl FromStr for PlayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PlayMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single card: one RFID tag and the folder of tracks it plays.
///
/// Deserialized from one entry under `cards`; keys other than the ones
/// below are refused.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Card {
    /// Card number, assigned from the key under `cards`. 0 until imported.
    #[serde(skip_deserializing)]
    pub number: u32,
    #[serde(default)]
    pub description: Option<String>,
    /// A single string is read as a one-element list
    #[serde(rename = "source", deserialize_with = "one_or_many")]
    pub sources: Vec<String>,
    /// Mode symbol as written in the configuration
    #[serde(default = "default_mode", deserialize_with = "mode_symbol")]
    pub mode: String,
    /// 0 means unset
    #[serde(default, deserialize_with = "nonzero")]
    pub from_song: u32,
    /// 0 means unset
    #[serde(default, deserialize_with = "nonzero")]
    pub to_song: u32,
    /// Accepted for compatibility; the folder is always derived from `number`
    #[serde(default)]
    pub dest_folder: Option<u32>,
    #[serde(skip_deserializing)]
    pub extra1: u32,
    #[serde(skip_deserializing)]
    pub extra2: u32,
    /// Files found for `sources`, filled by source resolution
    #[serde(skip_deserializing)]
    pub resolved_files: Vec<Utf8PathBuf>,
}

fn default_mode() -> String {
    PlayMode::PlayRandom.as_str().to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(source) => vec![source],
        OneOrMany::Many(sources) => sources,
    })
}

/// Only the nine mode symbols are accepted
fn mode_symbol<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    PlayMode::deserialize(deserializer).map(|mode| mode.as_str().to_string())
}

fn nonzero<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    NonZeroU32::deserialize(deserializer).map(NonZeroU32::get)
}

impl Default for Card {
    fn default() -> Self {
        Self {
            number: 0,
            description: None,
            sources: Vec::new(),
            mode: default_mode(),
            from_song: 0,
            to_song: 0,
            dest_folder: None,
            extra1: 0,
            extra2: 0,
            resolved_files: Vec::new(),
        }
    }
}

impl Card {
    /// Build a card from its raw configuration tree.
    ///
    /// Keys not present keep their defaults. Fails with
    /// [`Error::ConfigValidation`] on unknown keys, empty values, wrong types,
    /// an unknown mode, an empty `source` list or a `dest_folder` outside
    /// 1..=99.
    pub fn from_value(data: &Value) -> Result<Self> {
        let card: Card = schema::parse(data, "card")?;
        schema::non_empty_entries("source", &card.sources)?;
        if let Some(folder) = card.dest_folder {
            schema::at_least("dest_folder", folder.into(), 1)?;
            schema::at_most("dest_folder", folder.into(), MAX_DEST_FOLDER)?;
        }
        tracing::debug!("Card configuration: {:?}", card);
        Ok(card)
    }

    /// Parsed play mode
    pub fn play_mode(&self) -> Result<PlayMode> {
        self.mode.parse()
    }

    /// Human readable summary, e.g. `Card no. 3 (Lullabies)`.
    ///
    /// Without a description the first resolved file and the file count are
    /// shown instead, once sources have been resolved.
    pub fn summary(&self) -> String {
        let mut output = format!("Card no. {}", self.number);

        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            output.push_str(&format!(" ({desc})"));
        } else if let Some(first) = self.resolved_files.first() {
            output.push_str(&format!(
                " ({}... ({} files)",
                first.file_name().unwrap_or(first.as_str()),
                self.resolved_files.len()
            ));
        }

        output
    }

    /// Derive `extra1`/`extra2` from the mode.
    ///
    /// `single` plays the first track of the folder. The from-to modes need
    /// both `from_song` and `to_song`; when one is missing the card keeps its
    /// previous extras and a [`Issue::MissingSongRange`] is raised. An
    /// unknown mode is fatal.
    pub fn apply_mode_parameters(&mut self) -> Result<Option<Issue>> {
        let mode = self.play_mode()?;

        if mode == PlayMode::Single {
            self.extra1 = 1;
        } else if mode.is_range() {
            if self.from_song > 0 && self.to_song > 0 {
                self.extra1 = self.from_song;
                self.extra2 = self.to_song;
            } else {
                let issue = Issue::MissingSongRange { card: self.number };
                issue.log();
                return Ok(Some(issue));
            }
        }

        Ok(None)
    }
}
