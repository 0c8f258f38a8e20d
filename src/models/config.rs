use crate::config::schema::{self, describe_key};
use crate::error::{Error, Issue, Result};
use crate::models::Card;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Highest folder number a Tonuino player can address
pub const MAX_FOLDERS: usize = 99;

/// Naming scheme for files copied to the SD card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum FilenameStyle {
    /// `001-Artist-Title.mp3`, falling back to the source file name
    #[default]
    #[serde(rename = "mp3tags")]
    TagBased,
    /// `001.mp3`
    #[serde(rename = "tracknumber")]
    TrackNumberOnly,
}

impl FilenameStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            FilenameStyle::TagBased => "mp3tags",
            FilenameStyle::TrackNumberOnly => "tracknumber",
        }
    }
}

impl FromStr for FilenameStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mp3tags" => Ok(FilenameStyle::TagBased),
            "tracknumber" => Ok(FilenameStyle::TrackNumberOnly),
            other => Err(Error::UnknownFilenameStyle(other.to_string())),
        }
    }
}

impl TryFrom<String> for FilenameStyle {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for FilenameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete configuration: global settings and all cards
///
/// Keys of the YAML file map onto fields as follows:
/// `sourcebasedir`, `cardcookie`, `version`, `maxcardsperqrcode`,
/// `filenametype`, `create_tableofcontents`, `cards`.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base directory relative sources are resolved against
    pub source_base_dir: Utf8PathBuf,
    /// 8 character magic marker at the start of each byte code
    pub card_cookie: String,
    pub version: u32,
    pub max_cards_per_qrcode: usize,
    pub filename_style: FilenameStyle,
    pub create_table_of_contents: bool,
    /// Cards in ascending number order
    pub cards: IndexMap<u32, Card>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_base_dir: Utf8PathBuf::new(),
            card_cookie: "1337B347".to_string(),
            version: 2,
            max_cards_per_qrcode: 4,
            filename_style: FilenameStyle::TagBased,
            create_table_of_contents: true,
            cards: IndexMap::new(),
        }
    }
}

/// The YAML file as written. Every global key is optional and merged over
/// [`Config::default`]; `cards` is required.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(rename = "sourcebasedir", default)]
    source_base_dir: Option<Utf8PathBuf>,
    #[serde(rename = "cardcookie", default)]
    card_cookie: Option<String>,
    #[serde(default)]
    version: Option<u32>,
    #[serde(rename = "maxcardsperqrcode", default)]
    max_cards_per_qrcode: Option<usize>,
    #[serde(rename = "filenametype", default)]
    filename_style: Option<FilenameStyle>,
    #[serde(rename = "create_tableofcontents", default)]
    create_table_of_contents: Option<bool>,
    cards: Mapping,
}

impl ConfigFile {
    /// Bounds serde cannot express
    fn check(&self) -> Result<()> {
        if let Some(cookie) = &self.card_cookie {
            schema::exact_chars("cardcookie", cookie, 8)?;
        }
        if let Some(version) = self.version {
            schema::at_least("version", version.into(), 1)?;
        }
        if let Some(max) = self.max_cards_per_qrcode {
            schema::at_least("maxcardsperqrcode", max as u64, 1)?;
        }
        Ok(())
    }

    /// Global settings over the defaults, and the raw cards
    fn merge(self) -> (Config, Mapping) {
        let defaults = Config::default();
        let config = Config {
            source_base_dir: self.source_base_dir.unwrap_or(defaults.source_base_dir),
            card_cookie: self.card_cookie.unwrap_or(defaults.card_cookie),
            version: self.version.unwrap_or(defaults.version),
            max_cards_per_qrcode: self
                .max_cards_per_qrcode
                .unwrap_or(defaults.max_cards_per_qrcode),
            filename_style: self.filename_style.unwrap_or(defaults.filename_style),
            create_table_of_contents: self
                .create_table_of_contents
                .unwrap_or(defaults.create_table_of_contents),
            cards: IndexMap::new(),
        };
        (config, self.cards)
    }
}

impl Config {
    /// Import and check the whole YAML tree.
    ///
    /// Works in two steps:
    /// 1. Deserialize the global keys, check their bounds and merge them
    ///    over the defaults.
    /// 2. Import the cards: numeric keys, per-card checks, consecutive
    ///    numbering.
    ///
    /// Every check runs before anything touches the file system. More than
    /// 99 cards is only a warning.
    pub fn import(data: &Value) -> Result<Self> {
        let file: ConfigFile = schema::parse(data, "configuration")?;
        file.check()?;

        let (mut config, cards) = file.merge();
        tracing::debug!(
            "Global settings: sourcebasedir={}, cardcookie={}, version={}, maxcardsperqrcode={}, filenametype={}, create_tableofcontents={}",
            config.source_base_dir,
            config.card_cookie,
            config.version,
            config.max_cards_per_qrcode,
            config.filename_style,
            config.create_table_of_contents
        );
        config.cards = import_cards(&cards)?;

        if let Some(issue) = config.check_card_count() {
            issue.log();
        }

        Ok(config)
    }

/// Warning if more cards are defined than a player has folders
    pub fn check_card_count(&self) -> Option<Issue> {
        (self.cards.len() > MAX_FOLDERS).then_some(Issue::TooManyCards {
            count: self.cards.len(),
        })
    }
}

/// Parse a key below `cards` into a card number
fn card_number(key: &Value) -> Result<u32> {
    let number = match key {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            s.parse::<u32>().ok()
        }
        _ => None,
    };
    number.ok_or_else(|| Error::NonNumericKey(describe_key(key)))
}

fn import_cards(cards: &Mapping) -> Result<IndexMap<u32, Card>> {
    // All keys are checked before any card is parsed
    let numbers = cards
        .keys()
        .map(card_number)
        .collect::<Result<Vec<u32>>>()?;

    let mut imported = IndexMap::with_capacity(cards.len());
    for (number, data) in numbers.iter().copied().zip(cards.values()) {
        let mut card = Card::from_value(data).map_err(|e| match e {
            Error::ConfigValidation(msg) => {
                Error::ConfigValidation(format!("Card {number}: {msg}"))
            }
            other => other,
        })?;
        card.number = number;
        imported.insert(number, card);
    }

    check_consecutive(&numbers)?;

    imported.sort_keys();
    Ok(imported)
}

/// Card numbers up to 99 must be exactly `1..=n`, each used once.
///
/// Numbers above 99 are not part of the run and are not checked.
pub fn check_consecutive(numbers: &[u32]) -> Result<()> {
    let low: Vec<u32> = numbers
        .iter()
        .copied()
        .filter(|&n| (n as usize) <= MAX_FOLDERS)
        .collect();
    let unique: BTreeSet<u32> = low.iter().copied().collect();

    let expected_end = u32::try_from(unique.len()).unwrap_or(u32::MAX);
    let consecutive = unique.iter().copied().eq(1..=expected_end);

    if unique.len() != low.len() || !consecutive {
        return Err(Error::NonConsecutive(unique.len()));
    }
    Ok(())
}
