//! Card byte codes.
//!
//! The code written to an RFID card is the 8 character cookie followed by
//! five bytes as lowercase hex, without separators:
//!
//! ```text
//! 1337B347 02 03 07 02 03
//! cookie   |  |  |  |  extra2
//!          |  |  |  extra1
//!          |  |  mode
//!          |  folder
//!          version
//! ```

use crate::error::Result;
use crate::models::{Card, Config, PlayMode};

/// Render a number as at least two lowercase hex digits.
///
/// Values above 255 are not truncated and produce more digits.
pub fn decimal_to_hex(number: u32) -> String {
    format!("{number:02x}")
}

/// Inverse of [`decimal_to_hex`]
pub fn hex_to_int(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex, 16).ok()
}

/// Build the byte code for the given fields. An unknown mode symbol is
/// fatal.
pub fn encode(
    cookie: &str,
    version: u32,
    directory: u32,
    mode: &str,
    extra1: u32,
    extra2: u32,
) -> Result<String> {
    let mode: PlayMode = mode.parse()?;
    Ok(format!(
        "{cookie}{}{}{}{}{}",
        decimal_to_hex(version),
        decimal_to_hex(directory),
        decimal_to_hex(mode.code()),
        decimal_to_hex(extra1),
        decimal_to_hex(extra2),
    ))
}

/// Byte code for a card whose mode parameters have been applied
pub fn encode_card(config: &Config, card: &Card) -> Result<String> {
    encode(
        &config.card_cookie,
        config.version,
        card.number,
        &card.mode,
        card.extra1,
        card.extra2,
    )
}
