//! Shape checks for the raw YAML tree.
//!
//! The serde models declare which keys exist, their types and the accepted
//! enum symbols, and refuse unknown keys through `deny_unknown_fields`.
//! This module adds the checks serde does not express: `null` in place of a
//! declared field and value bounds. Every failure is an
//! [`Error::ConfigValidation`] describing the first violation.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_yaml_ng::Value;

/// Deserialize one level of the tree (the whole file or a single card).
///
/// `what` names the level in messages, e.g. "configuration" or "card 3".
pub fn parse<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T> {
    reject_nulls(value)?;
    serde_yaml_ng::from_value(value.clone()).map_err(|e| invalid(format!("Invalid {what}: {e}")))
}

/// A key that is present with an empty value is an error, not a default
fn reject_nulls(value: &Value) -> Result<()> {
    let Some(mapping) = value.as_mapping() else {
        return Ok(());
    };
    match mapping.iter().find(|(_, v)| v.is_null()) {
        Some((key, _)) => Err(invalid(format!(
            "The value for '{}' is empty (None)",
            describe_key(key)
        ))),
        None => Ok(()),
    }
}

pub fn at_least(key: &str, value: u64, min: u64) -> Result<()> {
    if value < min {
        return Err(invalid(format!("'{key}' must be at least {min}, found {value}")));
    }
    Ok(())
}

pub fn at_most(key: &str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(invalid(format!("'{key}' must be at most {max}, found {value}")));
    }
    Ok(())
}

pub fn exact_chars(key: &str, value: &str, len: usize) -> Result<()> {
    if value.chars().count() != len {
        return Err(invalid(format!(
            "'{key}' must be exactly {len} characters long, found '{value}'"
        )));
    }
    Ok(())
}

/// A non-empty list whose entries are all non-empty
pub fn non_empty_entries(key: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(invalid(format!("'{key}' must not be an empty list")));
    }
    if let Some(pos) = values.iter().position(String::is_empty) {
        return Err(invalid(format!(
            "'{key}' must not contain empty entries, entry {} is empty",
            pos + 1
        )));
    }
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation(message)
}

/// Render a mapping key for messages
pub(crate) fn describe_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => describe_key(&tagged.value),
    }
}
