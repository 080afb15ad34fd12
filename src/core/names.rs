//! Default object-name rules.

use super::NameValidator;
use crate::util::{Error, Result};

/// Maximum length of an object name in bytes.
pub const MAX_NAME: usize = 256;

/// Classic naming rules.
///
/// A name is non-empty, at most [`MAX_NAME`] bytes, starts with a letter,
/// digit, underscore or non-ASCII character, contains no `/` or control
/// characters, and does not end in whitespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassicNameValidator;

impl NameValidator for ClassicNameValidator {
    fn normalize(&self, raw: &str) -> Result<String> {
        if raw.len() > MAX_NAME {
            return Err(Error::MaxName { len: raw.len(), max: MAX_NAME });
        }
        let first = raw.chars().next().ok_or_else(|| Error::BadName(raw.to_string()))?;
        if first.is_ascii() && !(first.is_ascii_alphanumeric() || first == '_') {
            return Err(Error::BadName(raw.to_string()));
        }
        if raw.chars().any(|c| c == '/' || c.is_control()) {
            return Err(Error::BadName(raw.to_string()));
        }
        if raw.ends_with(|c: char| c.is_ascii_whitespace()) {
            return Err(Error::BadName(raw.to_string()));
        }
        Ok(raw.to_string())
    }
}
