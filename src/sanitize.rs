//! Identifier sanitization for generated query text.
//!
//! The engine's parameter binding does not cover identifiers, so table and
//! column names are embedded into query text directly. Every interpolation
//! point in this crate goes through [`sanitize`] first; nothing else escapes
//! identifiers.

use std::fmt;

use crate::error::{ProfileError, ProfileResult};

/// An identifier validated by [`sanitize`].
///
/// `Display` renders the double-quoted form, safe to interpolate into query
/// text without further escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeIdentifier(String);

impl SafeIdentifier {
    /// The raw (unquoted) identifier.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

/// Validate a table or column name for safe interpolation.
///
/// Rejects empty names and names containing characters that could escape a
/// quoted identifier or otherwise produce ambiguous query text: quote
/// characters, backslash, semicolon, and control characters. Anything else
/// (spaces, unicode, mixed case) is allowed inside the quoted form.
pub fn sanitize(name: &str) -> ProfileResult<SafeIdentifier> {
    if name.is_empty() {
        return Err(ProfileError::InvalidIdentifier {
            name: name.to_string(),
            message: "identifier is empty".to_string(),
        });
    }

    if let Some(c) = name
        .chars()
        .find(|c| matches!(c, '"' | '\'' | '`' | '\\' | ';') || c.is_control())
    {
        return Err(ProfileError::InvalidIdentifier {
            name: name.to_string(),
            message: format!("identifier contains forbidden character {c:?}"),
        });
    }

    Ok(SafeIdentifier(name.to_string()))
}
