//! Catalog record name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Name`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The input is empty or only whitespace.
    #[error("name cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains control characters.
    #[error("name cannot contain control characters")]
    ControlCharacter,
}

/// The name of a flavor, ingredient or allergen.
///
/// Names are the natural key of every catalog table. Surrounding whitespace is
/// trimmed; the remaining text must be non-empty, at most
/// [`Name::MAX_LENGTH`] characters and free of control characters.
///
/// Comparison here is exact. The store compares names case-insensitively, so
/// `"Mint Chip"` and `"mint chip"` refer to the same record there.
///
/// ## Examples
///
/// ```
/// use parlour_core::Name;
///
/// assert_eq!(Name::parse("  Mint Chip ").unwrap().as_str(), "Mint Chip");
/// assert!(Name::parse("").is_err());
/// assert!(Name::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Maximum length of a name, in characters.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `Name` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than
    /// [`Name::MAX_LENGTH`] characters, or contains control characters.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(NameError::ControlCharacter);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Name` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let name = Name::parse("  Summer Strawberry\t").unwrap();
        assert_eq!(name.as_str(), "Summer Strawberry");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Name::parse(""), Err(NameError::Empty));
        assert_eq!(Name::parse(" \n "), Err(NameError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(Name::MAX_LENGTH + 1);
        assert_eq!(
            Name::parse(&long),
            Err(NameError::TooLong {
                max: Name::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_parse_max_length_counts_characters() {
        let exact = "é".repeat(Name::MAX_LENGTH);
        assert!(Name::parse(&exact).is_ok());
    }

    #[test]
    fn test_parse_control_character() {
        assert_eq!(
            Name::parse("Mint\u{0}Chip"),
            Err(NameError::ControlCharacter)
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Name, _> = serde_json::from_str("\" Peanuts \"");
        assert_eq!(ok.unwrap().as_str(), "Peanuts");

        let err: Result<Name, _> = serde_json::from_str("\"  \"");
        assert!(err.is_err());
    }
}
