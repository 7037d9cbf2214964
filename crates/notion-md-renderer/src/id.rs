//! Block and page identifiers.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::ConvertError;

/// Trailing 32-digit id, dashed or not, optionally followed by a query or
/// fragment. Page URLs put it after the title slug.
static TRAILING_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[^0-9a-fA-F])([0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12})(?:[?#].*)?$",
    )
    .expect("invalid block id regex")
});

/// Canonical (dashed, lowercase) block identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(String);

impl BlockId {
    /// Parse a dashed UUID, a 32-digit hex id or a page URL ending in one.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidId`] if no id can be extracted.
    pub fn parse(input: &str) -> Result<Self, ConvertError> {
        let trimmed = input.trim();
        let invalid = || ConvertError::InvalidId(input.to_owned());
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let candidate = TRAILING_ID_PATTERN
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .ok_or_else(invalid)?;
        let uuid = Uuid::parse_str(candidate.as_str()).map_err(|_| invalid())?;
        Ok(Self(uuid.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BlockId {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
