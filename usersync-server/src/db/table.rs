//! Table name validation
//!
//! Table names are interpolated into SQL text, so only plain unquoted
//! identifiers are accepted.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

/// Default table holding user rows
pub const DEFAULT_TABLE: &str = "users";

/// Maximum identifier length PostgreSQL keeps without truncation
const MAX_TABLE_NAME_LEN: usize = 63;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex"));

/// Invalid table name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid table name '{name}': {reason}")]
pub struct InvalidTableName {
    pub name: String,
    pub reason: &'static str,
}

/// Validated SQL table identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Create a table name.
    ///
    /// # Example
    /// ```
    /// use usersync_server::db::TableName;
    ///
    /// assert!(TableName::new("users").is_ok());
    /// assert!(TableName::new("users; DROP TABLE users").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, InvalidTableName> {
        let invalid = |reason| InvalidTableName {
            name: s.to_owned(),
            reason,
        };

        if s.is_empty() {
            return Err(invalid("cannot be empty"));
        }

        if s.len() > MAX_TABLE_NAME_LEN {
            return Err(invalid("exceeds 63 characters"));
        }

        if !IDENT_RE.is_match(s) {
            return Err(invalid(
                "must be letters, digits and underscores, not starting with a digit",
            ));
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE.to_owned())
    }
}

impl FromStr for TableName {
    type Err = InvalidTableName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
