//! Decode errors for user record payloads

use std::fmt;

/// A request payload or record that cannot be decoded into a user row.
///
/// Paths are dotted field paths relative to the record (`address.geo.lat`).
/// Inside a batch they are prefixed with the element index (`[2].company`).
/// An empty path names the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    /// Body is not valid JSON
    InvalidJson { reason: String },

    /// Top-level payload is valid JSON but not an array
    NotAnArray { found: &'static str },

    /// Required field or nesting level is absent
    Missing { path: String },

    /// Field is present with the wrong JSON type
    WrongType { path: String, expected: &'static str },
}

impl MalformedRecord {
    /// Path of the offending field, if the error concerns one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Missing { path } | Self::WrongType { path, .. } => Some(path),
            Self::InvalidJson { .. } | Self::NotAnArray { .. } => None,
        }
    }

    /// Re-root the path under the batch element at `index`.
    pub fn at_index(self, index: usize) -> Self {
        let reroot = |path: String| {
            if path.is_empty() {
                format!("[{index}]")
            } else {
                format!("[{index}].{path}")
            }
        };

        match self {
            Self::Missing { path } => Self::Missing { path: reroot(path) },
            Self::WrongType { path, expected } => Self::WrongType {
                path: reroot(path),
                expected,
            },
            other => other,
        }
    }
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson { reason } => write!(f, "payload is not valid JSON: {}", reason),
            Self::NotAnArray { found } => {
                write!(f, "payload must be a JSON array of users, found {}", found)
            }
            Self::Missing { path } => write!(f, "missing required field '{}'", path),
            Self::WrongType { path, expected } if path.is_empty() => {
                write!(f, "record must be {}", expected)
            }
            Self::WrongType { path, expected } => write!(f, "'{}' must be {}", path, expected),
        }
    }
}

impl std::error::Error for MalformedRecord {}
