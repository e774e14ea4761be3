//! Strongly-typed identifiers for Vercel resources.
//!
//! The API identifies resources with opaque prefixed strings (`prj_...`,
//! `team_...`, `ecfg_...`). Wrapping them keeps a project id from being
//! passed where a team id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Macro to generate strongly-typed identifier wrapper types.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier without validating it.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Converts into the inner string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }

            /// Parses an identifier, rejecting empty or whitespace input.
            ///
            /// # Errors
            ///
            /// Returns [`Error::InvalidId`] if the input is blank.
            pub fn parse_str(input: &str) -> Result<Self> {
                validate_id(input).map(|id| Self(id.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(wrapper: $name) -> Self {
                wrapper.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

id_type!(TeamId, "Team identifier (`team_...`)");
id_type!(ProjectId, "Project identifier (`prj_...`)");
id_type!(EnvironmentVariableId, "Project environment variable identifier");
id_type!(DnsRecordId, "DNS record identifier (`rec_...`)");
id_type!(EdgeConfigId, "Edge Config identifier (`ecfg_...`)");
id_type!(DrainId, "Drain identifier");

// Characters that would end or re-route a URL path segment.
const RESERVED: &[char] = &['/', '\\', '?', '#', '%'];

/// Validates a string used as a single URL path segment.
///
/// Every id, name or slug interpolated into a request path goes through
/// here.
///
/// # Errors
///
/// Returns [`Error::InvalidId`] if the string is empty, padded with
/// whitespace, a `.`/`..` segment, or contains `/`, `\`, `?`, `#`, `%` or
/// a control character.
pub fn validate_id(s: &str) -> Result<&str> {
    let invalid = s.trim().is_empty()
        || s.trim() != s
        || s == "."
        || s == ".."
        || s.contains(RESERVED)
        || s.chars().any(char::is_control);
    if invalid {
        return Err(Error::InvalidId(s.to_string()));
    }
    Ok(s)
}
