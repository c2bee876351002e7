//! Typed identifiers for schema objects and migration steps.
//!
//! Using typed IDs prevents accidentally passing a `FieldId` where a `CollectionId` is expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Macro to generate typed string ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

typed_id!(CollectionId, "Stable identifier of a collection, immutable once assigned.");
typed_id!(FieldId, "Stable identifier of a field within a collection.");

/// Error returned when a migration identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid migration id: '{0}'")]
pub struct InvalidMigrationId(pub String);

/// Identifier of a migration step.
///
/// Identifiers are Unix timestamps (seconds) taken when the step was written,
/// so numeric order is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationId(u64);

impl MigrationId {
    /// Creates an ID from a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Creates an ID from a creation timestamp.
    ///
    /// Timestamps before the Unix epoch clamp to zero.
    #[must_use]
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(u64::try_from(at.timestamp()).unwrap_or(0))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the creation time encoded in this ID.
    #[must_use]
    pub fn created_at(self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Parses the leading digits of a migration file stem such as
    /// `1769902879_add_sessions_collection`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stem does not start with a numeric ID.
    pub fn from_file_stem(stem: &str) -> Result<Self, InvalidMigrationId> {
        let digits = stem.split('_').next().unwrap_or_default();
        digits.parse().map_err(|_| InvalidMigrationId(stem.to_string()))
    }
}

impl std::fmt::Display for MigrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MigrationId {
    type Err = InvalidMigrationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidMigrationId(s.to_string()))
    }
}

impl From<u64> for MigrationId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for MigrationId {
    type Error = InvalidMigrationId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| InvalidMigrationId(value.to_string()))
    }
}

impl TryFrom<MigrationId> for i64 {
    type Error = InvalidMigrationId;

    fn try_from(value: MigrationId) -> Result<Self, Self::Error> {
        Self::try_from(value.0).map_err(|_| InvalidMigrationId(value.to_string()))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
