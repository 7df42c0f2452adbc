//! Status enums for various entities.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Processing status of a customer query.
///
/// The backend sets the status; new queries start out `Pending`. Values the
/// client does not know are carried through verbatim so they still display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum QueryStatus {
    #[default]
    Pending,
    Resolved,
    Other(String),
}

impl QueryStatus {
    /// Returns the status label as sent by the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Resolved => "Resolved",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for QueryStatus {
    fn from(s: &str) -> Self {
        match s {
            "" | "Pending" => Self::Pending,
            "Resolved" => Self::Resolved,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for QueryStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Missing, null or non-string statuses read as `Pending`.
impl<'de> Deserialize<'de> for QueryStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = crate::types::lenient::string(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}
