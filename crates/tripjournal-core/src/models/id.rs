use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-issued identifier of a trip, event or media item.
///
/// The service issues integers, but the client treats ids as opaque and
/// keeps whichever JSON form it was given so it can send it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Text(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Text(id)
    }
}

impl std::str::FromStr for ResourceId {
    type Err = std::convert::Infallible;

    /// Numeric input becomes `Int` so it serializes the way the service issued it
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(id) => ResourceId::Int(id),
            Err(_) => ResourceId::Text(s.to_string()),
        })
    }
}
