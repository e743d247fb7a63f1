// ── Core identity type ──
//
// Records are keyed either by a locally generated number (sequence or
// millisecond timestamp) or by a server-issued key. Managers treat both
// as opaque comparison keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use scholar_api::WireId;

/// Canonical identifier for any school entity.
///
/// JSON numbers deserialize to `Local`, strings to `Remote`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Local(u64),
    Remote(String),
}

impl EntityId {
    pub fn as_local(&self) -> Option<u64> {
        match self {
            Self::Local(n) => Some(*n),
            Self::Remote(_) => None,
        }
    }

    pub fn as_remote(&self) -> Option<&str> {
        match self {
            Self::Remote(s) => Some(s),
            Self::Local(_) => None,
        }
    }

    /// Whether `text` is how this id is displayed. Lets typed input be
    /// compared without guessing which id space it belongs to.
    pub fn matches_text(&self, text: &str) -> bool {
        match self {
            Self::Local(n) => n.to_string() == text,
            Self::Remote(s) => s == text,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(n) => write!(f, "{n}"),
            Self::Remote(s) => f.write_str(s),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self::Local(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) => Self::Local(n),
            Err(_) => Self::Remote(s.to_owned()),
        }
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match s.parse::<u64>() {
            Ok(n) => Self::Local(n),
            Err(_) => Self::Remote(s),
        }
    }
}

impl From<WireId> for EntityId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => Self::Local(n),
            WireId::Text(s) => Self::Remote(s),
        }
    }
}
