//! Task handle: the opaque key a caller receives at submission and presents
//! on every poll.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, globally unique identifier of a submitted task
///
/// Backed by a random (v4) UUID and rendered in its hyphenated form, which is
/// also the key stored by the shared cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(Uuid);

impl TaskHandle {
    /// Generate a fresh handle
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for TaskHandle {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Returned when a string is not a valid task handle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid task handle: {input}")]
pub struct InvalidHandle {
    pub input: String,
}

impl FromStr for TaskHandle {
    type Err = InvalidHandle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self).map_err(|_| InvalidHandle {
            input: s.to_string(),
        })
    }
}
