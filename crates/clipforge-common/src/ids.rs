//! Typed artifact identifier.
//!
//! Artifact lookup is a prefix scan over the store directory, so ids must be
//! fixed-length and uniformly structured: no id may ever be a prefix of
//! another. [`ArtifactId`] wraps a v4 UUID and always renders in the
//! 36-character hyphenated form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rendered length of every [`ArtifactId`].
pub const ARTIFACT_ID_LEN: usize = 36;

/// Unique identifier for a stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    /// Generate a new random artifact ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Filename this artifact is stored under, given a normalized extension.
    pub fn filename(&self, extension: &str) -> String {
        format!("{}{}", self, extension)
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ArtifactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for ArtifactId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ArtifactId> for Uuid {
    fn from(id: ArtifactId) -> Self {
        id.0
    }
}
