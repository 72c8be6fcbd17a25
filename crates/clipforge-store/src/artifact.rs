//! The [`Artifact`] handle returned by every store operation.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clipforge_common::ids::ARTIFACT_ID_LEN;
use clipforge_common::ArtifactId;

/// An immutable stored media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Generated identifier; the filename prefix.
    pub id: ArtifactId,
    /// File-type suffix including its leading dot (e.g. `.mp4`).
    pub extension: String,
    /// Absolute location inside the store directory.
    pub path: PathBuf,
    /// Modification time of the file.
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// `id + extension`.
    pub fn filename(&self) -> String {
        self.id.filename(&self.extension)
    }

    /// Build an artifact handle from a path inside the store.
    ///
    /// Returns `None` for entries that do not follow the `<id><extension>`
    /// naming scheme or whose metadata cannot be read.
    pub(crate) fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let (id, extension) = split_filename(name)?;
        let modified = std::fs::metadata(path).ok()?.modified().ok()?;

        Some(Self {
            id,
            extension: extension.to_string(),
            path: path.to_path_buf(),
            created_at: DateTime::<Utc>::from(modified),
        })
    }
}

/// Split `<id><extension>` into its parts.
pub(crate) fn split_filename(name: &str) -> Option<(ArtifactId, &str)> {
    if name.len() < ARTIFACT_ID_LEN || !name.is_char_boundary(ARTIFACT_ID_LEN) {
        return None;
    }
    let (id, extension) = name.split_at(ARTIFACT_ID_LEN);
    if !extension.is_empty() && !extension.starts_with('.') {
        return None;
    }
    Some((id.parse().ok()?, extension))
}
