//! Filesystem-backed artifact store.
//!
//! All state lives in one flat directory. Artifacts are named
//! `<id><extension>`; lookup by id is a prefix scan of the directory listing.
//! Entries whose name starts with `.` are staging files or directories and
//! are never resolvable.

use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use clipforge_common::paths::normalize_extension;
use clipforge_common::{ArtifactId, Error, Result};
use tempfile::TempDir;

use crate::artifact::Artifact;

/// Extension used when neither the caller nor the hint supplies one.
pub const DEFAULT_EXTENSION: &str = ".bin";

const INCOMING_PREFIX: &str = ".incoming-";
const STAGING_PREFIX: &str = ".staging-";

/// Handle to the artifact directory.
///
/// Cloning is cheap; all clones refer to the same directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: Arc<PathBuf>,
}

impl ArtifactStore {
    /// Open (and create if needed) the store rooted at `root`.
    ///
    /// The root is canonicalized so artifact paths handed to the encoder are
    /// absolute.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = std::fs::canonicalize(&root)?;
        tracing::debug!(root = %root.display(), "artifact store opened");
        Ok(Self {
            root: Arc::new(root),
        })
    }

    /// The store directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `bytes` as a new artifact.
    ///
    /// The bytes are written and synced under a hidden name first, then
    /// renamed into place without clobbering. If any step fails no
    /// resolvable artifact is left behind.
    pub fn create(&self, bytes: &[u8], extension_hint: &str) -> Result<Artifact> {
        let id = ArtifactId::new();
        let extension = normalize_extension(extension_hint, DEFAULT_EXTENSION);
        let dest = self.root.join(id.filename(&extension));

        let mut staged = tempfile::Builder::new()
            .prefix(INCOMING_PREFIX)
            .tempfile_in(self.root.as_path())?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;
        staged.persist_noclobber(&dest).map_err(|e| e.error)?;

        tracing::debug!(artifact_id = %id, size = bytes.len(), "artifact created");
        self.load(&dest)
    }

    /// Move a fully written file into the store as a new artifact.
    ///
    /// `source` should live on the same filesystem as the store (see
    /// [`ArtifactStore::staging_dir`]) so the move is an atomic rename.
    pub fn ingest(&self, source: &Path, extension_hint: &str) -> Result<Artifact> {
        let id = ArtifactId::new();
        let extension = normalize_extension(extension_hint, DEFAULT_EXTENSION);
        let dest = self.root.join(id.filename(&extension));

        if dest.exists() {
            return Err(Error::internal(format!("artifact {id} already exists")));
        }

        if let Err(rename_err) = std::fs::rename(source, &dest) {
            tracing::debug!(error = %rename_err, "rename into store failed; copying");
            self.copy_into(source, &dest)?;
        }

        tracing::debug!(artifact_id = %id, "artifact ingested");
        self.load(&dest)
    }

    /// Different filesystem: copy under a hidden name, then rename. The
    /// source is removed afterwards; failing to remove it does not fail
    /// the ingest.
    fn copy_into(&self, source: &Path, dest: &Path) -> Result<()> {
        let staged = tempfile::Builder::new()
            .prefix(INCOMING_PREFIX)
            .tempfile_in(self.root.as_path())?;
        std::fs::copy(source, staged.path())?;
        staged.persist_noclobber(dest).map_err(|e| e.error)?;

        if let Err(e) = std::fs::remove_file(source) {
            tracing::debug!(
                path = %source.display(),
                error = %e,
                "ingest: failed to remove copied source"
            );
        }
        Ok(())
    }

    /// Resolve an artifact by id.
    ///
    /// Lists the directory and returns the single entry whose name starts
    /// with `id`. More than one match means the id invariant was violated and
    /// is reported as [`Error::Internal`].
    pub fn resolve_by_id(&self, id: &str) -> Result<Artifact> {
        let id = id.trim();
        if id.is_empty() || id.starts_with('.') {
            return Err(Error::not_found("artifact", id));
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(self.root.as_path())? {
            let Ok(entry) = entry else { continue };
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(id) {
                continue;
            }
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                matches.push(entry.path());
            }
        }

        match matches.as_slice() {
            [] => Err(Error::not_found("artifact", id)),
            [path] => self.load(path),
            many => Err(Error::internal(format!(
                "artifact id {id} is ambiguous: {} entries match",
                many.len()
            ))),
        }
    }

    /// Resolve an artifact by its exact filename.
    pub fn resolve_exact(&self, filename: &str) -> Result<Artifact> {
        let mut components = Path::new(filename).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_normal || filename.starts_with('.') {
            return Err(Error::not_found("artifact", filename));
        }

        let path = self.root.join(filename);
        if !path.is_file() {
            return Err(Error::not_found("artifact", filename));
        }
        self.load(&path)
    }

    /// Remove every entry at least `max_age` old.
    ///
    /// Returns the number of entries removed. Failures on individual entries
    /// are logged and skipped; only failing to list the directory is an
    /// error.
    pub fn sweep(&self, max_age: Duration) -> Result<usize> {
        self.sweep_at(SystemTime::now(), max_age)
    }

    /// [`ArtifactStore::sweep`] evaluated as if the current time were `now`.
    pub fn sweep_at(&self, now: SystemTime, max_age: Duration) -> Result<usize> {
        let cutoff = now.checked_sub(max_age).unwrap_or(SystemTime::UNIX_EPOCH);
        let mut removed = 0;

        for entry in std::fs::read_dir(self.root.as_path())? {
            let Ok(entry) = entry else { continue };
            let path = entry.path();

            let Ok(metadata) = entry.metadata() else {
                tracing::warn!(path = %path.display(), "sweep: cannot stat entry");
                continue;
            };
            let Ok(modified) = metadata.modified() else { continue };
            if modified > cutoff {
                continue;
            }

            let result = if metadata.is_dir() {
                // Only abandoned staging directories live here.
                let is_staging = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|n| n.starts_with(STAGING_PREFIX));
                if !is_staging {
                    continue;
                }
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };

            match result {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "sweep: failed to remove entry");
                }
            }
        }

        if removed > 0 {
            tracing::info!(removed, "swept expired artifacts");
        }
        Ok(removed)
    }

    /// Create a hidden scratch directory inside the store.
    ///
    /// Encoder outputs and auxiliary files (concat lists) are written here
    /// and moved into the store with [`ArtifactStore::ingest`] on success.
    /// The directory and anything left in it are removed on drop.
    pub fn staging_dir(&self) -> Result<TempDir> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(self.root.as_path())?;
        Ok(dir)
    }

    fn load(&self, path: &Path) -> Result<Artifact> {
        Artifact::from_path(path).ok_or_else(|| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            Error::not_found("artifact", name)
        })
    }
}
