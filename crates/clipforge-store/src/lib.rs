//! # clipforge-store
//!
//! Lifecycle management for intermediate media artifacts.
//!
//! - **Artifact store** ([`ArtifactStore`]) -- a single flat directory of
//!   opaque `<id><extension>` files. The directory listing is the only source
//!   of truth; nothing is indexed in memory.
//! - **Eviction** ([`Sweeper`]) -- age-based garbage collection over the
//!   store, either as a one-shot pass or as a background task.
//!
//! Artifacts are immutable once created. New files are always staged under a
//! hidden name and renamed into place, so a reader never observes a partially
//! written artifact.

pub mod artifact;
pub mod store;
pub mod sweeper;

pub use artifact::Artifact;
pub use store::{ArtifactStore, DEFAULT_EXTENSION};
pub use sweeper::{Sweeper, SweeperConfig};
