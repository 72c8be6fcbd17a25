//! Clipforge-Common: Shared types, identifiers, and errors.
//!
//! This crate provides common functionality used across clipforge:
//!
//! - **Typed IDs**: [`ArtifactId`], the fixed-format UUID naming every stored artifact
//! - **Error Handling**: the [`Error`] taxonomy shared by every pipeline stage
//! - **Response Envelope**: [`StageResponse`], the `{success, data | error}` shape
//!   handed to whatever transport sits in front of the pipeline
//! - **Path Utilities**: extension normalization and content-type helpers
//!
//! # Examples
//!
//! ```
//! use clipforge_common::{ArtifactId, Error, Result};
//! use clipforge_common::paths::normalize_extension;
//!
//! let id = ArtifactId::new();
//! assert_eq!(id.to_string().len(), 36);
//!
//! assert_eq!(normalize_extension("mp4", ".mp4"), ".mp4");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("video", "abc"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod response;

pub use error::{Error, ErrorKind, Result};
pub use ids::*;
pub use response::{ErrorBody, StageResponse};
