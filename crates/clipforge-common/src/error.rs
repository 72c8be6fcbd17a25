//! Unified error type for the clipforge pipeline.
//!
//! Every stage funnels its failures into [`Error`], which carries enough
//! context for a transport layer to derive a status code via
//! [`Error::http_status`] and a machine-readable [`ErrorKind`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error type covering all failure modes of the artifact pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request parameters were malformed or out of range.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced artifact does not resolve.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "audio").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The external encoder reported a failure.
    #[error("Encoder error [{tool}]: {message}")]
    Encoder {
        /// Name of the tool that failed.
        tool: String,
        /// Diagnostic message, passed through from the tool.
        message: String,
    },

    /// A filesystem operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error category, serialized into response envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Encoder,
    Io,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Encoder => "encoder",
            ErrorKind::Io => "io",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

impl Error {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Encoder { .. } => ErrorKind::Encoder,
            Error::Io { .. } => ErrorKind::Io,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound { .. } => 404,
            Error::Encoder { .. } => 502,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Encoder`].
    pub fn encoder(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Encoder {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Internal`].
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display() {
        let err = Error::validation("startTime must be >= 0");
        assert_eq!(err.to_string(), "Validation error: startTime must be >= 0");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn not_found_display() {
        let err = Error::not_found("video", "abc-123");
        assert_eq!(err.to_string(), "video not found: abc-123");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn encoder_display() {
        let err = Error::encoder("ffmpeg", "exit status 1");
        assert_eq!(err.to_string(), "Encoder error [ffmpeg]: exit status 1");
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn internal_display() {
        let err = Error::internal("ambiguous artifact id");
        assert_eq!(err.to_string(), "Internal error: ambiguous artifact id");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
