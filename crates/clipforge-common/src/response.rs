//! The `{success, data | error}` envelope returned at the stage boundary.

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// Error payload of a failed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// Serializable outcome of one pipeline stage.
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": {"kind": ..., "message": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageResponse<T> {
    Success { success: Flag<true>, data: T },
    Failure { success: Flag<false>, error: ErrorBody },
}

/// A boolean that only (de)serializes as the constant `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flag<const B: bool>;

impl<const B: bool> Serialize for Flag<B> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(B)
    }
}

impl<'de, const B: bool> Deserialize<'de> for Flag<B> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = bool::deserialize(deserializer)?;
        if value == B {
            Ok(Flag)
        } else {
            Err(serde::de::Error::custom(format!("expected success = {B}")))
        }
    }
}

impl<T> StageResponse<T> {
    /// Build a success envelope.
    pub fn ok(data: T) -> Self {
        StageResponse::Success { success: Flag, data }
    }

    /// Build a failure envelope from an error.
    pub fn err(error: &Error) -> Self {
        StageResponse::Failure {
            success: Flag,
            error: ErrorBody {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }

    /// Whether this envelope reports success.
    pub fn is_success(&self) -> bool {
        matches!(self, StageResponse::Success { .. })
    }
}

impl<T> From<crate::Result<T>> for StageResponse<T> {
    fn from(result: crate::Result<T>) -> Self {
        match result {
            Ok(data) => StageResponse::ok(data),
            Err(e) => StageResponse::err(&e),
        }
    }
}
