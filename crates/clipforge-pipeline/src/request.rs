//! Stage request types.
//!
//! Field names follow the JSON contract of the front end (`videoId`,
//! `startTime`, ...). Numeric and textual constraints are not enforced at
//! deserialization; each stage validates its request before touching the
//! store so that every rejection is reported as a validation error.

use std::fmt;
use std::str::FromStr;

use clipforge_common::Error;
use serde::{Deserialize, Serialize};

/// An uploaded video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    /// Client-side filename, used for the extension and echoed back.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Declared MIME type.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Cut `[start_time, end_time)` seconds out of a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimRequest {
    pub video_id: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Concatenate videos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    #[serde(default)]
    pub video_ids: Vec<String>,
    /// Explicit ordering; when non-empty it replaces `video_ids`.
    #[serde(default)]
    pub order: Option<Vec<String>>,
}

impl MergeRequest {
    /// The ids in the order they will be concatenated.
    pub fn ordered_ids(&self) -> &[String] {
        match &self.order {
            Some(order) if !order.is_empty() => order,
            _ => &self.video_ids,
        }
    }
}

/// Burn a text caption into a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlayRequest {
    pub video_id: String,
    pub text: String,
    /// Horizontal position in pixels from the left edge.
    pub x: f64,
    /// Vertical position in pixels from the top edge.
    pub y: f64,
    pub font_size: f64,
    pub color: String,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
}

/// Where the audio for [`AudioRequest`] comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "source")]
pub enum AudioSource {
    /// Fresh bytes, stored as their own artifact before use.
    Upload {
        bytes: Vec<u8>,
        #[serde(default, rename = "fileName")]
        file_name: Option<String>,
    },
    /// An audio artifact uploaded earlier.
    Existing { id: String },
}

/// How new audio combines with the video's own track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    /// Blend both tracks.
    #[default]
    Mix,
    /// Drop the original track.
    Replace,
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mix => write!(f, "mix"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for AudioMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mix" => Ok(Self::Mix),
            "replace" => Ok(Self::Replace),
            other => Err(Error::validation(format!(
                "Invalid mode '{other}'. Use 'mix' or 'replace'"
            ))),
        }
    }
}

/// Length of a mixed track relative to its two inputs (the amix `duration`
/// option).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixDuration {
    #[default]
    Shortest,
    First,
    Longest,
}

impl fmt::Display for MixDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shortest => write!(f, "shortest"),
            Self::First => write!(f, "first"),
            Self::Longest => write!(f, "longest"),
        }
    }
}

fn default_volume() -> f64 {
    1.0
}

/// Add or replace a video's audio track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioRequest {
    pub video_id: String,
    #[serde(default)]
    pub audio: Option<AudioSource>,
    #[serde(default)]
    pub mode: AudioMode,
    /// Gain applied to the new audio; 1.0 leaves it unchanged.
    #[serde(default = "default_volume")]
    pub volume: f64,
}

/// Look up a finished artifact for download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub output_id: String,
}
