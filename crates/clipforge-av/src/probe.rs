//! Media duration probing via ffprobe.

use std::path::Path;

use clipforge_common::{Error, Result};
use serde::Deserialize;

use crate::command::ToolCommand;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Return the container duration of `path` in seconds.
pub async fn probe_duration(ffprobe: &Path, path: &Path) -> Result<f64> {
    let output = ToolCommand::new(ffprobe.to_path_buf())
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
        .arg(path.to_string_lossy().as_ref())
        .execute()
        .await?;

    parse_duration(&output.stdout)
}

fn parse_duration(json: &str) -> Result<f64> {
    let parsed: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::encoder("ffprobe", format!("unparseable output: {e}")))?;

    parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| Error::encoder("ffprobe", "no duration reported"))
}
