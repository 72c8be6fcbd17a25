//! Successful stage results.

use std::path::PathBuf;

use clipforge_common::ArtifactId;
use serde::{Deserialize, Serialize};

/// Result of a stage that produced a new artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOutput {
    pub new_artifact_id: ArtifactId,
    /// Where a client can fetch the artifact (`<public prefix>/<filename>`).
    pub download_reference: String,
}

/// Result of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutput {
    #[serde(flatten)]
    pub artifact: StageOutput,
    pub original_name: Option<String>,
    pub size: u64,
}

/// Result of an export: a reference to an existing artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutput {
    pub artifact_id: ArtifactId,
    pub download_reference: String,
    /// Local path of the artifact, for transports that stream the file.
    pub path: PathBuf,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upload_output_flattens_artifact_fields() {
        let id = ArtifactId::new();
        let out = UploadOutput {
            artifact: StageOutput {
                new_artifact_id: id,
                download_reference: format!("/temp/{id}.mp4"),
            },
            original_name: Some("clip.mp4".into()),
            size: 42,
        };
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(
            value,
            json!({
                "newArtifactId": id.to_string(),
                "downloadReference": format!("/temp/{id}.mp4"),
                "originalName": "clip.mp4",
                "size": 42
            })
        );
    }
}
