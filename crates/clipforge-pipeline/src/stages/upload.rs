//! Upload: store client bytes as a new video artifact.

use clipforge_common::paths::{extension_of, normalize_extension};
use clipforge_common::{Error, Result};
use tracing::instrument;

use crate::outcome::UploadOutput;
use crate::pipeline::PipelineConfig;
use crate::request::UploadRequest;
use crate::Pipeline;

impl Pipeline {
    /// Store an uploaded video.
    #[instrument(skip_all, fields(stage = "upload", size = req.bytes.len()))]
    pub async fn upload(&self, req: UploadRequest) -> Result<UploadOutput> {
        self.before_request().await;
        validate(&self.config, &req)?;

        let hint = req.file_name.as_deref().and_then(extension_of).unwrap_or_default();
        let extension = normalize_extension(&hint, &self.config.default_video_extension);
        let size = req.bytes.len() as u64;
        let artifact = self.store_bytes(req.bytes, extension).await?;

        tracing::info!(artifact = %artifact.id, size, "video uploaded");
        Ok(UploadOutput {
            artifact: self.stage_output(&artifact),
            original_name: req.file_name,
            size,
        })
    }
}

fn validate(config: &PipelineConfig, req: &UploadRequest) -> Result<()> {
    if req.bytes.is_empty() {
        return Err(Error::validation("No video file provided"));
    }

    let essence = req
        .content_type
        .as_deref()
        .and_then(|t| t.split(';').next())
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_default();
    if !essence.starts_with("video/") {
        return Err(Error::validation("Invalid file type. Please upload a video file"));
    }
    if !config
        .allowed_video_types
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&essence))
    {
        return Err(Error::validation(format!(
            "Unsupported video type '{essence}'. Allowed: {}",
            config.allowed_video_types.join(", ")
        )));
    }
    Ok(())
}
