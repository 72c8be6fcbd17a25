//! Trim: cut a time range out of a video.

use std::path::Path;

use clipforge_av::{EncodeInput, EncodeJob, EncodeKind, OutputCodecs};
use clipforge_common::{Error, Result};
use tracing::instrument;

use crate::outcome::StageOutput;
use crate::pipeline::{format_number, OUTPUT_EXTENSION};
use crate::request::TrimRequest;
use crate::Pipeline;

impl Pipeline {
    /// Produce a new video holding `[start_time, end_time)` of the source.
    #[instrument(skip_all, fields(stage = "trim", video_id = %req.video_id))]
    pub async fn trim(&self, req: TrimRequest) -> Result<StageOutput> {
        self.before_request().await;
        validate(&req)?;

        let source = self.resolve("video", &req.video_id).await?;
        let staging = self.staging().await?;
        let dest = staging.path().join(format!("trimmed{OUTPUT_EXTENSION}"));
        let job = build_job(&req, &source.path, &dest, &self.config.codecs);

        self.encode(staging, job).await
    }
}

fn validate(req: &TrimRequest) -> Result<()> {
    if req.video_id.trim().is_empty() {
        return Err(Error::validation("videoId is required"));
    }
    if !req.start_time.is_finite() || req.start_time < 0.0 {
        return Err(Error::validation("startTime must be a non-negative number"));
    }
    if !req.end_time.is_finite() || req.end_time <= req.start_time {
        return Err(Error::validation("endTime must be greater than startTime"));
    }
    Ok(())
}

/// `-ss` as an input option seeks before decoding; `-t` bounds the output.
fn build_job(req: &TrimRequest, source: &Path, dest: &Path, codecs: &OutputCodecs) -> EncodeJob {
    EncodeJob::builder(EncodeKind::Trim, dest)
        .input(EncodeInput::new(source).with_options(["-ss".to_string(), format_number(req.start_time)]))
        .output_options(["-t".to_string(), format_number(req.end_time - req.start_time)])
        .output_options(codecs.options())
        .build()
}
