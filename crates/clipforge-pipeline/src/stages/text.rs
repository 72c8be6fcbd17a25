//! AddText: burn a caption into a video with `drawtext`.

use std::path::Path;

use clipforge_av::{
    escape_drawtext_text, quote_option_value, EncodeInput, EncodeJob, EncodeKind, FilterGraph,
};
use clipforge_common::{Error, Result};
use tracing::instrument;

use crate::outcome::StageOutput;
use crate::pipeline::{format_number, PipelineConfig, OUTPUT_EXTENSION};
use crate::request::TextOverlayRequest;
use crate::Pipeline;

impl Pipeline {
    /// Produce a new video with `text` drawn at `(x, y)`.
    #[instrument(skip_all, fields(stage = "add_text", video_id = %req.video_id))]
    pub async fn add_text(&self, req: TextOverlayRequest) -> Result<StageOutput> {
        self.before_request().await;
        validate(&req)?;

        let source = self.resolve("video", &req.video_id).await?;
        let staging = self.staging().await?;
        let dest = staging.path().join(format!("captioned{OUTPUT_EXTENSION}"));
        let job = build_job(&req, &source.path, &dest, &self.config);

        self.encode(staging, job).await
    }
}

fn validate(req: &TextOverlayRequest) -> Result<()> {
    if req.video_id.trim().is_empty() {
        return Err(Error::validation("videoId is required"));
    }
    if req.text.trim().is_empty() {
        return Err(Error::validation("text is required"));
    }
    if !req.x.is_finite() || !req.y.is_finite() {
        return Err(Error::validation("x and y must be numbers"));
    }
    if !req.font_size.is_finite() || req.font_size <= 0.0 {
        return Err(Error::validation("fontSize must be a positive number"));
    }
    if !is_valid_color(&req.color) {
        return Err(Error::validation(format!("invalid color '{}'", req.color)));
    }

    match (req.start_time, req.end_time) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) => {
            if !start.is_finite() || start < 0.0 || !end.is_finite() || end <= start {
                Err(Error::validation("endTime must be greater than startTime"))
            } else {
                Ok(())
            }
        }
        _ => Err(Error::validation("startTime and endTime must be given together")),
    }
}

/// Color names (`white`), hex (`#ffcc00`, `0xffcc00`) and an optional
/// `@alpha` suffix. Nothing that could end the option or the filter.
fn is_valid_color(color: &str) -> bool {
    !color.is_empty()
        && color
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '@' | '.' | '_'))
}

fn drawtext(req: &TextOverlayRequest, font_file: Option<&Path>) -> String {
    let mut filter = String::from("drawtext=");
    if let Some(font) = font_file {
        filter.push_str(&format!(
            "fontfile={}:",
            quote_option_value(&font.to_string_lossy())
        ));
    }
    filter.push_str(&format!(
        "text={}:x={}:y={}:fontsize={}:fontcolor={}",
        escape_drawtext_text(&req.text),
        format_number(req.x),
        format_number(req.y),
        format_number(req.font_size),
        req.color,
    ));
    if let (Some(start), Some(end)) = (req.start_time, req.end_time) {
        filter.push_str(&format!(
            ":enable='between(t,{},{})'",
            format_number(start),
            format_number(end)
        ));
    }
    filter
}

fn build_job(
    req: &TextOverlayRequest,
    source: &Path,
    dest: &Path,
    config: &PipelineConfig,
) -> EncodeJob {
    EncodeJob::builder(EncodeKind::TextOverlay, dest)
        .input(EncodeInput::new(source))
        .filter(FilterGraph::Video(drawtext(req, config.font_file.as_deref())))
        .output_options(config.codecs.options())
        .build()
}
