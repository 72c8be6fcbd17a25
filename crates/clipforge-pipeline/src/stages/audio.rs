//! AddAudio: mix in or replace a video's audio track.

use std::path::Path;

use clipforge_av::{EncodeInput, EncodeJob, EncodeKind, FilterGraph};
use clipforge_common::paths::{extension_of, normalize_extension};
use clipforge_common::{Error, Result};
use clipforge_store::Artifact;
use tracing::instrument;

use crate::outcome::StageOutput;
use crate::pipeline::{format_number, PipelineConfig, OUTPUT_EXTENSION};
use crate::request::{AudioMode, AudioRequest, AudioSource};
use crate::Pipeline;

impl Pipeline {
    /// Produce a new video whose audio is the original mixed with, or
    /// replaced by, the given audio.
    ///
    /// Uploaded audio bytes become an artifact of their own before the
    /// encoder runs and are swept like any other artifact.
    #[instrument(skip_all, fields(stage = "add_audio", video_id = %req.video_id, mode = %req.mode))]
    pub async fn add_audio(&self, req: AudioRequest) -> Result<StageOutput> {
        self.before_request().await;
        let source = validate(&req)?;

        let video = self.resolve("video", &req.video_id).await?;
        let audio = self.audio_artifact(source.clone()).await?;

        let staging = self.staging().await?;
        let dest = staging.path().join(format!("soundtrack{OUTPUT_EXTENSION}"));
        let job = build_job(&req, &video.path, &audio.path, &dest, &self.config);

        self.encode(staging, job).await
    }

    async fn audio_artifact(&self, source: AudioSource) -> Result<Artifact> {
        match source {
            AudioSource::Existing { id } => self.resolve("audio", &id).await,
            AudioSource::Upload { bytes, file_name } => {
                let hint = file_name.as_deref().and_then(extension_of).unwrap_or_default();
                let extension = normalize_extension(&hint, &self.config.default_audio_extension);
                let artifact = self.store_bytes(bytes, extension).await?;
                tracing::debug!(artifact = %artifact.id, "audio upload stored");
                Ok(artifact)
            }
        }
    }
}

fn validate(req: &AudioRequest) -> Result<&AudioSource> {
    if req.video_id.trim().is_empty() {
        return Err(Error::validation("videoId is required"));
    }
    if !req.volume.is_finite() || req.volume <= 0.0 {
        return Err(Error::validation("volume must be a positive number"));
    }
    match &req.audio {
        None => Err(Error::validation("No audio provided")),
        Some(AudioSource::Upload { bytes, .. }) if bytes.is_empty() => {
            Err(Error::validation("Uploaded audio is empty"))
        }
        Some(AudioSource::Existing { id }) if id.trim().is_empty() => {
            Err(Error::validation("audio id must not be empty"))
        }
        Some(source) => Ok(source),
    }
}

fn build_job(
    req: &AudioRequest,
    video: &Path,
    audio: &Path,
    dest: &Path,
    config: &PipelineConfig,
) -> EncodeJob {
    let builder = EncodeJob::builder(EncodeKind::AudioMix, dest)
        .input(EncodeInput::new(video))
        .input(EncodeInput::new(audio));

    let builder = match req.mode {
        AudioMode::Replace => {
            let builder = if req.volume != 1.0 {
                builder.filter(FilterGraph::Audio(format!(
                    "volume={}",
                    format_number(req.volume)
                )))
            } else {
                builder
            };
            builder.output_options(["-map", "0:v", "-map", "1:a"])
        }
        AudioMode::Mix => builder
            .filter(FilterGraph::Complex(format!(
                "[1:a]volume={}[a1];[0:a][a1]amix=inputs=2:duration={}:dropout_transition=2[aout]",
                format_number(req.volume),
                config.mix_duration,
            )))
            .output_options(["-map", "0:v", "-map", "[aout]"]),
    };

    builder
        .output_options(config.codecs.options())
        .output_options(["-shortest"])
        .build()
}
