//! The [`Pipeline`] context shared by all stage handlers.

use std::path::PathBuf;
use std::sync::Arc;

use clipforge_av::{EncodeJob, EncoderRunner, OutputCodecs};
use clipforge_common::paths::DEFAULT_VIDEO_TYPES;
use clipforge_common::{Error, Result};
use clipforge_store::{Artifact, ArtifactStore, Sweeper};
use tempfile::TempDir;

use crate::outcome::StageOutput;
use crate::request::MixDuration;

/// Extension of every encoded output.
pub(crate) const OUTPUT_EXTENSION: &str = ".mp4";

/// Stage behaviour knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Prefix of download references, e.g. `/temp`.
    pub public_prefix: String,
    pub codecs: OutputCodecs,
    pub mix_duration: MixDuration,
    /// Content types accepted by Upload.
    pub allowed_video_types: Vec<String>,
    pub default_video_extension: String,
    pub default_audio_extension: String,
    /// Font file for text overlays; the encoder's default font when unset.
    pub font_file: Option<PathBuf>,
    /// Run a sweep pass before every request.
    pub sweep_on_request: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            public_prefix: "/temp".into(),
            codecs: OutputCodecs::default(),
            mix_duration: MixDuration::default(),
            allowed_video_types: DEFAULT_VIDEO_TYPES.iter().map(|s| s.to_string()).collect(),
            default_video_extension: ".mp4".into(),
            default_audio_extension: ".mp3".into(),
            font_file: None,
            sweep_on_request: false,
        }
    }
}

/// Handle to the stage handlers.
///
/// Cheap to clone; clones share the store, the encoder permit pool and the
/// sweeper. Handlers may run concurrently.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub(crate) store: ArtifactStore,
    pub(crate) runner: EncoderRunner,
    pub(crate) sweeper: Sweeper,
    pub(crate) config: Arc<PipelineConfig>,
}

impl Pipeline {
    pub fn new(
        store: ArtifactStore,
        runner: EncoderRunner,
        sweeper: Sweeper,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            runner,
            sweeper,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn sweeper(&self) -> &Sweeper {
        &self.sweeper
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Download reference for `artifact`.
    pub fn download_reference(&self, artifact: &Artifact) -> String {
        format!(
            "{}/{}",
            self.config.public_prefix.trim_end_matches('/'),
            artifact.filename()
        )
    }

    pub(crate) fn stage_output(&self, artifact: &Artifact) -> StageOutput {
        StageOutput {
            new_artifact_id: artifact.id,
            download_reference: self.download_reference(artifact),
        }
    }

    /// Opportunistic sweep ahead of a request, when enabled.
    pub(crate) async fn before_request(&self) {
        if self.config.sweep_on_request {
            let removed = self.sweeper.sweep_now().await;
            if removed > 0 {
                tracing::debug!(removed, "swept expired artifacts before request");
            }
        }
    }

    /// Resolve `id`, reporting a miss as `entity` not found.
    pub(crate) async fn resolve(&self, entity: &str, id: &str) -> Result<Artifact> {
        let store = self.store.clone();
        let lookup = id.to_string();
        match blocking(move || store.resolve_by_id(&lookup)).await {
            Err(Error::NotFound { .. }) => Err(Error::not_found(entity, id)),
            other => other,
        }
    }

    pub(crate) async fn staging(&self) -> Result<TempDir> {
        let store = self.store.clone();
        blocking(move || store.staging_dir()).await
    }

    pub(crate) async fn store_bytes(&self, bytes: Vec<u8>, extension: String) -> Result<Artifact> {
        let store = self.store.clone();
        blocking(move || store.create(&bytes, &extension)).await
    }

    /// Run `job` and register its destination as a new artifact.
    ///
    /// `staging` holds the job's scratch files and is removed once the
    /// output has been moved into the store, or when encoding fails.
    pub(crate) async fn encode(&self, staging: TempDir, job: EncodeJob) -> Result<StageOutput> {
        self.runner.run(&job).await?;

        let store = self.store.clone();
        let produced = job.destination().to_path_buf();
        let artifact = blocking(move || store.ingest(&produced, OUTPUT_EXTENSION)).await?;
        drop(staging);

        tracing::info!(
            kind = %job.kind(),
            artifact = %artifact.id,
            "stage output registered"
        );
        Ok(self.stage_output(&artifact))
    }
}

/// Run blocking filesystem work off the async executor.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {e}")))?
}

/// Render a number for an encoder argument (`2` rather than `2.0`).
pub(crate) fn format_number(value: f64) -> String {
    format!("{value}")
}
