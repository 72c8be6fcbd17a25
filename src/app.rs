//! Component wiring: turns a [`Config`] into a ready [`Pipeline`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clipforge_av::{EncoderRunner, ToolRegistry};
use clipforge_pipeline::Pipeline;
use clipforge_store::{ArtifactStore, Sweeper};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;

/// Everything a command needs, built once from configuration.
pub struct App {
    pub config: Config,
    pub tools: ToolRegistry,
    pub pipeline: Pipeline,
}

impl App {
    pub fn build(config: Config) -> Result<Self> {
        let tools = ToolRegistry::discover(&config.tool_paths());

        let store = ArtifactStore::open(&config.store.dir)
            .with_context(|| format!("Failed to open artifact store at {:?}", config.store.dir))?;
        tracing::debug!("Artifact store at {:?}", store.root());

        let ffmpeg = match tools.require("ffmpeg") {
            Ok(path) => path.to_path_buf(),
            Err(e) => {
                tracing::warn!("{e}; stage commands will fail until it is available");
                PathBuf::from("ffmpeg")
            }
        };
        let runner = EncoderRunner::new(config.encoder_config(ffmpeg));
        let sweeper = Sweeper::new(store.clone(), config.sweeper_config());
        let pipeline = Pipeline::new(store, runner, sweeper, config.pipeline_config());

        Ok(Self {
            config,
            tools,
            pipeline,
        })
    }

    /// The discovered encoder binary.
    pub fn encoder(&self) -> clipforge_common::Result<&Path> {
        self.tools.require("ffmpeg")
    }

    pub fn ffprobe(&self) -> PathBuf {
        self.tools.path_or_name("ffprobe")
    }

    /// Start the periodic sweeper if it is enabled.
    pub fn start_sweeper(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.config.sweeper.enabled {
            tracing::info!("Background sweeper disabled");
            return None;
        }
        Some(self.pipeline.sweeper().clone().spawn(cancel))
    }
}
