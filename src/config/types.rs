use std::path::PathBuf;
use std::time::Duration;

use clipforge_av::{EncoderConfig, OutputCodecs, ToolPaths};
use clipforge_common::paths::DEFAULT_VIDEO_TYPES;
use clipforge_pipeline::{MixDuration, PipelineConfig};
use clipforge_store::SweeperConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub sweeper: SweeperSettings,

    #[serde(default)]
    pub encoder: EncoderSettings,

    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Directory holding every artifact (`~` is expanded)
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,

    /// Prefix of the download references handed back to clients
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            public_prefix: default_public_prefix(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    std::env::temp_dir().join("clipforge")
}

fn default_public_prefix() -> String {
    "/temp".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SweeperSettings {
    /// Run the periodic background sweep while long-running commands execute
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Artifacts at least this old are removed (default: 6 hours)
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Seconds between background sweeps (default: 10 minutes)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Also sweep before every stage request
    #[serde(default)]
    pub sweep_on_request: bool,
}

impl Default for SweeperSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_secs: default_max_age_secs(),
            interval_secs: default_interval_secs(),
            sweep_on_request: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_age_secs() -> u64 {
    6 * 60 * 60
}

fn default_interval_secs() -> u64 {
    10 * 60
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EncoderSettings {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    /// Wall-clock limit per encoder invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Concurrent encoder processes (default: number of CPUs)
    #[serde(default)]
    pub max_concurrent: Option<usize>,

    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Length of mixed audio: "shortest", "first" or "longest"
    #[serde(default)]
    pub mix_duration: MixDuration,

    /// Font used by text overlays
    #[serde(default)]
    pub font_file: Option<PathBuf>,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            timeout_secs: default_timeout_secs(),
            max_concurrent: None,
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            mix_duration: MixDuration::default(),
            font_file: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Accepted video content types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,

    /// Extension used when an uploaded video's name has none
    #[serde(default = "default_video_extension")]
    pub default_video_extension: String,

    /// Extension used when an uploaded audio file's name has none
    #[serde(default = "default_audio_extension")]
    pub default_audio_extension: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_types: default_allowed_types(),
            default_video_extension: default_video_extension(),
            default_audio_extension: default_audio_extension(),
        }
    }
}

fn default_allowed_types() -> Vec<String> {
    DEFAULT_VIDEO_TYPES.iter().map(|s| s.to_string()).collect()
}

fn default_video_extension() -> String {
    ".mp4".to_string()
}

fn default_audio_extension() -> String {
    ".mp3".to_string()
}

impl Config {
    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths {
            ffmpeg: self.encoder.ffmpeg_path.clone(),
            ffprobe: self.encoder.ffprobe_path.clone(),
        }
    }

    /// Runner settings, with `ffmpeg` being the already discovered binary.
    pub fn encoder_config(&self, ffmpeg: PathBuf) -> EncoderConfig {
        let defaults = EncoderConfig::default();
        EncoderConfig {
            ffmpeg,
            timeout: Duration::from_secs(self.encoder.timeout_secs),
            max_concurrent: self.encoder.max_concurrent.unwrap_or(defaults.max_concurrent),
        }
    }

    pub fn sweeper_config(&self) -> SweeperConfig {
        SweeperConfig {
            max_age: Duration::from_secs(self.sweeper.max_age_secs),
            interval: Duration::from_secs(self.sweeper.interval_secs),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            public_prefix: self.store.public_prefix.clone(),
            codecs: OutputCodecs {
                video: self.encoder.video_codec.clone(),
                audio: self.encoder.audio_codec.clone(),
            },
            mix_duration: self.encoder.mix_duration,
            allowed_video_types: self.upload.allowed_types.clone(),
            default_video_extension: self.upload.default_video_extension.clone(),
            default_audio_extension: self.upload.default_audio_extension.clone(),
            font_file: self.encoder.font_file.clone(),
            sweep_on_request: self.sweeper.sweep_on_request,
        }
    }
}
