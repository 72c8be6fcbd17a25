mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    parse_config(&content).with_context(|| format!("Invalid config file: {:?}", path))
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content).context("Failed to parse config")?;

    config.store.dir = expand_path(&config.store.dir);
    if let Some(font) = &config.encoder.font_file {
        config.encoder.font_file = Some(expand_path(font));
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./clipforge.toml",
        "~/.config/clipforge/config.toml",
        "/etc/clipforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Validate configuration.
///
/// Fatal problems are returned as errors; questionable but workable settings
/// are logged as warnings.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.sweeper.max_age_secs == 0 {
        anyhow::bail!("sweeper.max_age_secs cannot be 0");
    }
    if config.sweeper.interval_secs == 0 {
        anyhow::bail!("sweeper.interval_secs cannot be 0");
    }

    if config.encoder.timeout_secs == 0 {
        anyhow::bail!("encoder.timeout_secs cannot be 0");
    }
    if config.encoder.max_concurrent == Some(0) {
        anyhow::bail!("encoder.max_concurrent cannot be 0");
    }
    if config.encoder.video_codec.trim().is_empty() || config.encoder.audio_codec.trim().is_empty()
    {
        anyhow::bail!("encoder codecs cannot be empty");
    }

    if config.upload.allowed_types.is_empty() {
        anyhow::bail!("upload.allowed_types cannot be empty");
    }
    for content_type in &config.upload.allowed_types {
        if !content_type.to_ascii_lowercase().starts_with("video/") {
            anyhow::bail!("upload.allowed_types entry '{}' is not a video type", content_type);
        }
    }
    for (key, ext) in [
        ("default_video_extension", &config.upload.default_video_extension),
        ("default_audio_extension", &config.upload.default_audio_extension),
    ] {
        let bare = ext.trim_start_matches('.');
        if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!("upload.{} '{}' is not a plain file extension", key, ext);
        }
    }

    if config.sweeper.max_age_secs <= config.encoder.timeout_secs {
        tracing::warn!(
            "sweeper.max_age_secs ({}) does not exceed encoder.timeout_secs ({}); inputs may expire while a job runs",
            config.sweeper.max_age_secs,
            config.encoder.timeout_secs
        );
    }
    if !config.sweeper.enabled && !config.sweeper.sweep_on_request {
        tracing::warn!("Both background and per-request sweeping are disabled; artifacts are never removed");
    }
    if let Some(font) = &config.encoder.font_file {
        if !font.exists() {
            tracing::warn!("Font file does not exist: {:?}", font);
        }
    }

    Ok(())
}
