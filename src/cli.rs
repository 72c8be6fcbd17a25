use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipforge")]
#[command(author, version, about = "Ephemeral video editing pipeline built on ffmpeg")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a video file as a new artifact
    Upload {
        /// Video file to upload
        file: PathBuf,

        /// Declared content type (guessed from the extension if omitted)
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Cut a time range out of a video
    Trim {
        /// Source video id
        video_id: String,

        /// Start of the range in seconds
        #[arg(long)]
        start: f64,

        /// End of the range in seconds
        #[arg(long)]
        end: f64,
    },

    /// Concatenate videos in the given order
    Merge {
        /// Video ids, in playback order
        #[arg(num_args = 1..)]
        video_ids: Vec<String>,
    },

    /// Burn a text caption into a video
    AddText {
        /// Source video id
        video_id: String,

        /// Caption text
        #[arg(long)]
        text: String,

        /// Horizontal position in pixels
        #[arg(long, default_value = "10", allow_negative_numbers = true)]
        x: f64,

        /// Vertical position in pixels
        #[arg(long, default_value = "10", allow_negative_numbers = true)]
        y: f64,

        /// Font size in pixels
        #[arg(long, default_value = "24")]
        font_size: f64,

        /// Font color (name or #RRGGBB)
        #[arg(long, default_value = "white")]
        color: String,

        /// Show the caption from this time (seconds)
        #[arg(long, requires = "end")]
        start: Option<f64>,

        /// Hide the caption after this time (seconds)
        #[arg(long, requires = "start")]
        end: Option<f64>,
    },

    /// Mix in or replace a video's audio track
    AddAudio {
        /// Source video id
        video_id: String,

        /// Audio file to upload and use
        #[arg(long, conflicts_with = "audio_id", required_unless_present = "audio_id")]
        audio: Option<PathBuf>,

        /// Previously uploaded audio artifact id
        #[arg(long)]
        audio_id: Option<String>,

        /// "mix" or "replace"
        #[arg(long, default_value = "mix")]
        mode: String,

        /// Gain applied to the new audio
        #[arg(long, default_value = "1.0")]
        volume: f64,
    },

    /// Print the download reference of a finished artifact
    Export {
        /// Artifact id
        output_id: String,
    },

    /// Remove expired artifacts once
    Sweep {
        /// Override the configured maximum age (seconds)
        #[arg(long)]
        max_age_secs: Option<u64>,
    },

    /// Sweep expired artifacts periodically until interrupted
    RunSweeper,

    /// Print the duration of a media file
    Probe {
        /// File to probe
        file: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
