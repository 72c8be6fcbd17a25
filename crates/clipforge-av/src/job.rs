//! Encoder invocation descriptors.
//!
//! An [`EncodeJob`] is built once per request and never mutated afterwards.
//! It fully describes one ffmpeg run; [`EncodeJob::to_args`] renders it into
//! the argument vector handed to the runner.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Which pipeline stage a job was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeKind {
    Trim,
    Merge,
    TextOverlay,
    AudioMix,
}

impl fmt::Display for EncodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EncodeKind::Trim => "trim",
            EncodeKind::Merge => "merge",
            EncodeKind::TextOverlay => "text_overlay",
            EncodeKind::AudioMix => "audio_mix",
        };
        f.write_str(s)
    }
}

/// One input file plus the options that must precede its `-i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeInput {
    pub path: PathBuf,
    pub options: Vec<String>,
}

impl EncodeInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: Vec::new(),
        }
    }

    /// Attach input options (e.g. `-ss 1.5`, `-f concat`).
    pub fn with_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }
}

/// A filter-graph expression and the flag it is passed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterGraph {
    /// Single-stream video chain (`-vf`).
    Video(String),
    /// Single-stream audio chain (`-af`).
    Audio(String),
    /// Multi-input graph with labelled pads (`-filter_complex`).
    Complex(String),
}

impl FilterGraph {
    fn flag(&self) -> &'static str {
        match self {
            FilterGraph::Video(_) => "-vf",
            FilterGraph::Audio(_) => "-af",
            FilterGraph::Complex(_) => "-filter_complex",
        }
    }

    /// The expression itself.
    pub fn expression(&self) -> &str {
        match self {
            FilterGraph::Video(s) | FilterGraph::Audio(s) | FilterGraph::Complex(s) => s,
        }
    }
}

/// Output codec selection shared by every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCodecs {
    pub video: String,
    pub audio: String,
}

impl Default for OutputCodecs {
    fn default() -> Self {
        Self {
            video: "libx264".into(),
            audio: "aac".into(),
        }
    }
}

impl OutputCodecs {
    /// `-c:v <video> -c:a <audio> -movflags +faststart`.
    pub fn options(&self) -> Vec<String> {
        vec![
            "-c:v".into(),
            self.video.clone(),
            "-c:a".into(),
            self.audio.clone(),
            "-movflags".into(),
            "+faststart".into(),
        ]
    }
}

/// A fully resolved plan for one encoder run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeJob {
    kind: EncodeKind,
    inputs: Vec<EncodeInput>,
    filter: Option<FilterGraph>,
    output_options: Vec<String>,
    destination: PathBuf,
}

impl EncodeJob {
    /// Start building a job of `kind` that writes to `destination`.
    pub fn builder(kind: EncodeKind, destination: impl Into<PathBuf>) -> EncodeJobBuilder {
        EncodeJobBuilder {
            job: EncodeJob {
                kind,
                inputs: Vec::new(),
                filter: None,
                output_options: Vec::new(),
                destination: destination.into(),
            },
        }
    }

    pub fn kind(&self) -> EncodeKind {
        self.kind
    }

    pub fn inputs(&self) -> &[EncodeInput] {
        &self.inputs
    }

    pub fn filter(&self) -> Option<&FilterGraph> {
        self.filter.as_ref()
    }

    pub fn output_options(&self) -> &[String] {
        &self.output_options
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Render the ffmpeg argument vector.
    ///
    /// Layout: global flags, then `<input options> -i <path>` per input in
    /// order, the filter graph, output options, and finally the destination.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-nostdin", "-v", "error", "-y"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".into());
            args.push(input.path.to_string_lossy().to_string());
        }

        if let Some(filter) = &self.filter {
            args.push(filter.flag().into());
            args.push(filter.expression().to_string());
        }

        args.extend(self.output_options.iter().cloned());
        args.push(self.destination.to_string_lossy().to_string());
        args
    }
}

/// Builder for [`EncodeJob`]; consumed by [`EncodeJobBuilder::build`].
#[derive(Debug)]
pub struct EncodeJobBuilder {
    job: EncodeJob,
}

impl EncodeJobBuilder {
    pub fn input(mut self, input: EncodeInput) -> Self {
        self.job.inputs.push(input);
        self
    }

    pub fn filter(mut self, filter: FilterGraph) -> Self {
        self.job.filter = Some(filter);
        self
    }

    pub fn output_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.job
            .output_options
            .extend(options.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> EncodeJob {
        self.job
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(args: &[String], needle: &str) -> usize {
        args.iter()
            .position(|a| a == needle)
            .unwrap_or_else(|| panic!("{needle} not in {args:?}"))
    }

    #[test]
    fn trim_layout() {
        let job = EncodeJob::builder(EncodeKind::Trim, "/stage/out.mp4")
            .input(EncodeInput::new("/store/in.mp4").with_options(["-ss", "1"]))
            .output_options(["-t", "2"])
            .output_options(OutputCodecs::default().options())
            .build();

        let args = job.to_args();
        assert_eq!(args.last().unwrap(), "/stage/out.mp4");
        assert!(position(&args, "-ss") < position(&args, "-i"));
        assert_eq!(args[position(&args, "-i") + 1], "/store/in.mp4");
        assert!(position(&args, "-t") > position(&args, "-i"));
        assert_eq!(args[position(&args, "-c:v") + 1], "libx264");
        assert_eq!(args[position(&args, "-c:a") + 1], "aac");
        assert!(args.contains(&"-y".to_string()));
    }

    #[test]
    fn inputs_keep_order() {
        let job = EncodeJob::builder(EncodeKind::AudioMix, "/o.mp4")
            .input(EncodeInput::new("/video.mp4"))
            .input(EncodeInput::new("/audio.mp3"))
            .build();
        let args = job.to_args();
        let inputs: Vec<&String> = args
            .iter()
            .enumerate()
            .filter(|(i, _)| *i > 0 && args[i - 1] == "-i")
            .map(|(_, a)| a)
            .collect();
        assert_eq!(inputs, ["/video.mp4", "/audio.mp3"]);
    }

    #[test]
    fn filter_flags() {
        for (filter, flag) in [
            (FilterGraph::Video("drawtext=text='a'".into()), "-vf"),
            (FilterGraph::Audio("volume=0.5".into()), "-af"),
            (FilterGraph::Complex("[0:a][1:a]amix[aout]".into()), "-filter_complex"),
        ] {
            let expr = filter.expression().to_string();
            let job = EncodeJob::builder(EncodeKind::TextOverlay, "/o.mp4")
                .input(EncodeInput::new("/i.mp4"))
                .filter(filter)
                .build();
            let args = job.to_args();
            assert_eq!(args[position(&args, flag) + 1], expr);
        }
    }

    #[test]
    fn filter_is_a_single_argument() {
        let job = EncodeJob::builder(EncodeKind::TextOverlay, "/o.mp4")
            .input(EncodeInput::new("/i.mp4"))
            .filter(FilterGraph::Video("drawtext=text='a b c'".into()))
            .build();
        assert!(job.to_args().contains(&"drawtext=text='a b c'".to_string()));
    }

    #[test]
    fn accessors() {
        let job = EncodeJob::builder(EncodeKind::Merge, "/o.mp4")
            .input(EncodeInput::new("/list.txt").with_options(["-f", "concat", "-safe", "0"]))
            .build();
        assert_eq!(job.kind(), EncodeKind::Merge);
        assert_eq!(job.inputs().len(), 1);
        assert_eq!(job.inputs()[0].options, ["-f", "concat", "-safe", "0"]);
        assert!(job.filter().is_none());
        assert!(job.output_options().is_empty());
        assert_eq!(job.destination(), Path::new("/o.mp4"));
    }

    #[test]
    fn kind_display() {
        assert_eq!(EncodeKind::TextOverlay.to_string(), "text_overlay");
        assert_eq!(EncodeKind::AudioMix.to_string(), "audio_mix");
    }
}
