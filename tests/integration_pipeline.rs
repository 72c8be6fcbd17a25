//! Pipeline integration tests against a real ffmpeg.
//!
//! Every test returns early when ffmpeg or ffprobe are not installed.

use clipforge::app::App;
use clipforge::config::Config;
use clipforge_av::probe_duration;
use clipforge_common::ArtifactId;
use clipforge_pipeline::{
    AudioMode, AudioRequest, AudioSource, ExportRequest, MergeRequest, TextOverlayRequest,
    TrimRequest, UploadRequest,
};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

fn tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        Command::new(tool)
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}

fn has_filter(name: &str) -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-filters"])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains(name))
        .unwrap_or(false)
}

/// Render a test-pattern clip with a sine tone.
fn make_clip(dir: &Path, name: &str, seconds: u32) -> PathBuf {
    let path = dir.join(name);
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-v", "error", "-y"])
        .args(["-f", "lavfi", "-i"])
        .arg(format!("testsrc=duration={seconds}:size=320x240:rate=25"))
        .args(["-f", "lavfi", "-i"])
        .arg(format!("sine=frequency=440:duration={seconds}"))
        .args(["-shortest", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac"])
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success(), "failed to render fixture {name}");
    path
}

fn make_tone(dir: &Path, seconds: u32) -> Vec<u8> {
    let path = dir.join("tone.wav");
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-v", "error", "-y", "-f", "lavfi", "-i"])
        .arg(format!("sine=frequency=880:duration={seconds}"))
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success());
    std::fs::read(path).unwrap()
}

struct Harness {
    dir: TempDir,
    app: App,
}

impl Harness {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.store.dir = dir.path().join("store");
        let app = App::build(config).unwrap();
        Self { dir, app }
    }

    async fn upload(&self, path: &Path) -> ArtifactId {
        let out = self
            .app
            .pipeline
            .upload(UploadRequest {
                bytes: std::fs::read(path).unwrap(),
                file_name: path.file_name().map(|n| n.to_string_lossy().to_string()),
                content_type: Some("video/mp4".into()),
            })
            .await
            .unwrap();
        out.artifact.new_artifact_id
    }

    async fn duration(&self, id: ArtifactId) -> f64 {
        let export = self
            .app
            .pipeline
            .export(ExportRequest {
                output_id: id.to_string(),
            })
            .await
            .unwrap();
        probe_duration(&self.app.ffprobe(), &export.path).await.unwrap()
    }
}

#[tokio::test]
async fn test_trim_produces_requested_length() {
    if !tools_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }
    let h = Harness::new();
    let clip = make_clip(h.dir.path(), "five.mp4", 5);
    let source = h.upload(&clip).await;

    let out = h
        .app
        .pipeline
        .trim(TrimRequest {
            video_id: source.to_string(),
            start_time: 1.0,
            end_time: 3.0,
        })
        .await
        .unwrap();

    let duration = h.duration(out.new_artifact_id).await;
    assert!((duration - 2.0).abs() < 0.25, "got {duration}s");
    assert!((h.duration(source).await - 5.0).abs() < 0.25);
}

#[tokio::test]
async fn test_merge_sums_durations() {
    if !tools_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }
    let h = Harness::new();
    let a = h.upload(&make_clip(h.dir.path(), "two.mp4", 2)).await;
    let b = h.upload(&make_clip(h.dir.path(), "three.mp4", 3)).await;

    let out = h
        .app
        .pipeline
        .merge(MergeRequest {
            video_ids: vec![a.to_string(), b.to_string()],
            order: None,
        })
        .await
        .unwrap();

    let duration = h.duration(out.new_artifact_id).await;
    assert!((duration - 5.0).abs() < 0.4, "got {duration}s");
}

#[tokio::test]
async fn test_text_overlay_keeps_duration() {
    if !tools_available() || !has_filter("drawtext") {
        eprintln!("ffmpeg with drawtext not installed, skipping");
        return;
    }
    let h = Harness::new();
    let source = h.upload(&make_clip(h.dir.path(), "clip.mp4", 3)).await;

    let out = h
        .app
        .pipeline
        .add_text(TextOverlayRequest {
            video_id: source.to_string(),
            text: "Hello".into(),
            x: 10.0,
            y: 10.0,
            font_size: 24.0,
            color: "white".into(),
            start_time: None,
            end_time: None,
        })
        .await
        .unwrap();

    let duration = h.duration(out.new_artifact_id).await;
    assert!((duration - 3.0).abs() < 0.25, "got {duration}s");
}

#[tokio::test]
async fn test_text_overlay_with_special_characters() {
    if !tools_available() || !has_filter("drawtext") {
        eprintln!("ffmpeg with drawtext not installed, skipping");
        return;
    }
    let h = Harness::new();
    let source = h.upload(&make_clip(h.dir.path(), "clip.mp4", 3)).await;

    for text in [r"C:\it's", "12:30, 50% [done]; x',negate,drawtext=text='y"] {
        let out = h
            .app
            .pipeline
            .add_text(TextOverlayRequest {
                video_id: source.to_string(),
                text: text.into(),
                x: 10.0,
                y: 10.0,
                font_size: 24.0,
                color: "white".into(),
                start_time: Some(0.5),
                end_time: Some(2.0),
            })
            .await
            .unwrap_or_else(|e| panic!("overlay of {text:?} failed: {e}"));

        let duration = h.duration(out.new_artifact_id).await;
        assert!((duration - 3.0).abs() < 0.25, "got {duration}s for {text:?}");
    }
}

#[tokio::test]
async fn test_audio_replace_and_mix() {
    if !tools_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }
    let h = Harness::new();
    let video = h.upload(&make_clip(h.dir.path(), "clip.mp4", 3)).await;
    let tone = make_tone(h.dir.path(), 5);

    let replaced = h
        .app
        .pipeline
        .add_audio(AudioRequest {
            video_id: video.to_string(),
            audio: Some(AudioSource::Upload {
                bytes: tone,
                file_name: Some("tone.wav".into()),
            }),
            mode: AudioMode::Replace,
            volume: 0.5,
        })
        .await
        .unwrap();
    let duration = h.duration(replaced.new_artifact_id).await;
    assert!((duration - 3.0).abs() < 0.3, "got {duration}s");

    let mixed = h
        .app
        .pipeline
        .add_audio(AudioRequest {
            video_id: video.to_string(),
            audio: Some(AudioSource::Existing {
                id: replaced.new_artifact_id.to_string(),
            }),
            mode: AudioMode::Mix,
            volume: 1.0,
        })
        .await
        .unwrap();
    let duration = h.duration(mixed.new_artifact_id).await;
    assert!((duration - 3.0).abs() < 0.3, "got {duration}s");
}

#[tokio::test]
async fn test_concurrent_trims_leave_source_intact() {
    if !tools_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }
    let h = Harness::new();
    let clip = make_clip(h.dir.path(), "five.mp4", 5);
    let source = h.upload(&clip).await;
    let before = std::fs::read(&clip).unwrap();

    let trim = |start: f64, end: f64| {
        h.app.pipeline.trim(TrimRequest {
            video_id: source.to_string(),
            start_time: start,
            end_time: end,
        })
    };
    let (a, b) = futures::join!(trim(0.0, 2.0), trim(2.0, 4.0));
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.new_artifact_id, b.new_artifact_id);

    let stored = h
        .app
        .pipeline
        .export(ExportRequest {
            output_id: source.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(std::fs::read(stored.path).unwrap(), before);
}
