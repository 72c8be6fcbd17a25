//! Execution of [`EncodeJob`]s behind a bounded admission gate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clipforge_common::{Error, Result};
use tokio::sync::Semaphore;

use crate::command::{ToolCommand, DEFAULT_TIMEOUT};
use crate::job::EncodeJob;

/// Construction parameters for an [`EncoderRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Location of the ffmpeg executable.
    pub ffmpeg: PathBuf,
    /// Per-invocation wall-clock limit.
    pub timeout: Duration,
    /// Maximum number of encoder processes running at once.
    pub max_concurrent: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            timeout: DEFAULT_TIMEOUT,
            max_concurrent: default_concurrency(),
        }
    }
}

/// Number of CPUs, or 2 if it cannot be determined.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}

/// Runs encoder invocations.
///
/// At most `max_concurrent` subprocesses run at once; further callers wait
/// for a permit. Cloning shares the same permit pool.
#[derive(Debug, Clone)]
pub struct EncoderRunner {
    ffmpeg: PathBuf,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl EncoderRunner {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg,
            timeout: config.timeout,
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        }
    }

    /// Permits currently free.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `job` to completion.
    ///
    /// Returns `Ok(())` only when the encoder exited successfully and left a
    /// non-empty file at the job's destination. Anything else is an
    /// [`Error::Encoder`] carrying the tool's diagnostics. Dropping the
    /// returned future kills the subprocess.
    pub async fn run(&self, job: &EncodeJob) -> Result<()> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::internal("encoder pool closed"))?;

        let kind = job.kind();
        tracing::info!(%kind, inputs = job.inputs().len(), "encoder started");
        tracing::debug!(%kind, args = ?job.to_args(), "encoder invocation");
        let started = Instant::now();

        ToolCommand::new(self.ffmpeg.clone())
            .args(job.to_args())
            .timeout(self.timeout)
            .execute()
            .await
            .inspect_err(|e| tracing::warn!(%kind, error = %e, "encoder failed"))?;

        let produced = tokio::fs::metadata(job.destination())
            .await
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);
        if !produced {
            tracing::warn!(%kind, "encoder exited cleanly but produced no output");
            return Err(Error::encoder(
                tool_name(&self.ffmpeg),
                format!("no output written to {}", job.destination().display()),
            ));
        }

        tracing::info!(
            %kind,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "encoder finished"
        );
        Ok(())
    }
}

fn tool_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{EncodeInput, EncodeKind};
    use assert_matches::assert_matches;

    #[cfg(unix)]
    fn script(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn job(dest: PathBuf) -> EncodeJob {
        EncodeJob::builder(EncodeKind::Trim, dest)
            .input(EncodeInput::new("/in.mp4"))
            .build()
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let runner = EncoderRunner::new(EncoderConfig {
            max_concurrent: 0,
            ..EncoderConfig::default()
        });
        assert_eq!(runner.available_permits(), 1);
    }

    #[tokio::test]
    async fn missing_encoder_is_encoder_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = EncoderRunner::new(EncoderConfig {
            ffmpeg: PathBuf::from("nonexistent_ffmpeg_xyz"),
            ..EncoderConfig::default()
        });
        let result = runner.run(&job(dir.path().join("out.mp4"))).await;
        assert_matches!(result, Err(Error::Encoder { .. }));
        assert_eq!(runner.available_permits(), EncoderConfig::default().max_concurrent);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn success_requires_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let ok = script(dir.path(), "writes", r#"for last; do :; done; printf data > "$last""#);
        let silent = script(dir.path(), "silent", "exit 0");

        let runner = EncoderRunner::new(EncoderConfig {
            ffmpeg: ok,
            ..EncoderConfig::default()
        });
        let dest = dir.path().join("a.mp4");
        runner.run(&job(dest.clone())).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"data");

        let runner = EncoderRunner::new(EncoderConfig {
            ffmpeg: silent,
            ..EncoderConfig::default()
        });
        let result = runner.run(&job(dir.path().join("b.mp4"))).await;
        assert_matches!(result, Err(Error::Encoder { message, .. }) if message.contains("no output"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_passes_stderr_through() {
        let dir = tempfile::tempdir().unwrap();
        let failing = script(dir.path(), "fails", "echo 'Invalid argument' >&2; exit 1");
        let runner = EncoderRunner::new(EncoderConfig {
            ffmpeg: failing,
            ..EncoderConfig::default()
        });
        let err = runner.run(&job(dir.path().join("o.mp4"))).await.unwrap_err();
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn concurrency_is_bounded() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let dir = tempfile::tempdir().unwrap();
        let slow = script(
            dir.path(),
            "slow",
            r#"for last; do :; done; sleep 0.2; printf x > "$last""#,
        );
        let runner = EncoderRunner::new(EncoderConfig {
            ffmpeg: slow,
            timeout: Duration::from_secs(30),
            max_concurrent: 2,
        });

        let peak = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for i in 0..4 {
            let runner = runner.clone();
            let peak = peak.clone();
            let dest = dir.path().join(format!("{i}.mp4"));
            handles.push(tokio::spawn(async move {
                let job = job(dest);
                let fut = runner.run(&job);
                tokio::pin!(fut);
                loop {
                    tokio::select! {
                        r = &mut fut => break r,
                        _ = tokio::time::sleep(Duration::from_millis(20)) => {
                            let busy = 2 - runner.available_permits();
                            peak.fetch_max(busy, Ordering::SeqCst);
                        }
                    }
                }
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(runner.available_permits(), 2);
    }
}
