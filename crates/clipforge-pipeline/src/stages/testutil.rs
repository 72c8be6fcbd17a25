//! Pipeline fixture backed by a shell script standing in for ffmpeg.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clipforge_av::{EncoderConfig, EncoderRunner};
use clipforge_store::{Artifact, ArtifactStore, Sweeper, SweeperConfig};
use tempfile::TempDir;

use crate::{Pipeline, PipelineConfig};

/// Records its arguments (and any concat list it is given) under `{log}`,
/// then writes to the last argument like a real encoder would.
pub(crate) const RECORDING_ENCODER: &str = r#"
printf '%s\n' "$@" > "{log}/args.txt"
for a; do
  case "$a" in *.txt) cat "$a" > "{log}/list.txt" ;; esac
  last="$a"
done
printf 'encoded' > "$last"
"#;

pub(crate) const FAILING_ENCODER: &str = "echo 'Invalid data found when processing input' >&2; exit 1";

pub(crate) struct Fixture {
    pub dir: TempDir,
    pub pipeline: Pipeline,
}

impl Fixture {
    fn log_dir(&self) -> PathBuf {
        self.dir.path().join("log")
    }

    /// Arguments of the most recent encoder run.
    pub fn args(&self) -> Vec<String> {
        std::fs::read_to_string(self.log_dir().join("args.txt"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Concat list seen by the most recent encoder run.
    pub fn concat_list(&self) -> String {
        std::fs::read_to_string(self.log_dir().join("list.txt")).unwrap()
    }

    /// Visible entries in the store.
    pub fn artifact_count(&self) -> usize {
        std::fs::read_dir(self.pipeline.store().root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .count()
    }

    /// Hidden staging entries left in the store.
    pub fn staging_count(&self) -> usize {
        std::fs::read_dir(self.pipeline.store().root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
            .count()
    }

    pub fn seed(&self, bytes: &[u8], extension: &str) -> Artifact {
        self.pipeline.store().create(bytes, extension).unwrap()
    }
}

pub(crate) fn fixture() -> Fixture {
    fixture_with(RECORDING_ENCODER, PipelineConfig::default())
}

pub(crate) fn fixture_with(encoder_body: &str, config: PipelineConfig) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");
    std::fs::create_dir(&log).unwrap();

    let body = encoder_body.replace("{log}", &log.to_string_lossy());
    let ffmpeg = write_script(dir.path(), "ffmpeg", &body);

    let store = ArtifactStore::open(dir.path().join("store")).unwrap();
    let runner = EncoderRunner::new(EncoderConfig {
        ffmpeg,
        timeout: Duration::from_secs(30),
        max_concurrent: 2,
    });
    let sweeper = Sweeper::new(store.clone(), SweeperConfig::default());

    Fixture {
        pipeline: Pipeline::new(store, runner, sweeper, config),
        dir,
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
    }
    path
}

/// A parsed filter: its name and its `key=value` options, in order.
pub(crate) type ParsedFilter = (String, Vec<(String, String)>);

/// Split a filter chain the way ffmpeg's graph parser does, then split each
/// filter's arguments the way its option parser does.
pub(crate) fn parse_filter_chain(graph: &str) -> Vec<ParsedFilter> {
    let mut filters = Vec::new();
    let mut rest = graph;
    while !rest.is_empty() {
        let (name, after) = next_token(rest, &['=', ',', ';', '[']);
        let mut options = Vec::new();
        rest = after;
        if let Some(args) = rest.strip_prefix('=') {
            let (args, after) = next_token(args, &['[', ']', ',', ';']);
            rest = after;
            let mut opts = args.as_str();
            while !opts.is_empty() {
                let (key, after) = next_token(opts, &['=', ':']);
                let after = after.strip_prefix('=').unwrap_or(after);
                let (value, after) = next_token(after, &[':']);
                options.push((key, value));
                opts = after.strip_prefix(':').unwrap_or(after);
            }
        }
        filters.push((name, options));
        rest = rest.get(1..).unwrap_or("");
    }
    filters
}

/// What `drawtext` renders for an already parsed `text` option.
pub(crate) fn rendered_text(value: &str) -> String {
    let mut out = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            '%' => panic!("unescaped expansion in {value:?}"),
            _ => out.push(c),
        }
    }
    out
}

/// One pass of ffmpeg's `av_get_token`.
fn next_token<'a>(input: &'a str, terms: &[char]) -> (String, &'a str) {
    let mut rest = input.trim_start_matches([' ', '\n', '\t', '\r']).chars();
    let mut out = String::new();
    let mut keep = 0;
    loop {
        let before = rest.as_str();
        let Some(c) = rest.next() else { break };
        if terms.contains(&c) {
            rest = before.chars();
            break;
        }
        match c {
            '\\' if !rest.as_str().is_empty() => {
                out.extend(rest.next());
                keep = out.len();
            }
            '\'' => {
                for q in rest.by_ref() {
                    if q == '\'' {
                        keep = out.len();
                        break;
                    }
                    out.push(q);
                }
            }
            _ => out.push(c),
        }
    }
    let trimmed = out[keep..].trim_end_matches([' ', '\n', '\t', '\r']).len();
    out.truncate(keep + trimmed);
    (out, rest.as_str())
}
