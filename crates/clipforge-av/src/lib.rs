//! # clipforge-av
//!
//! Encoder orchestration for the clipforge pipeline.
//!
//! This crate provides:
//!
//! - **Invocation descriptors** ([`EncodeJob`]) -- an immutable, declarative
//!   plan for one ffmpeg run: ordered inputs, an optional filter graph, output
//!   options and a destination.
//! - **Execution** ([`EncoderRunner`]) -- runs one descriptor as a subprocess
//!   behind a bounded admission gate, with a per-invocation timeout.
//! - **Command execution** ([`ToolCommand`]) -- async builder for external
//!   processes that kills the child on timeout or cancellation.
//! - **Tool discovery** ([`ToolRegistry`]) -- locate ffmpeg and ffprobe.
//! - **Filter-graph helpers** ([`filter`]) -- escaping of untrusted text and
//!   concat list rendering.
//! - **Probing** ([`probe_duration`]) -- media duration via ffprobe.

pub mod command;
pub mod filter;
pub mod job;
pub mod probe;
pub mod runner;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use filter::{concat_list, escape_drawtext_text, quote_option_value};
pub use job::{EncodeInput, EncodeJob, EncodeJobBuilder, EncodeKind, FilterGraph, OutputCodecs};
pub use probe::probe_duration;
pub use runner::{EncoderConfig, EncoderRunner};
pub use tools::{ToolInfo, ToolPaths, ToolRegistry};
