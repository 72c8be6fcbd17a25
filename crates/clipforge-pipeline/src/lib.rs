//! # clipforge-pipeline
//!
//! The pipeline stage handlers: Upload, Trim, Merge, AddText, AddAudio and
//! Export.
//!
//! Every encoding stage follows the same sequence:
//!
//! 1. validate the request (no subprocess is spawned for a bad request),
//! 2. resolve the referenced artifacts through the [`ArtifactStore`],
//! 3. build an immutable [`EncodeJob`] writing into a private staging
//!    directory,
//! 4. run it through the shared [`EncoderRunner`],
//! 5. register the output as a new artifact, only after confirmed success.
//!
//! No stage retries and no stage mutates an existing artifact.
//!
//! [`ArtifactStore`]: clipforge_store::ArtifactStore
//! [`EncodeJob`]: clipforge_av::EncodeJob
//! [`EncoderRunner`]: clipforge_av::EncoderRunner

pub mod outcome;
pub mod pipeline;
pub mod request;
mod stages;

pub use outcome::{ExportOutput, StageOutput, UploadOutput};
pub use pipeline::{Pipeline, PipelineConfig};
pub use request::{
    AudioMode, AudioRequest, AudioSource, ExportRequest, MergeRequest, MixDuration,
    TextOverlayRequest, TrimRequest, UploadRequest,
};
