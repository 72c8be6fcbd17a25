//! Merge: concatenate videos in order.

use std::path::Path;

use clipforge_av::{concat_list, EncodeInput, EncodeJob, EncodeKind, OutputCodecs};
use clipforge_common::{Error, Result};
use tracing::instrument;

use crate::outcome::StageOutput;
use crate::pipeline::OUTPUT_EXTENSION;
use crate::request::MergeRequest;
use crate::Pipeline;

const LIST_FILE: &str = "inputs.txt";

impl Pipeline {
    /// Produce one video playing the referenced videos back to back.
    ///
    /// Every id must resolve before the encoder is started.
    #[instrument(skip_all, fields(stage = "merge", count = req.ordered_ids().len()))]
    pub async fn merge(&self, req: MergeRequest) -> Result<StageOutput> {
        self.before_request().await;
        let ids = validate(&req)?;

        let mut sources = Vec::with_capacity(ids.len());
        for id in ids {
            sources.push(self.resolve("video", id).await?.path);
        }

        let staging = self.staging().await?;
        let list = staging.path().join(LIST_FILE);
        tokio::fs::write(&list, concat_list(&sources)).await?;

        let dest = staging.path().join(format!("merged{OUTPUT_EXTENSION}"));
        let job = build_job(&list, &dest, &self.config.codecs);

        self.encode(staging, job).await
    }
}

fn validate(req: &MergeRequest) -> Result<&[String]> {
    let ids = req.ordered_ids();
    if ids.len() < 2 {
        return Err(Error::validation("Provide at least two video ids to merge"));
    }
    if ids.iter().any(|id| id.trim().is_empty()) {
        return Err(Error::validation("video ids must not be empty"));
    }
    Ok(ids)
}

fn build_job(list: &Path, dest: &Path, codecs: &OutputCodecs) -> EncodeJob {
    EncodeJob::builder(EncodeKind::Merge, dest)
        .input(EncodeInput::new(list).with_options(["-f", "concat", "-safe", "0"]))
        .output_options(codecs.options())
        .build()
}
