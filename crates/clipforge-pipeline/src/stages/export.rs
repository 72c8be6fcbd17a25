//! Export: hand out a finished artifact.

use clipforge_common::{Error, Result};
use tracing::instrument;

use crate::outcome::ExportOutput;
use crate::pipeline::blocking;
use crate::request::ExportRequest;
use crate::Pipeline;

impl Pipeline {
    /// Look up `output_id` and return where it can be downloaded.
    ///
    /// Export is a pure lookup; the artifact is neither copied nor touched.
    #[instrument(skip_all, fields(stage = "export", output_id = %req.output_id))]
    pub async fn export(&self, req: ExportRequest) -> Result<ExportOutput> {
        self.before_request().await;
        if req.output_id.trim().is_empty() {
            return Err(Error::validation("outputId is required"));
        }

        let artifact = self.resolve("output", &req.output_id).await?;
        let path = artifact.path.clone();
        let size = blocking(move || Ok(std::fs::metadata(&path)?.len())).await?;

        Ok(ExportOutput {
            artifact_id: artifact.id,
            download_reference: self.download_reference(&artifact),
            path: artifact.path,
            size,
        })
    }
}
