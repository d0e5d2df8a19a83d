//! Pipeline composition: the two OCR entry points.
//!
//! Both functions always return a [`PipelineOutcome`]; nothing here returns
//! `Err`. A stage failure stops the chain on the spot, and the failed stage's
//! partial result never reaches the next stage because each stage's output
//! only exists inside the `Ok` arm of the previous `?`.

use crate::client::MistralClient;
use crate::error::StageError;
use crate::outcome::{OcrRequest, OcrResult, PipelineKind, PipelineOutcome, Stage};
use crate::pipeline::{ocr, signed_url, upload};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Run whichever pipeline `request` calls for.
pub async fn run_ocr(client: &MistralClient, request: &OcrRequest) -> PipelineOutcome {
    match request {
        OcrRequest::Url { document_url } => ocr_url(client, document_url).await,
        OcrRequest::LocalFile { path } => ocr_local_file(client, path).await,
    }
}

/// Direct-URL pipeline: a single OCR submission.
pub async fn ocr_url(client: &MistralClient, document_url: &str) -> PipelineOutcome {
    let start = Instant::now();
    info!("OCR for document URL");

    let outcome = match ocr::submit_ocr(client, document_url).await {
        Ok(payload) => PipelineOutcome::Success { payload },
        Err(e) => PipelineOutcome::from_stage_error(PipelineKind::Url, Stage::Ocr, e),
    };
    log_outcome(PipelineKind::Url, &outcome, start);
    outcome
}

/// Local-file pipeline: upload → signed URL → OCR.
pub async fn ocr_local_file(client: &MistralClient, path: &Path) -> PipelineOutcome {
    let start = Instant::now();
    info!("OCR for local file '{}'", path.display());

    let outcome = match local_file_stages(client, path).await {
        Ok(payload) => PipelineOutcome::Success { payload },
        Err((stage, e)) => PipelineOutcome::from_stage_error(PipelineKind::LocalFile, stage, e),
    };
    log_outcome(PipelineKind::LocalFile, &outcome, start);
    outcome
}

async fn local_file_stages(
    client: &MistralClient,
    path: &Path,
) -> Result<OcrResult, (Stage, StageError)> {
    let handle = upload::upload_file(client, path)
        .await
        .map_err(|e| (Stage::Upload, e))?;

    let signed = signed_url::fetch_signed_url(client, &handle)
        .await
        .map_err(|e| (Stage::SignedUrl, e))?;

    ocr::submit_ocr(client, &signed.url)
        .await
        .map_err(|e| (Stage::Ocr, e))
}

fn log_outcome(pipeline: PipelineKind, outcome: &PipelineOutcome, start: Instant) {
    let elapsed_ms = start.elapsed().as_millis();
    match outcome {
        PipelineOutcome::Success { .. } => {
            info!("{:?} pipeline succeeded in {}ms", pipeline, elapsed_ms)
        }
        PipelineOutcome::HttpFailure { stage, status, .. } => warn!(
            "{:?} pipeline failed at {:?} stage with HTTP {} after {}ms",
            pipeline, stage, status, elapsed_ms
        ),
        PipelineOutcome::Failure { reason, .. } => warn!(
            "{:?} pipeline failed after {}ms: {}",
            pipeline, elapsed_ms, reason
        ),
    }
}
