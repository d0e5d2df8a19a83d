//! Data passed between pipeline stages and the typed result of a pipeline.
//!
//! [`PipelineOutcome`] is the contract between the pipelines and the tool
//! dispatcher. The text a host eventually sees is derived from it by
//! [`PipelineOutcome::render`], so tests can assert on the variant and the
//! wire text independently.

use crate::error::StageError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Raw OCR output, relayed verbatim.
pub type OcrResult = serde_json::Value;

/// What the caller asked to OCR. Constructed once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrRequest {
    /// A publicly reachable document URL, submitted directly.
    Url { document_url: String },
    /// A PDF on local disk, uploaded first.
    LocalFile { path: PathBuf },
}

impl OcrRequest {
    pub fn kind(&self) -> PipelineKind {
        match self {
            OcrRequest::Url { .. } => PipelineKind::Url,
            OcrRequest::LocalFile { .. } => PipelineKind::LocalFile,
        }
    }
}

/// File identifier assigned by the upload stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFileHandle {
    pub file_id: String,
}

/// Short-lived URL granting read access to an uploaded file.
///
/// Possession of `url` is enough to read the document, so `Debug` never
/// prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedDocumentUrl {
    pub url: String,
    pub expires_in_hours: u32,
}

impl fmt::Debug for SignedDocumentUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedDocumentUrl")
            .field("url", &"<redacted>")
            .field("expires_in_hours", &self.expires_in_hours)
            .finish()
    }
}

/// Which pipeline produced an outcome. Determines the error labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    Url,
    LocalFile,
}

/// One remote operation in a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Upload,
    SignedUrl,
    Ocr,
}

impl Stage {
    /// Prefix used when a stage's HTTP failure is rendered for the host.
    ///
    /// The direct-URL pipeline has only the OCR stage and reports it with
    /// the plain `API Error` label.
    pub fn error_label(self, pipeline: PipelineKind) -> &'static str {
        match (self, pipeline) {
            (Stage::Upload, _) => "Upload Error",
            (Stage::SignedUrl, _) => "Signed URL Error",
            (Stage::Ocr, PipelineKind::LocalFile) => "OCR API Error",
            (Stage::Ocr, PipelineKind::Url) => "API Error",
        }
    }
}

/// The result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Every stage succeeded; `payload` is the OCR response body.
    Success { payload: OcrResult },

    /// A stage received a non-2xx response.
    HttpFailure {
        pipeline: PipelineKind,
        stage: Stage,
        status: u16,
        status_text: String,
        body: String,
    },

    /// A failure with no HTTP response behind it: filesystem errors,
    /// transport errors, or a success body that could not be decoded.
    Failure {
        pipeline: PipelineKind,
        reason: String,
    },
}

impl PipelineOutcome {
    /// Fold a stage error into an outcome, tagging it with where it happened.
    pub fn from_stage_error(pipeline: PipelineKind, stage: Stage, err: StageError) -> Self {
        match err {
            StageError::Http {
                status,
                status_text,
                body,
            } => PipelineOutcome::HttpFailure {
                pipeline,
                stage,
                status,
                status_text,
                body,
            },
            other => PipelineOutcome::Failure {
                pipeline,
                reason: other.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }

    /// Render the outcome as the single line of text returned to the host.
    ///
    /// Success is the payload pretty-printed with two-space indentation.
    pub fn render(&self) -> String {
        match self {
            PipelineOutcome::Success { payload } => serde_json::to_string_pretty(payload)
                .unwrap_or_else(|e| format!("Error performing OCR: {e}")),
            PipelineOutcome::HttpFailure {
                pipeline,
                stage,
                status,
                status_text,
                body,
            } => format!(
                "{}: {} {} - {}",
                stage.error_label(*pipeline),
                status,
                status_text,
                body
            ),
            PipelineOutcome::Failure { pipeline, reason } => match pipeline {
                PipelineKind::LocalFile => {
                    format!("Error performing OCR on local file: {reason}")
                }
                PipelineKind::Url => format!("Error performing OCR: {reason}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_renders_pretty_json() {
        let o = PipelineOutcome::Success {
            payload: json!({"text": "hello"}),
        };
        assert_eq!(o.render(), "{\n  \"text\": \"hello\"\n}");
    }

    #[test]
    fn http_failure_labels() {
        let cases = [
            (PipelineKind::LocalFile, Stage::Upload, "Upload Error"),
            (PipelineKind::LocalFile, Stage::SignedUrl, "Signed URL Error"),
            (PipelineKind::LocalFile, Stage::Ocr, "OCR API Error"),
            (PipelineKind::Url, Stage::Ocr, "API Error"),
        ];
        for (pipeline, stage, label) in cases {
            let o = PipelineOutcome::HttpFailure {
                pipeline,
                stage,
                status: 401,
                status_text: "Unauthorized".into(),
                body: "{\"detail\":\"bad key\"}".into(),
            };
            assert_eq!(
                o.render(),
                format!("{label}: 401 Unauthorized - {{\"detail\":\"bad key\"}}")
            );
        }
    }

    #[test]
    fn non_http_failure_prefix_depends_on_pipeline() {
        let local = PipelineOutcome::Failure {
            pipeline: PipelineKind::LocalFile,
            reason: "boom".into(),
        };
        assert_eq!(local.render(), "Error performing OCR on local file: boom");

        let url = PipelineOutcome::Failure {
            pipeline: PipelineKind::Url,
            reason: "boom".into(),
        };
        assert_eq!(url.render(), "Error performing OCR: boom");
    }

    #[test]
    fn stage_error_folding() {
        let http = StageError::Http {
            status: 500,
            status_text: "Internal Server Error".into(),
            body: "server error".into(),
        };
        let o = PipelineOutcome::from_stage_error(PipelineKind::LocalFile, Stage::Upload, http);
        assert_eq!(o.render(), "Upload Error: 500 Internal Server Error - server error");

        let decode = StageError::Decode("missing field `id`".into());
        let o = PipelineOutcome::from_stage_error(PipelineKind::LocalFile, Stage::Upload, decode);
        assert!(matches!(o, PipelineOutcome::Failure { .. }));
        assert!(!o.is_success());
    }

    #[test]
    fn signed_url_debug_is_redacted() {
        let s = SignedDocumentUrl {
            url: "https://signed.example/abc?token=xyz".into(),
            expires_in_hours: 24,
        };
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("token=xyz"), "got: {dbg}");
    }

    #[test]
    fn outcome_serialises_with_kind_tag() {
        let o = PipelineOutcome::Failure {
            pipeline: PipelineKind::Url,
            reason: "x".into(),
        };
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["kind"], "failure");
        assert_eq!(v["pipeline"], "url");
    }
}
