//! Tool dispatcher: the two OCR tools as seen by an MCP host.
//!
//! The dispatcher owns three jobs:
//!
//! 1. advertise each tool's name, description and JSON input schema;
//! 2. validate `arguments` into an [`OcrRequest`] before anything touches the
//!    network;
//! 3. run the pipeline and wrap its [`PipelineOutcome`] in the single-element
//!    text envelope MCP hosts expect.
//!
//! Only step 2 can fail with an error ([`ToolCallError`]). Once a pipeline has
//! started, whatever happens (remote error, I/O error, even a panic inside the
//! pipeline task) comes back as a well-formed [`ToolResponse`].

use crate::client::MistralClient;
use crate::outcome::{OcrRequest, PipelineKind, PipelineOutcome};
use crate::run::run_ocr;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Tool name constants for dispatch matching.
pub mod names {
    pub const OCR_FOR_LOCAL_PDF: &str = "ocr_for_local_pdf";
    pub const OCR_FOR_PDF_URL: &str = "ocr_for_pdf_url";
}

/// An entry of the `tools/list` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

static TOOL_DEFINITIONS: Lazy<Vec<ToolDefinition>> = Lazy::new(|| {
    vec![
        ToolDefinition::new(
            names::OCR_FOR_LOCAL_PDF,
            "Performs OCR on a local PDF file by uploading it to Mistral API.",
            json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The local path to the PDF file."
                    }
                },
                "required": ["file_path"]
            }),
        ),
        ToolDefinition::new(
            names::OCR_FOR_PDF_URL,
            "Performs OCR on a PDF file from a public URL.",
            json!({
                "type": "object",
                "properties": {
                    "pdf_url": {
                        "type": "string",
                        "format": "uri",
                        "description": "The public URL of the PDF file."
                    }
                },
                "required": ["pdf_url"]
            }),
        ),
    ]
});

/// Definitions of every registered tool, in registration order.
pub fn tool_definitions() -> &'static [ToolDefinition] {
    &TOOL_DEFINITIONS
}

/// The `tools/call` result envelope: `{ content: [ { type: "text", text } ] }`.
///
/// `isError` is only serialised when true, so successful responses are
/// exactly the plain envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
    #[serde(
        rename = "isError",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

impl ToolResponse {
    /// The text of the single content element.
    pub fn text(&self) -> &str {
        match self.content.first() {
            Some(ToolContent::Text { text }) => text,
            None => "",
        }
    }
}

impl From<&PipelineOutcome> for ToolResponse {
    fn from(outcome: &PipelineOutcome) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: outcome.render(),
            }],
            is_error: !outcome.is_success(),
        }
    }
}

/// Rejections that happen before any pipeline starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct LocalPdfArgs {
    file_path: String,
}

#[derive(Debug, Deserialize)]
struct PdfUrlArgs {
    pdf_url: String,
}

/// Validate a tool call into an [`OcrRequest`].
///
/// Unknown extra fields are ignored. A `pdf_url` must parse as an absolute
/// URL; a `file_path` must be non-empty but is not checked for existence.
pub fn parse_request(name: &str, arguments: Option<&Value>) -> Result<OcrRequest, ToolCallError> {
    let invalid = |reason: String| ToolCallError::InvalidArguments {
        tool: name.to_string(),
        reason,
    };
    let arguments = arguments.cloned().unwrap_or_else(|| json!({}));

    match name {
        names::OCR_FOR_LOCAL_PDF => {
            let args: LocalPdfArgs =
                serde_json::from_value(arguments).map_err(|e| invalid(e.to_string()))?;
            if args.file_path.is_empty() {
                return Err(invalid("`file_path` must not be empty".into()));
            }
            Ok(OcrRequest::LocalFile {
                path: PathBuf::from(args.file_path),
            })
        }
        names::OCR_FOR_PDF_URL => {
            let args: PdfUrlArgs =
                serde_json::from_value(arguments).map_err(|e| invalid(e.to_string()))?;
            reqwest::Url::parse(&args.pdf_url)
                .map_err(|e| invalid(format!("`pdf_url` is not a valid URL: {e}")))?;
            Ok(OcrRequest::Url {
                document_url: args.pdf_url,
            })
        }
        other => Err(ToolCallError::UnknownTool(other.to_string())),
    }
}

/// Routes tool calls to the OCR pipelines.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    client: MistralClient,
}

impl ToolDispatcher {
    pub fn new(client: MistralClient) -> Self {
        Self { client }
    }

    pub fn definitions(&self) -> &'static [ToolDefinition] {
        tool_definitions()
    }

    /// Validate and run one tool call.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<&Value>,
    ) -> Result<ToolResponse, ToolCallError> {
        let request = parse_request(name, arguments)?;
        debug!("Dispatching tool '{}'", name);
        let outcome = self.run_isolated(request).await;
        Ok(ToolResponse::from(&outcome))
    }

    /// Run the pipeline on its own task so that a panic inside it turns
    /// into a failure outcome instead of taking the connection down.
    async fn run_isolated(&self, request: OcrRequest) -> PipelineOutcome {
        let pipeline = request.kind();
        let client = self.client.clone();
        let task = tokio::spawn(async move { run_ocr(&client, &request).await });
        join_pipeline(pipeline, task).await
    }
}

/// Await a pipeline task, folding a panic or cancellation into a
/// [`PipelineOutcome::Failure`] for `pipeline`.
async fn join_pipeline(
    pipeline: PipelineKind,
    task: JoinHandle<PipelineOutcome>,
) -> PipelineOutcome {
    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("OCR pipeline task aborted: {}", e);
            PipelineOutcome::Failure {
                pipeline,
                reason: e.to_string(),
            }
        }
    }
}
