//! # mistral-ocr-mcp
//!
//! Mistral document OCR exposed as two MCP tools.
//!
//! | Tool | Input | Remote calls |
//! |------|-------|--------------|
//! | `ocr_for_pdf_url`   | `pdf_url`   | OCR |
//! | `ocr_for_local_pdf` | `file_path` | upload → signed URL → OCR |
//!
//! The crate does no OCR itself. It sequences the Mistral endpoints, passes
//! each stage's output to the next, and turns every kind of failure into the
//! same text envelope as a success, so an MCP host always gets a well-formed
//! answer.
//!
//! ## Pipeline Overview
//!
//! ```text
//! tools/call
//!  │
//!  ├─ 1. Validate  arguments → OcrRequest (no network on failure)
//!  ├─ 2. Upload    multipart POST /files            (local file only)
//!  ├─ 3. Sign      GET /files/{id}/url?expiry=24    (local file only)
//!  ├─ 4. OCR       POST /ocr  model=mistral-ocr-latest
//!  └─ 5. Render    PipelineOutcome → { content: [ { type: "text", text } ] }
//! ```
//!
//! ## Library use
//!
//! ```rust,no_run
//! use mistral_ocr_mcp::{ocr_url, MistralClient, OcrConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MistralClient::new(OcrConfig::from_env())?;
//!     let outcome = ocr_url(&client, "https://arxiv.org/pdf/1706.03762").await;
//!     println!("{}", outcome.render());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mistral-ocr-mcp` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod protocol;
pub mod run;
pub mod server;
pub mod tools;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::MistralClient;
pub use config::{OcrConfig, OcrConfigBuilder};
pub use error::{McpOcrError, StageError};
pub use outcome::{
    OcrRequest, OcrResult, PipelineKind, PipelineOutcome, SignedDocumentUrl, Stage,
    UploadedFileHandle,
};
pub use run::{ocr_local_file, ocr_url, run_ocr};
pub use server::McpServer;
pub use tools::{ToolCallError, ToolDispatcher, ToolResponse};
