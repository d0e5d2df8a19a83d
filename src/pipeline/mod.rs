//! Remote stages of the OCR pipelines.
//!
//! Each submodule wraps exactly one Mistral endpoint and returns a
//! `Result<_, StageError>`. Stages know nothing about each other; the
//! sequencing and short-circuiting live in [`crate::run`].
//!
//! ## Data Flow
//!
//! ```text
//! local path ──▶ upload ──▶ signed_url ──▶ ocr ──▶ OcrResult
//!               (file id)   (signed URL)
//!
//! public URL ─────────────────────────────▶ ocr ──▶ OcrResult
//! ```
//!
//! 1. [`upload`]     — multipart POST of the file bytes, yields a file id
//! 2. [`signed_url`] — GET a 24-hour read URL for that file id
//! 3. [`ocr`]        — POST the document URL to the OCR model

pub mod ocr;
pub mod signed_url;
pub mod upload;
