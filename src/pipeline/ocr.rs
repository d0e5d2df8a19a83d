//! OCR submission stage, shared by both pipelines.
//!
//! The stage does not care where the URL came from: a signed URL from the
//! file store and a caller-supplied public URL are submitted identically.

use crate::client::{json_body, send_checked, MistralClient};
use crate::error::StageError;
use crate::outcome::OcrResult;
use serde::Serialize;
use tracing::debug;

/// Model identifier sent with every OCR submission.
pub const OCR_MODEL: &str = "mistral-ocr-latest";

#[derive(Debug, Serialize)]
struct OcrRequestBody<'a> {
    model: &'a str,
    document: DocumentRef<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DocumentRef<'a> {
    DocumentUrl { document_url: &'a str },
}

/// Submit `document_url` to the OCR endpoint and return the response body.
pub async fn submit_ocr(
    client: &MistralClient,
    document_url: &str,
) -> Result<OcrResult, StageError> {
    let body = OcrRequestBody {
        model: OCR_MODEL,
        document: DocumentRef::DocumentUrl { document_url },
    };

    let response = send_checked(client.post("ocr").json(&body)).await?;
    let result: OcrResult = json_body(response).await?;

    debug!("OCR completed with model {}", OCR_MODEL);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let body = OcrRequestBody {
            model: OCR_MODEL,
            document: DocumentRef::DocumentUrl {
                document_url: "https://example.com/a.pdf",
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "mistral-ocr-latest",
                "document": {
                    "type": "document_url",
                    "document_url": "https://example.com/a.pdf"
                }
            })
        );
    }
}
