//! Upload stage: send a local file to the Mistral file store.
//!
//! The file is streamed from disk rather than read into memory first; its
//! length is taken from the metadata so the multipart body still carries an
//! exact `Content-Length`.

use crate::client::{json_body, send_checked, MistralClient};
use crate::error::StageError;
use crate::outcome::UploadedFileHandle;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::io;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Value of the `purpose` form field. The file store only hands out signed
/// URLs usable by the OCR endpoint for files uploaded with this purpose.
pub const UPLOAD_PURPOSE: &str = "ocr";

const FALLBACK_FILE_NAME: &str = "document.pdf";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

/// Upload the file at `path` and return the identifier the store assigned.
///
/// A missing or unreadable path fails with [`StageError::Io`] before any
/// request is sent.
pub async fn upload_file(
    client: &MistralClient,
    path: &Path,
) -> Result<UploadedFileHandle, StageError> {
    let mut file = tokio::fs::File::open(path).await?;
    let metadata = file.metadata().await?;
    if metadata.is_dir() {
        return Err(StageError::Io(directory_error(&mut file).await));
    }
    let len = metadata.len();
    let file_name = file_name_for(path);
    debug!("Uploading '{}' ({} bytes)", path.display(), len);

    let part = Part::stream_with_length(reqwest::Body::from(file), len)
        .file_name(file_name)
        .mime_str("application/pdf")?;
    let form = Form::new()
        .text("purpose", UPLOAD_PURPOSE)
        .part("file", part);

    let response = send_checked(client.post("files").multipart(form)).await?;
    let uploaded: UploadResponse = json_body(response).await?;

    info!("Uploaded '{}' as file {}", path.display(), uploaded.id);
    Ok(UploadedFileHandle {
        file_id: uploaded.id,
    })
}

/// The error the OS gives for reading `dir`, e.g. `Is a directory (os error 21)`.
///
/// Opening a directory succeeds on Unix, so the read is what surfaces it.
async fn directory_error(dir: &mut tokio::fs::File) -> io::Error {
    let mut byte = [0u8; 1];
    match dir.read(&mut byte).await {
        Err(e) => e,
        Ok(_) => io::Error::new(io::ErrorKind::IsADirectory, "Is a directory"),
    }
}

/// File name sent with the file part; the store keeps it for display only.
fn file_name_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_from_path() {
        assert_eq!(file_name_for(Path::new("/tmp/report.pdf")), "report.pdf");
        assert_eq!(file_name_for(Path::new("scan")), "scan");
        assert_eq!(file_name_for(Path::new("/")), FALLBACK_FILE_NAME);
    }

    #[tokio::test]
    async fn missing_file_fails_before_any_request() {
        // Port 9 (discard) is never contacted: the open fails first.
        let config = crate::OcrConfig::builder()
            .base_url("http://127.0.0.1:9/v1")
            .build()
            .unwrap();
        let client = MistralClient::new(config).unwrap();

        let err = upload_file(&client, Path::new("/definitely/not/here.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Io(_)), "got: {err:?}");
    }
}
