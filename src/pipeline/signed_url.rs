//! Signed-URL stage: exchange a file id for a temporary public URL.

use crate::client::{json_body, send_checked, MistralClient};
use crate::error::StageError;
use crate::outcome::{SignedDocumentUrl, UploadedFileHandle};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

/// Lifetime requested for every signed URL.
pub const SIGNED_URL_EXPIRY_HOURS: u32 = 24;

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    url: String,
}

/// Request a signed URL for `handle`, valid for [`SIGNED_URL_EXPIRY_HOURS`].
pub async fn fetch_signed_url(
    client: &MistralClient,
    handle: &UploadedFileHandle,
) -> Result<SignedDocumentUrl, StageError> {
    let request = client
        .get(&format!("files/{}/url", handle.file_id))
        .query(&[("expiry", SIGNED_URL_EXPIRY_HOURS)])
        .header(ACCEPT, "application/json");

    let response = send_checked(request).await?;
    let signed: SignedUrlResponse = json_body(response).await?;

    // The URL itself is a bearer capability; never log it.
    debug!(
        "Signed URL issued for file {} ({}h)",
        handle.file_id, SIGNED_URL_EXPIRY_HOURS
    );
    Ok(SignedDocumentUrl {
        url: signed.url,
        expires_in_hours: SIGNED_URL_EXPIRY_HOURS,
    })
}
