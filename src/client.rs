//! Authenticated HTTP access to the Mistral API.
//!
//! [`MistralClient`] owns the only process-wide shared state: the
//! `reqwest::Client` and the immutable [`OcrConfig`]. Cloning it is cheap,
//! and concurrent pipelines may use clones freely since nothing in it is
//! mutated after construction.

use crate::config::OcrConfig;
use crate::error::{McpOcrError, StageError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MistralClient {
    http: reqwest::Client,
    config: Arc<OcrConfig>,
}

impl MistralClient {
    /// Build a client from a validated config.
    pub fn new(config: OcrConfig) -> Result<Self, McpOcrError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("mistral-ocr-mcp/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(McpOcrError::HttpClient)?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Absolute URL for an endpoint path such as `"files"` or `"ocr"`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(self.endpoint(path))
            .bearer_auth(self.config.bearer_token())
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.endpoint(path))
            .bearer_auth(self.config.bearer_token())
    }
}

/// Send a request and return the response only if it is 2xx.
///
/// Non-2xx responses become [`StageError::Http`] with the body read as
/// text and left untouched. A body that cannot be read at all is a
/// [`StageError::Transport`], not an empty body.
pub(crate) async fn send_checked(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, StageError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await?;
    debug!("Remote returned {} ({} bytes of body)", status, body.len());
    Err(StageError::http(status, body))
}

/// Decode a 2xx JSON body, mapping shape mismatches to [`StageError::Decode`].
pub(crate) async fn json_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StageError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| StageError::Decode(e.to_string()))
}
