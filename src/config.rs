//! Configuration for talking to the remote OCR service.
//!
//! Everything the pipelines need from the outside world lives in
//! [`OcrConfig`], built via its [`OcrConfigBuilder`]. The config is read once
//! at startup and never mutated afterwards; the client built from it is
//! shared by every tool invocation.

use crate::error::McpOcrError;
use std::fmt;

/// Default Mistral API root. All three endpoints hang off this path.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Environment variable carrying the bearer credential.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Sent when no credential is configured, so the remote service rejects
/// every call with its own authorization error.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_MISTRAL_API_KEY";

/// Configuration for the Mistral OCR client.
///
/// # Example
/// ```rust
/// use mistral_ocr_mcp::OcrConfig;
///
/// let config = OcrConfig::builder()
///     .api_key("sk-test")
///     .request_timeout_secs(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.request_timeout_secs, Some(90));
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// API root, without a trailing slash. Default: [`DEFAULT_BASE_URL`].
    ///
    /// Pointing this at a local mock server is how the integration tests
    /// exercise the pipelines.
    pub base_url: String,

    /// Bearer credential. If None, [`PLACEHOLDER_API_KEY`] is sent.
    pub api_key: Option<String>,

    /// Per-request timeout in seconds. Default: None (transport default).
    ///
    /// Applies to each remote call individually, never to a whole pipeline.
    pub request_timeout_secs: Option<u64>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }

    /// Default config with the credential taken from `MISTRAL_API_KEY`.
    ///
    /// An unset or empty variable leaves `api_key` as None.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// The credential actually sent in the `Authorization` header.
    pub fn bearer_token(&self) -> &str {
        self.api_key.as_deref().unwrap_or(PLACEHOLDER_API_KEY)
    }
}

/// Builder for [`OcrConfig`].
#[derive(Debug)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(key)
        };
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, McpOcrError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(McpOcrError::InvalidConfig("base URL is empty".into()));
        }
        if reqwest::Url::parse(&c.base_url).is_err() {
            return Err(McpOcrError::InvalidConfig(format!(
                "base URL '{}' is not a valid URL",
                c.base_url
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(McpOcrError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = OcrConfig::default();
        assert_eq!(c.base_url, "https://api.mistral.ai/v1");
        assert!(c.api_key.is_none());
        assert!(c.request_timeout_secs.is_none());
    }

    #[test]
    fn missing_key_sends_placeholder() {
        let c = OcrConfig::default();
        assert_eq!(c.bearer_token(), PLACEHOLDER_API_KEY);

        let c = OcrConfig::builder().api_key("sk-1").build().unwrap();
        assert_eq!(c.bearer_token(), "sk-1");
    }

    #[test]
    fn blank_key_is_treated_as_missing() {
        let c = OcrConfig::builder().api_key("   ").build().unwrap();
        assert!(c.api_key.is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = OcrConfig::builder()
            .base_url("http://127.0.0.1:9000/v1/")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "http://127.0.0.1:9000/v1");
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = OcrConfig::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, McpOcrError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(OcrConfig::builder().request_timeout_secs(0).build().is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let c = OcrConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
    }
}
