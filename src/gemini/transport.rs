//! Transport seam between the edit client and the Gemini API.

use crate::error::{parse_retry_after, sanitize_error_message, LuminaError, Result};
use crate::gemini::wire::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Default Gemini API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "API_KEY"];

/// Sends `generateContent` calls somewhere and returns the parsed body.
///
/// [`HttpTransport`] talks to the real API; tests substitute a fake.
#[async_trait]
pub trait GeminiTransport: Send + Sync {
    /// Sends one `generateContent` request for `model`.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    /// Checks that the model is reachable with the configured credentials.
    async fn health_check(&self, model: &str) -> Result<()>;
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransportBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the API host (proxies, regional endpoints).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a per-request timeout. No timeout by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the transport, resolving the API key.
    pub fn build(self) -> Result<HttpTransport> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|k| !k.is_empty()))
            })
            .ok_or_else(|| {
                LuminaError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(HttpTransport {
            client: client.build()?,
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: self.timeout,
        })
    }
}

/// reqwest-backed transport for the public Gemini API.
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Creates a new `HttpTransportBuilder`.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}", self.base_url, model)
    }

    fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> LuminaError {
        let text = sanitize_error_message(text);
        if status == 404 {
            return LuminaError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            );
        }
        if status == 429 {
            let retry_after = parse_retry_after(headers).map(Duration::from_secs);
            return LuminaError::RateLimited { retry_after };
        }
        if status == 401 || status == 403 {
            return LuminaError::Auth(text);
        }
        let lower = text.to_lowercase();
        if lower.contains("safety")
            || lower.contains("blocked")
            || lower.contains("prohibited")
        {
            return LuminaError::ContentBlocked(text);
        }
        LuminaError::Api {
            status,
            message: text,
        }
    }
}

#[async_trait]
impl GeminiTransport for HttpTransport {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}:generateContent", self.model_url(model));

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &text, &headers));
        }

        Ok(response.json().await?)
    }

    async fn health_check(&self, model: &str) -> Result<()> {
        let response = self
            .client
            .get(self.model_url(model))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(LuminaError::Auth("Invalid API key".into())),
            404 => Err(LuminaError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(LuminaError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}
