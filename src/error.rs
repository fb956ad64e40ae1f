//! Error types for image editing.

use std::time::Duration;

/// Broad classification of a [`LuminaError`].
///
/// Callers that only care about "was the input bad or did the edit fail"
/// can match on this instead of the full error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A transport string did not have the `data:<type>;base64,<payload>` shape.
    MalformedInput,
    /// The edit service could not produce a usable image.
    EditFailed,
    /// Reading or writing a local file failed.
    Io,
}

/// Errors that can occur while encoding, editing or saving images.
#[derive(Debug, thiserror::Error)]
pub enum LuminaError {
    /// Transport string does not match the expected shape.
    #[error("invalid transport string: {0}")]
    MalformedInput(String),

    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Server-suggested delay, if any.
        retry_after: Option<Duration>,
    },

    /// Prompt or output was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The model answered without any inline image.
    #[error("No image data found in response. The model might have refused the request or returned text only.")]
    NoImageData,

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (reading the source image, saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LuminaError {
    /// Returns the broad kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::Io(_) => ErrorKind::Io,
            Self::Auth(_)
            | Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::ContentBlocked(_)
            | Self::NoImageData
            | Self::InvalidRequest(_)
            | Self::Network(_)
            | Self::Decode(_)
            | Self::Json(_) => ErrorKind::EditFailed,
        }
    }

    /// Returns the suggested retry delay, if the service sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for image editing operations.
pub type Result<T> = std::result::Result<T, LuminaError>;

/// Maximum length of an API error body kept in an error message.
const MAX_ERROR_BODY: usize = 500;

/// Trims an API error body down to something fit for a status line.
///
/// Prefers `error.message` when the body is a Google-style JSON error,
/// collapses whitespace and truncates long bodies.
pub(crate) fn sanitize_error_message(body: &str) -> String {
    let extracted = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());

    let collapsed = extracted.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_ERROR_BODY {
        let truncated: String = collapsed.chars().take(MAX_ERROR_BODY).collect();
        format!("{truncated}...")
    } else {
        collapsed
    }
}

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}
