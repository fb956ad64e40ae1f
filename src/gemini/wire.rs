//! Request/response bodies of the Gemini `generateContent` endpoint.
//!
//! Only the fields the edit flow reads or writes are modelled; everything
//! else in the response is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; an edit always sends exactly one.
    pub contents: Vec<Content>,
    /// Generation settings.
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Builds an edit request: the source image first, then the instruction.
    pub fn edit(media_type: &str, payload: &str, instruction: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: Blob {
                            mime_type: media_type.to_string(),
                            data: payload.to_string(),
                        },
                    },
                    RequestPart::Text {
                        text: instruction.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

/// One turn of request content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Ordered parts of the turn.
    pub parts: Vec<RequestPart>,
}

/// A part in a request: text or inline image data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestPart {
    /// Plain text instruction.
    Text {
        /// The text.
        text: String,
    },
    /// Base64 image bytes with their media type.
    InlineData {
        /// The blob.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

/// Inline binary data in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// Media type of `data`.
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

/// Generation settings sent with every edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Output modalities requested from the model.
    pub response_modalities: Vec<String>,
}

/// Body returned by `generateContent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Output candidates, best first.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Present when the prompt itself was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// A response with a single candidate holding one inline image.
    pub fn with_inline_image(mime_type: Option<&str>, data: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(CandidateContent {
                    parts: vec![ResponsePart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.map(str::to_string),
                            data: data.into(),
                        }),
                    }],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        }
    }
}

/// One output candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content, absent when generation was stopped early.
    #[serde(default)]
    pub content: Option<CandidateContent>,
    /// Why generation stopped (`STOP`, `IMAGE_SAFETY`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateContent {
    /// Ordered output parts.
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// One output part; text, inline data, or neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    /// Text output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline binary output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Inline binary data in a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Declared media type; may be missing.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Base64-encoded bytes.
    #[serde(default)]
    pub data: String,
}

/// Prompt-level block information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Block reason such as `SAFETY`.
    #[serde(default)]
    pub block_reason: Option<String>,
    /// Human readable explanation.
    #[serde(default)]
    pub block_reason_message: Option<String>,
}
