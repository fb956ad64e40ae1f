//! Edit service client: one image plus one instruction in, one image out.

use crate::codec;
use crate::error::{LuminaError, Result};
use crate::gemini::wire::{GenerateContentRequest, GenerateContentResponse, InlineData};
use crate::gemini::{GeminiModel, GeminiTransport, HttpTransport};
use crate::image::{EditMetadata, EditedImage, DEFAULT_MEDIA_TYPE};
use base64::Engine;
use std::time::Instant;

/// Finish reasons that mean the output was withheld by a safety filter.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
    "IMAGE_RECITATION",
    "RECITATION",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
];

/// Client for the external image-editing model.
///
/// The transport is injected, so one client can be shared by a session and
/// swapped for a fake in tests.
#[derive(Debug)]
pub struct EditClient<T> {
    transport: T,
    model: GeminiModel,
}

impl EditClient<HttpTransport> {
    /// Builds a client over [`HttpTransport`] with the key taken from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(HttpTransport::builder().build()?))
    }
}

impl<T: GeminiTransport> EditClient<T> {
    /// Creates a client using the default model.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            model: GeminiModel::default(),
        }
    }

    /// Sets the Gemini model variant.
    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Returns the configured model.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Checks the model is reachable with the configured credentials.
    pub async fn health_check(&self) -> Result<()> {
        self.transport.health_check(self.model.as_str()).await
    }

    /// Edits `original` (a transport string) according to `instruction`.
    ///
    /// Returns the edited image re-wrapped as a transport string.
    pub async fn edit_image(&self, original: &str, instruction: &str) -> Result<String> {
        Ok(self.edit(original, instruction).await?.to_transport_string())
    }

    /// Like [`edit_image`](Self::edit_image), but returns raw bytes and metadata.
    pub async fn edit(&self, original: &str, instruction: &str) -> Result<EditedImage> {
        let start = Instant::now();
        let source = codec::decode(original)?;
        if instruction.is_empty() {
            return Err(LuminaError::InvalidRequest(
                "edit instruction must not be empty".into(),
            ));
        }

        let request = GenerateContentRequest::edit(&source.media_type, &source.payload, instruction);

        tracing::debug!(
            model = self.model.as_str(),
            media_type = %source.media_type,
            payload_len = source.payload.len(),
            "submitting edit request"
        );
        let response = self
            .transport
            .generate_content(self.model.as_str(), &request)
            .await?;

        let (inline, finish_reason) = first_inline_image(response)?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| LuminaError::Decode(e.to_string()))?;
        let media_type = inline
            .mime_type
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            media_type = %media_type,
            size_bytes = data.len(),
            duration_ms,
            "edit complete"
        );

        Ok(EditedImage::new(
            data,
            media_type,
            EditMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
                finish_reason,
            },
        ))
    }
}

/// Picks the first inline image of the first candidate.
///
/// Later parts and later candidates are ignored even if they carry images.
fn first_inline_image(response: GenerateContentResponse) -> Result<(InlineData, Option<String>)> {
    if let Some(ref feedback) = response.prompt_feedback {
        if let Some(ref reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
            return Err(LuminaError::ContentBlocked(msg));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(LuminaError::NoImageData)?;

    if let Some(ref reason) = candidate.finish_reason {
        if BLOCKED_FINISH_REASONS.contains(&reason.as_str()) {
            return Err(LuminaError::ContentBlocked(format!(
                "Content blocked by Gemini safety filter: {}",
                reason
            )));
        }
    }

    let inline = candidate
        .content
        .into_iter()
        .flat_map(|c| c.parts)
        .filter_map(|p| p.inline_data)
        .find(|d| !d.data.is_empty())
        .ok_or(LuminaError::NoImageData)?;

    Ok((inline, candidate.finish_reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::gemini::wire::{Candidate, CandidateContent, PromptFeedback, RequestPart, ResponsePart};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SOURCE: &str = "data:image/jpeg;base64,/9j/AAAA";

    /// Replays one canned response and records what was sent.
    struct CannedTransport {
        response: Mutex<Option<Result<GenerateContentResponse>>>,
        seen: Mutex<Vec<(String, GenerateContentRequest)>>,
    }

    impl CannedTransport {
        fn new(response: Result<GenerateContentResponse>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GeminiTransport for CannedTransport {
        async fn generate_content(
            &self,
            model: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.seen
                .lock()
                .unwrap()
                .push((model.to_string(), request.clone()));
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("only one request per edit")
        }

        async fn health_check(&self, _model: &str) -> Result<()> {
            Ok(())
        }
    }

    fn client(response: Result<GenerateContentResponse>) -> EditClient<CannedTransport> {
        EditClient::new(CannedTransport::new(response))
    }

    fn image_part(mime: Option<&str>, data: &str) -> ResponsePart {
        ResponsePart {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime.map(str::to_string),
                data: data.to_string(),
            }),
        }
    }

    fn text_part(text: &str) -> ResponsePart {
        ResponsePart {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn single_candidate(parts: Vec<ResponsePart>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(CandidateContent { parts }),
                finish_reason: Some("STOP".into()),
            }],
            prompt_feedback: None,
        }
    }

    #[tokio::test]
    async fn test_edit_sends_image_then_instruction() {
        let client = client(Ok(GenerateContentResponse::with_inline_image(
            Some("image/png"),
            "iVBORw0KGgo=",
        )));
        let out = client.edit_image(SOURCE, "add a hat").await.unwrap();
        assert_eq!(out, "data:image/png;base64,iVBORw0KGgo=");

        let seen = client.transport().seen.lock().unwrap();
        let (model, request) = &seen[0];
        assert_eq!(model, "gemini-2.5-flash-image");
        match &request.contents[0].parts[..] {
            [RequestPart::InlineData { inline_data }, RequestPart::Text { text }] => {
                assert_eq!(inline_data.mime_type, "image/jpeg");
                assert_eq!(inline_data.data, "/9j/AAAA");
                assert_eq!(text, "add a hat");
            }
            other => panic!("unexpected parts: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_edit_uses_configured_model() {
        let client = client(Ok(GenerateContentResponse::with_inline_image(None, "AAAA")))
            .with_model(GeminiModel::NanoBananaPro);
        let _image = client.edit(SOURCE, "sharpen").await.unwrap();
        assert_eq!(
            client.transport().seen.lock().unwrap()[0].0,
            "nano-banana-pro-preview"
        );
    }

    #[tokio::test]
    async fn test_missing_mime_type_defaults_to_png() {
        let undeclared = client(Ok(GenerateContentResponse::with_inline_image(None, "AAAA")));
        let image = undeclared.edit(SOURCE, "x").await.unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.metadata.finish_reason.as_deref(), Some("STOP"));

        let empty = client(Ok(GenerateContentResponse::with_inline_image(Some(""), "AAAA")));
        assert!(empty
            .edit_image(SOURCE, "x")
            .await
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_takes_first_inline_image() {
        let client = client(Ok(single_candidate(vec![
            text_part("Sure, here you go"),
            image_part(Some("image/webp"), ""),
            image_part(Some("image/jpeg"), "AAAA"),
            image_part(Some("image/png"), "BBBB"),
        ])));
        let out = client.edit_image(SOURCE, "x").await.unwrap();
        assert_eq!(out, "data:image/jpeg;base64,AAAA");
    }

    #[tokio::test]
    async fn test_zero_candidates_is_no_image() {
        let client = client(Ok(GenerateContentResponse::default()));
        let err = client.edit_image(SOURCE, "x").await.unwrap_err();
        assert!(matches!(err, LuminaError::NoImageData));
        assert_eq!(err.kind(), ErrorKind::EditFailed);
    }

    #[tokio::test]
    async fn test_text_only_is_no_image() {
        let client = client(Ok(single_candidate(vec![text_part("I can't do that")])));
        let err = client.edit_image(SOURCE, "x").await.unwrap_err();
        assert!(matches!(err, LuminaError::NoImageData));
    }

    #[tokio::test]
    async fn test_only_first_candidate_is_considered() {
        let client = client(Ok(GenerateContentResponse {
            candidates: vec![
                Candidate {
                    content: Some(CandidateContent {
                        parts: vec![text_part("no")],
                    }),
                    finish_reason: None,
                },
                Candidate {
                    content: Some(CandidateContent {
                        parts: vec![image_part(Some("image/png"), "AAAA")],
                    }),
                    finish_reason: None,
                },
            ],
            prompt_feedback: None,
        }));
        assert!(matches!(
            client.edit_image(SOURCE, "x").await,
            Err(LuminaError::NoImageData)
        ));
    }

    #[tokio::test]
    async fn test_prompt_feedback_block() {
        let client = client(Ok(GenerateContentResponse {
            candidates: vec![],
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some("SAFETY".into()),
                block_reason_message: None,
            }),
        }));
        match client.edit_image(SOURCE, "x").await {
            Err(LuminaError::ContentBlocked(msg)) => assert_eq!(msg, "Prompt blocked: SAFETY"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_safety_finish_reason() {
        let client = client(Ok(GenerateContentResponse {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some("IMAGE_SAFETY".into()),
            }],
            prompt_feedback: None,
        }));
        let err = client.edit_image(SOURCE, "x").await.unwrap_err();
        assert!(matches!(err, LuminaError::ContentBlocked(_)));
    }

    #[tokio::test]
    async fn test_invalid_base64_in_response() {
        let client = client(Ok(GenerateContentResponse::with_inline_image(
            Some("image/png"),
            "***",
        )));
        assert!(matches!(
            client.edit_image(SOURCE, "x").await,
            Err(LuminaError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let client = client(Err(LuminaError::Api {
            status: 503,
            message: "overloaded".into(),
        }));
        let err = client.edit_image(SOURCE, "x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EditFailed);
        assert_eq!(err.to_string(), "API error: 503 - overloaded");
    }

    #[tokio::test]
    async fn test_preconditions_checked_before_sending() {
        let client = client(Ok(GenerateContentResponse::default()));

        let err = client.edit_image("not a data url", "x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        let err = client.edit_image(SOURCE, "").await.unwrap_err();
        assert!(matches!(err, LuminaError::InvalidRequest(_)));

        assert_eq!(client.transport().requests(), 0);
    }
}
