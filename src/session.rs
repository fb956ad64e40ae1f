//! Application state for one editing session.
//!
//! [`EditSession`] owns the single [`EditState`] and is the only thing that
//! changes it. Every transition replaces the state value wholesale.
//!
//! Generations are tracked with tickets. A ticket remembers the session epoch
//! it was issued in; [`EditSession::select_image`] and [`EditSession::reset`]
//! advance the epoch, so a response that arrives afterwards is dropped instead
//! of overwriting the newer state.

use crate::edit::EditClient;
use crate::error::Result;
use crate::gemini::GeminiTransport;
use serde::Serialize;

/// Message stored when a failed generation carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong while generating the image.";

/// Prefix of every stored failure that carries its own message.
pub const FAILURE_PREFIX: &str = "AI Editing Failed: ";

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditState {
    /// Source image as a transport string.
    pub original_image: Option<String>,
    /// Latest edit result as a transport string.
    pub generated_image: Option<String>,
    /// Edit instruction, stored verbatim.
    pub prompt: String,
    /// True while a generation is outstanding.
    pub is_generating: bool,
    /// Message of the most recent failure.
    pub error: Option<String>,
}

/// Proof that a generation was started, handed back on settlement.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a started generation must be settled with finish_generate"]
pub struct GenerationTicket {
    id: u64,
    epoch: u64,
    original: String,
    prompt: String,
}

impl GenerationTicket {
    /// Source image captured when the generation started.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Instruction captured when the generation started.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Sequence number of this generation within the session.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// What [`EditSession::finish_generate`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The edited image was stored.
    Succeeded,
    /// The failure message was stored.
    Failed,
    /// The session moved on since the ticket was issued; result dropped.
    Discarded,
}

/// State controller for one editing session.
#[derive(Debug, Default)]
pub struct EditSession {
    state: EditState,
    epoch: u64,
    issued: u64,
    in_flight: Option<u64>,
}

impl EditSession {
    /// Creates a session in the empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// Consumes the session, returning its final state.
    pub fn into_state(self) -> EditState {
        self.state
    }

    /// Whether the generate trigger should be enabled.
    pub fn can_generate(&self) -> bool {
        self.state.original_image.is_some()
            && !self.state.prompt.trim().is_empty()
            && !self.state.is_generating
    }

    /// Whether there is a result to download.
    pub fn can_download(&self) -> bool {
        self.state.generated_image.is_some()
    }

    /// Selects a new source image, clearing any previous result and error.
    ///
    /// A generation still in flight keeps `is_generating` set until it
    /// settles, but its result will be discarded.
    pub fn select_image(&mut self, transport: impl Into<String>) {
        self.epoch += 1;
        self.state = EditState {
            original_image: Some(transport.into()),
            generated_image: None,
            error: None,
            ..std::mem::take(&mut self.state)
        };
    }

    /// Replaces the instruction text verbatim.
    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.state = EditState {
            prompt: text.into(),
            ..std::mem::take(&mut self.state)
        };
    }

    /// Returns to the empty state and orphans any in-flight generation.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
        self.state = EditState::default();
    }

    /// Starts a generation if one is allowed.
    ///
    /// Returns `None`, leaving the state untouched, when there is no source
    /// image, the prompt is empty, or another generation is outstanding.
    pub fn begin_generate(&mut self) -> Option<GenerationTicket> {
        let original = match (&self.state.original_image, self.state.prompt.is_empty()) {
            (Some(original), false) => original.clone(),
            _ => {
                tracing::debug!("generate ignored: missing image or prompt");
                return None;
            }
        };
        if let Some(id) = self.in_flight {
            tracing::debug!(in_flight = id, "generate ignored: generation already in flight");
            return None;
        }

        self.issued += 1;
        let ticket = GenerationTicket {
            id: self.issued,
            epoch: self.epoch,
            original,
            prompt: self.state.prompt.clone(),
        };
        self.in_flight = Some(ticket.id);
        self.state = EditState {
            is_generating: true,
            error: None,
            ..std::mem::take(&mut self.state)
        };
        Some(ticket)
    }

    /// Settles a generation started by [`begin_generate`](Self::begin_generate).
    pub fn finish_generate(&mut self, ticket: GenerationTicket, result: Result<String>) -> Settlement {
        let was_in_flight = self.in_flight == Some(ticket.id);
        if was_in_flight {
            self.in_flight = None;
        }

        if ticket.epoch != self.epoch {
            tracing::warn!(
                generation = ticket.id,
                "discarding result of a generation started before the last reset or image change"
            );
            if was_in_flight {
                self.state = EditState {
                    is_generating: false,
                    ..std::mem::take(&mut self.state)
                };
            }
            return Settlement::Discarded;
        }

        match result {
            Ok(image) => {
                self.state = EditState {
                    generated_image: Some(image),
                    is_generating: false,
                    ..std::mem::take(&mut self.state)
                };
                Settlement::Succeeded
            }
            Err(err) => {
                let message = failure_message(err.to_string());
                tracing::debug!(generation = ticket.id, kind = ?err.kind(), "generation failed");
                self.state = EditState {
                    is_generating: false,
                    error: Some(message),
                    ..std::mem::take(&mut self.state)
                };
                Settlement::Failed
            }
        }
    }

    /// Runs one full generation against `client`.
    ///
    /// Returns `None` when the guard in [`begin_generate`](Self::begin_generate)
    /// turned the call into a no-op. Errors never escape; they end up in
    /// [`EditState::error`].
    pub async fn generate<T: GeminiTransport>(
        &mut self,
        client: &EditClient<T>,
    ) -> Option<Settlement> {
        let ticket = self.begin_generate()?;
        let result = client.edit_image(ticket.original(), ticket.prompt()).await;
        Some(self.finish_generate(ticket, result))
    }
}

fn failure_message(detail: String) -> String {
    if detail.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        format!("{FAILURE_PREFIX}{detail}")
    }
}
