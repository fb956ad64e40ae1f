#![warn(missing_docs)]
//! Lumina - edit images with natural-language instructions.
//!
//! An image travels through the crate as a transport string
//! (`data:<media type>;base64,<payload>`). An [`EditSession`] holds the
//! current source image, prompt and result; an [`EditClient`] sends one
//! source image plus one instruction to Gemini and returns the edited image.
//!
//! # Quick Start
//!
//! ```no_run
//! use lumina::{codec, EditClient, EditSession};
//!
//! #[tokio::main]
//! async fn main() -> lumina::Result<()> {
//!     let client = EditClient::from_env()?;
//!     let mut session = EditSession::new();
//!
//!     session.select_image(codec::encode_file("cat.png")?);
//!     session.set_prompt("Give the cat a tiny wizard hat");
//!     session.generate(&client).await;
//!
//!     match &session.state().generated_image {
//!         Some(image) => {
//!             lumina::download::save_to_dir(image, ".")?;
//!         }
//!         None => eprintln!("{}", session.state().error.as_deref().unwrap_or_default()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `lumina` command-line front end.

mod error;

pub mod codec;
pub mod download;
pub mod edit;
pub mod gemini;
pub mod image;
pub mod presets;
pub mod session;

// Re-export error types at crate root
pub use error::{ErrorKind, LuminaError, Result};

pub use codec::DataUrl;
pub use edit::EditClient;
pub use gemini::{GeminiModel, GeminiTransport, HttpTransport, HttpTransportBuilder};
pub use crate::image::{EditMetadata, EditedImage, ImageDimension, ImageFormat};
pub use session::{EditSession, EditState, GenerationTicket, Settlement};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorKind, LuminaError, Result};
    pub use crate::{codec, download, presets};
    pub use crate::{EditClient, EditSession, EditState, GeminiModel, GeminiTransport};
}
