//! Core types for image data moving through an edit.

use crate::codec;
use crate::error::{LuminaError, Result};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

/// Media type used when the service does not declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

/// Image formats recognised by extension or magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
    /// GIF format.
    Gif,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Maps a MIME type back to a known format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }

        None
    }
}

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimension {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimension {
    /// Reads the dimensions from an encoded image's header.
    ///
    /// Returns `None` for formats the header reader does not understand.
    pub fn from_header(data: &[u8]) -> Option<Self> {
        let (width, height) = ::image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()?;
        Some(Self { width, height })
    }
}

impl std::fmt::Display for ImageDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Metadata about one edit round-trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditMetadata {
    /// Model used for the edit.
    pub model: Option<String>,
    /// Request duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Finish reason reported for the chosen candidate.
    pub finish_reason: Option<String>,
}

/// An edited image returned by the service.
#[derive(Debug, Clone)]
#[must_use = "edited image should be stored or saved"]
pub struct EditedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Media type declared by the service (or [`DEFAULT_MEDIA_TYPE`]).
    pub media_type: String,
    /// Edit metadata.
    pub metadata: EditMetadata,
}

impl EditedImage {
    /// Creates a new edited image.
    pub fn new(data: Vec<u8>, media_type: impl Into<String>, metadata: EditMetadata) -> Self {
        Self {
            data,
            media_type: media_type.into(),
            metadata,
        }
    }

    /// Returns the known format for the declared media type, if any.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.media_type)
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the raw image bytes to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Returns the image as a transport string.
    pub fn to_transport_string(&self) -> String {
        codec::encode(&self.data, &self.media_type)
    }

    /// Rebuilds an edited image from a transport string.
    pub fn from_transport_string(transport: &str) -> Result<Self> {
        let url = codec::decode(transport)?;
        let data = url.bytes()?;
        if data.is_empty() {
            return Err(LuminaError::Decode("empty image payload".into()));
        }
        Ok(Self::new(data, url.media_type, EditMetadata::default()))
    }
}
