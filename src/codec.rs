//! Transport-string codec.
//!
//! Images travel between the session, the edit client and disk as `data:` URLs
//! of the form `data:<media type>;base64,<payload>`. This module builds them
//! from raw bytes or files and splits them back into media type and payload.

use crate::error::{LuminaError, Result};
use crate::image::ImageFormat;
use base64::Engine;
use std::path::Path;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// A parsed transport string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type, e.g. `image/png`.
    pub media_type: String,
    /// Base64 payload, exactly as it appeared in the transport string.
    pub payload: String,
}

impl DataUrl {
    /// Decodes the base64 payload into raw bytes.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.payload)
            .map_err(|e| LuminaError::Decode(e.to_string()))
    }
}

/// Wraps raw bytes into a transport string, keeping `media_type` verbatim.
pub fn encode(data: &[u8], media_type: &str) -> String {
    format!(
        "{SCHEME}{media_type}{BASE64_MARKER}{}",
        base64::engine::general_purpose::STANDARD.encode(data)
    )
}

/// Reads an image file and wraps it into a transport string.
///
/// The media type comes from the file extension, falling back to the magic
/// bytes. Only files that resolve to no `image/*` type are rejected.
pub fn encode_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let media_type = media_type(path, &data).ok_or_else(|| {
        LuminaError::InvalidRequest(format!("not an image file: {}", path.display()))
    })?;

    tracing::debug!(
        path = %path.display(),
        media_type,
        size_bytes = data.len(),
        "encoded image file"
    );
    Ok(encode(&data, media_type))
}

/// Resolves the `image/*` media type of a file.
pub fn media_type(path: &Path, data: &[u8]) -> Option<&'static str> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(media_type_from_extension)
        .or_else(|| media_type_from_magic(data))
}

fn media_type_from_extension(ext: &str) -> Option<&'static str> {
    if let Some(format) = ImageFormat::from_extension(ext) {
        return Some(format.mime_type());
    }
    match ext.to_lowercase().as_str() {
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "svg" => Some("image/svg+xml"),
        _ => ::image::ImageFormat::from_extension(ext)
            .map(|f| f.to_mime_type())
            .filter(|m| m.starts_with("image/")),
    }
}

fn media_type_from_magic(data: &[u8]) -> Option<&'static str> {
    if let Some(format) = ImageFormat::from_magic_bytes(data) {
        return Some(format.mime_type());
    }
    // ISO-BMFF: ....ftyp<brand>
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        match &data[8..12] {
            b"heic" | b"heix" | b"heim" | b"heis" => return Some("image/heic"),
            b"mif1" | b"msf1" => return Some("image/heif"),
            _ => {}
        }
    }
    ::image::guess_format(data)
        .ok()
        .map(|f| f.to_mime_type())
        .filter(|m| m.starts_with("image/"))
}

/// Splits a transport string into media type and payload.
///
/// Anything other than `data:<type>/<subtype>;base64,<payload>` with a
/// single-line, non-empty payload is a [`LuminaError::MalformedInput`].
pub fn decode(transport: &str) -> Result<DataUrl> {
    let rest = transport
        .strip_prefix(SCHEME)
        .ok_or_else(|| malformed("missing `data:` scheme"))?;

    let (media_type, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| malformed("missing `;base64,` marker"))?;

    if !is_media_type(media_type) {
        return Err(malformed("media type is not of the form type/subtype"));
    }
    if payload.is_empty() {
        return Err(malformed("empty payload"));
    }
    if payload.contains(['\n', '\r']) {
        return Err(malformed("payload spans multiple lines"));
    }

    Ok(DataUrl {
        media_type: media_type.to_string(),
        payload: payload.to_string(),
    })
}

fn malformed(reason: &str) -> LuminaError {
    LuminaError::MalformedInput(reason.to_string())
}

fn is_media_type(s: &str) -> bool {
    let Some((top, sub)) = s.split_once('/') else {
        return false;
    };
    !top.is_empty()
        && top.chars().all(|c| c.is_ascii_alphanumeric())
        && !sub.is_empty()
        && sub
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'))
}
