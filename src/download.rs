//! Saving edited images to disk.

use crate::codec;
use crate::error::{LuminaError, Result};
use crate::image::ImageFormat;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix of generated download names.
pub const FILENAME_PREFIX: &str = "lumina-edit";

/// Returns `lumina-edit-<unix millis>.<ext>` for an image of `media_type`.
///
/// Unknown media types get a `.png` extension.
pub fn suggested_filename(media_type: &str, at: SystemTime) -> String {
    let millis = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let ext = ImageFormat::from_mime_type(media_type)
        .unwrap_or_default()
        .extension();
    format!("{FILENAME_PREFIX}-{millis}.{ext}")
}

/// Decodes `transport` and writes the image bytes to `path`.
///
/// Returns the number of bytes written.
pub fn save(transport: &str, path: impl AsRef<Path>) -> Result<usize> {
    let data = codec::decode(transport)?.bytes()?;
    if data.is_empty() {
        return Err(LuminaError::Decode("empty image payload".into()));
    }
    std::fs::write(path.as_ref(), &data)?;
    tracing::debug!(path = %path.as_ref().display(), size_bytes = data.len(), "saved image");
    Ok(data.len())
}

/// Saves `transport` into `dir` under a timestamped name.
pub fn save_to_dir(transport: &str, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let url = codec::decode(transport)?;
    let path = dir
        .as_ref()
        .join(suggested_filename(&url.media_type, SystemTime::now()));
    save(transport, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::time::Duration;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lumina-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_suggested_filename() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(
            suggested_filename("image/png", at),
            "lumina-edit-1700000000123.png"
        );
        assert_eq!(
            suggested_filename("image/jpeg", at),
            "lumina-edit-1700000000123.jpg"
        );
        assert_eq!(
            suggested_filename("image/x-unknown", at),
            "lumina-edit-1700000000123.png"
        );
    }

    #[test]
    fn test_save_writes_decoded_bytes() {
        let dir = scratch_dir("save");
        let path = dir.join("out.png");
        let written = save(&codec::encode(b"\x89PNG-ish", "image/png"), &path).unwrap();
        assert_eq!(written, 8);
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG-ish");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_to_dir_names_by_media_type() {
        let dir = scratch_dir("save-dir");
        let path = save_to_dir(&codec::encode(b"jpeg bytes", "image/jpeg"), &dir).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("lumina-edit-"));
        assert!(name.ends_with(".jpg"));
        assert!(path.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_rejects_malformed() {
        let err = save("not a data url", std::env::temp_dir().join("never.png")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }
}
