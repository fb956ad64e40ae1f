//! Image data types.

mod types;

pub use types::{EditMetadata, EditedImage, ImageDimension, ImageFormat, DEFAULT_MEDIA_TYPE};
