//! Uploaded image → JPEG data URI for vision requests.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, ImageFormat};

use crate::error::MedQaError;

/// Decodes any supported image, flattens it to RGB and re-encodes it as a
/// base64 JPEG `data:` URI.
///
/// Blocking; run inside `spawn_blocking`.
///
/// # Errors
/// [`MedQaError::Image`] when the bytes are not a decodable image.
pub fn to_jpeg_data_uri(bytes: &[u8]) -> Result<String, MedQaError> {
    let decoded = image::load_from_memory(bytes)?;
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut jpeg = Cursor::new(Vec::new());
    rgb.write_to(&mut jpeg, ImageFormat::Jpeg)?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        BASE64.encode(jpeg.into_inner())
    ))
}
