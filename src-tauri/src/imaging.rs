//! Turns fetched image payloads into `data:` URLs for the viewer modal.
//!
//! Anything over 2048px on the longest edge is downscaled before crossing
//! the bridge; full-resolution processed images can be tens of megabytes
//! once base64-inflated.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::info;

use crate::api::types::ImagePayload;
use crate::error::SightlineError;

/// Maximum dimension (width or height) for images handed to the viewer.
pub const MAX_VIEWER_DIMENSION: u32 = 2048;

/// Decode, validate, and if needed downscale a payload into a `data:` URL.
///
/// Small images pass through with their original bytes and content type;
/// oversized ones are re-encoded as PNG after resizing.
pub fn payload_to_data_url(payload: &ImagePayload) -> Result<String, SightlineError> {
    let encoded = payload.base64_image.trim();
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| SightlineError::Image(format!("invalid base64 image data: {}", e)))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| SightlineError::Image(format!("could not decode image: {}", e)))?;
    info!("Decoded {}x{} image ({} bytes)", img.width(), img.height(), bytes.len());

    if img.width() <= MAX_VIEWER_DIMENSION && img.height() <= MAX_VIEWER_DIMENSION {
        return Ok(format!("data:{};base64,{}", payload.content_type, encoded));
    }

    let resized = downscale(img, MAX_VIEWER_DIMENSION);
    info!("Downscaled to {}x{} for viewer", resized.width(), resized.height());
    let png_bytes = encode_to_png(&resized)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png_bytes)))
}

/// Resize so the longest edge equals `max_dimension`, keeping aspect ratio.
fn downscale(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let scale = max_dimension as f32 / width.max(height) as f32;
    let new_width = (width as f32 * scale) as u32;
    let new_height = (height as f32 * scale) as u32;
    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

fn encode_to_png(img: &DynamicImage) -> Result<Vec<u8>, SightlineError> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| SightlineError::Image(format!("failed to re-encode image: {}", e)))?;
    Ok(buffer.into_inner())
}
