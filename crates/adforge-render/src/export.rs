//! PNG export of rendered frames.

use std::path::Path;

use adforge_core::frame::FrameBuffer;
use adforge_core::{AdError, AdResult};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

/// Encode a frame as a lossless PNG at its native resolution.
pub fn encode_png(frame: &FrameBuffer) -> AdResult<Vec<u8>> {
    if frame.is_empty() {
        return Err(AdError::Encode(format!(
            "cannot encode a {}x{} frame",
            frame.width, frame.height
        )));
    }
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&frame.data, frame.width, frame.height, ExtendedColorType::Rgba8)
        .map_err(|e| AdError::Encode(e.to_string()))?;
    Ok(out)
}

/// Encode a frame as a `data:image/png;base64,...` URL.
pub fn to_data_url(frame: &FrameBuffer) -> AdResult<String> {
    let png = encode_png(frame)?;
    Ok(format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png)))
}

/// Encode a frame and write it to `path`.
pub fn save_png(frame: &FrameBuffer, path: &Path) -> AdResult<()> {
    let png = encode_png(frame)?;
    std::fs::write(path, &png)?;
    tracing::info!("Exported {}x{} PNG to {}", frame.width, frame.height, path.display());
    Ok(())
}
