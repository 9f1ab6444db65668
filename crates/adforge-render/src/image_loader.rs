//! Background image loading.
//! Fetches a reference through an [`ImageSource`] and decodes PNG, JPEG and the
//! other formats `image` supports into FrameBuffers.

use adforge_core::frame::FrameBuffer;
use adforge_core::{AdError, AdResult, Rect};
use async_trait::async_trait;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;

/// Resolves a background reference to raw image bytes.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, reference: &str) -> AdResult<Vec<u8>>;
}

/// Serves `data:` URLs, `file://` URLs and plain file paths. Remote URLs are
/// not fetched.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalImageSource;

#[async_trait]
impl ImageSource for LocalImageSource {
    async fn fetch(&self, reference: &str) -> AdResult<Vec<u8>> {
        if reference.starts_with("data:") {
            return decode_data_url(reference);
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Err(AdError::asset("remote images are not supported", reference));
        }
        let path = reference.strip_prefix("file://").unwrap_or(reference);
        tokio::fs::read(path)
            .await
            .map_err(|e| AdError::asset(format!("failed to read image: {}", e), reference))
    }
}

/// Extract the payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> AdResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| AdError::asset("not a data URL", truncate(url)))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AdError::asset("data URL has no payload", truncate(url)))?;
    if !header.ends_with(";base64") {
        return Err(AdError::asset("only base64 data URLs are supported", truncate(url)));
    }
    BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| AdError::asset(format!("invalid base64 payload: {}", e), truncate(url)))
}

/// Data URLs can be megabytes long; keep error references readable.
fn truncate(reference: &str) -> String {
    const MAX: usize = 64;
    match reference.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &reference[..idx]),
        None => reference.to_string(),
    }
}

/// Decode raw bytes into an RGBA8 frame buffer.
pub fn decode_image(data: &[u8], reference: &str) -> AdResult<FrameBuffer> {
    let img = image::load_from_memory(data).map_err(|e| {
        AdError::asset(format!("failed to decode image: {}", e), truncate(reference))
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(AdError::asset("image has no pixels", truncate(reference)));
    }
    FrameBuffer::from_rgba8(width, height, rgba.into_raw())
        .ok_or_else(|| AdError::asset("decoded buffer size mismatch", truncate(reference)))
}

/// Fetch and decode a background reference.
pub async fn load_background(source: &dyn ImageSource, reference: &str) -> AdResult<FrameBuffer> {
    let data = source.fetch(reference).await?;
    let frame = decode_image(&data, reference)?;
    tracing::debug!(
        "decoded background {}x{} from {}",
        frame.width,
        frame.height,
        truncate(reference)
    );
    Ok(frame)
}

/// Destination rect that scales an `image_w x image_h` image uniformly to cover
/// a `surface_w x surface_h` surface, centered. Overhang is cropped by the
/// surface bounds.
pub fn cover_rect(image_w: u32, image_h: u32, surface_w: u32, surface_h: u32) -> Rect {
    let scale = (surface_w as f32 / image_w as f32).max(surface_h as f32 / image_h as f32);
    let width = image_w as f32 * scale;
    let height = image_h as f32 * scale;
    Rect::new(
        (surface_w as f32 - width) / 2.0,
        (surface_h as f32 - height) / 2.0,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::encode_png;
    use adforge_core::Color;

    fn png_data_url(fb: &FrameBuffer) -> String {
        format!("data:image/png;base64,{}", BASE64_STANDARD.encode(encode_png(fb).unwrap()))
    }

    #[test]
    fn test_cover_rect_wide_image() {
        // 200x100 on 100x100: scale 1.0 by height, overhang 50px on each side.
        let rect = cover_rect(200, 100, 100, 100);
        assert_eq!(rect, Rect::new(-50.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_cover_rect_small_image_upscales() {
        let rect = cover_rect(10, 20, 800, 600);
        assert_eq!(rect.width, 800.0);
        assert_eq!(rect.height, 1600.0);
        assert_eq!(rect.y, -500.0);
    }

    #[test]
    fn test_decode_data_url() {
        let bytes = decode_data_url("data:text/plain;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_data_url_rejects_plain_encoding() {
        let err = decode_data_url("data:image/svg+xml,%3Csvg%3E").unwrap_err();
        assert!(matches!(err, AdError::Asset { .. }));
    }

    #[test]
    fn test_decode_garbage_is_asset_error() {
        let err = decode_image(b"definitely not an image", "mem").unwrap_err();
        assert!(err.to_string().contains("failed to decode image"));
    }

    #[test]
    fn test_truncate_long_reference() {
        let long = format!("data:image/png;base64,{}", "A".repeat(500));
        let short = truncate(&long);
        assert!(short.len() < 80);
        assert!(short.ends_with("..."));
    }

    #[tokio::test]
    async fn test_local_source_data_url_round_trip() {
        let fb = FrameBuffer::solid(3, 2, &Color::rgb(1.0, 0.0, 0.0));
        let url = png_data_url(&fb);
        let decoded = load_background(&LocalImageSource, &url).await.unwrap();
        assert_eq!(decoded, fb);
    }

    #[tokio::test]
    async fn test_local_source_rejects_remote() {
        let err = LocalImageSource.fetch("https://example.com/bg.png").await.unwrap_err();
        assert!(matches!(err, AdError::Asset { .. }));
    }

    #[tokio::test]
    async fn test_local_source_reads_file_url() {
        let path = std::env::temp_dir().join(format!("adforge-bg-{}.png", std::process::id()));
        let fb = FrameBuffer::solid(2, 2, &Color::BLACK);
        std::fs::write(&path, encode_png(&fb).unwrap()).unwrap();

        let url = format!("file://{}", path.display());
        let decoded = load_background(&LocalImageSource, &url).await.unwrap();
        assert_eq!(decoded.width, 2);
        std::fs::remove_file(&path).ok();
    }
}
