use std::sync::Arc;

use adforge_core::hash::hash_frame;
use adforge_core::{AdDescription, Color, FrameBuffer, RenderMode};
use adforge_render::{Background, Compositor, FontBook};

/// Render `ad` and return the frame's content hash hex string.
fn render_hash(ad: &AdDescription, mode: RenderMode, background: Background<'_>) -> String {
    let mut compositor = Compositor::raster(Arc::new(FontBook::new()), mode);
    compositor
        .render_sync(ad, background)
        .expect("render should succeed in conformance test");
    hash_frame(compositor.frame().unwrap()).to_hex()
}

fn ad_json(layout: &str) -> AdDescription {
    AdDescription::from_json(&format!(
        r##"{{
            "title": "Summer Collection",
            "subtitle": "Up to 50% off everything",
            "ctaText": "Shop Now",
            "primaryColor": "#1A73E8",
            "accentColor": "#FBBC04",
            "layout": "{}"
        }}"##,
        layout
    ))
    .unwrap()
}

#[test]
fn test_conformance_01_deterministic_output() {
    for layout in ["centered", "left-aligned", "bottom-overlay", "split-screen"] {
        for mode in [RenderMode::Export, RenderMode::Edit] {
            let ad = ad_json(layout);
            let first = render_hash(&ad, mode, Background::Gradient);
            let second = render_hash(&ad, mode, Background::Gradient);
            assert_eq!(first, second, "{} / {} is not deterministic", layout, mode);
        }
    }
}

#[test]
fn test_conformance_02_layouts_differ() {
    let hashes: Vec<_> = ["centered", "left-aligned", "bottom-overlay", "split-screen"]
        .iter()
        .map(|layout| render_hash(&ad_json(layout), RenderMode::Export, Background::Gradient))
        .collect();
    for i in 0..hashes.len() {
        for j in i + 1..hashes.len() {
            assert_ne!(hashes[i], hashes[j]);
        }
    }
}

#[test]
fn test_conformance_03_unknown_layout_renders_as_centered() {
    for mode in [RenderMode::Export, RenderMode::Edit] {
        let unknown = render_hash(&ad_json("unknown-value"), mode, Background::Gradient);
        let centered = render_hash(&ad_json("centered"), mode, Background::Gradient);
        assert_eq!(unknown, centered, "fallback differs in {} mode", mode);
    }
}

#[test]
fn test_conformance_04_missing_layout_renders_as_centered() {
    let ad = AdDescription::from_json(r#"{"title": "Hello", "ctaText": "Go"}"#).unwrap();
    let explicit = AdDescription::new("Hello", "Go");
    assert_eq!(
        render_hash(&ad, RenderMode::Edit, Background::Gradient),
        render_hash(&explicit, RenderMode::Edit, Background::Gradient)
    );
}

#[test]
fn test_conformance_05_background_image_changes_output() {
    let ad = ad_json("centered");
    let image = FrameBuffer::solid(64, 48, &Color::rgb(0.0, 1.0, 0.0));
    assert_ne!(
        render_hash(&ad, RenderMode::Export, Background::Image(&image)),
        render_hash(&ad, RenderMode::Export, Background::Gradient)
    );
}

#[test]
fn test_conformance_06_foreground_over_background() {
    let magenta = [255, 0, 255, 255];
    let image = FrameBuffer::solid(10, 10, &Color::from_rgba8(255, 0, 255, 255));
    let ad = AdDescription::new("Title", "Go").with_colors("#112233", "#EA4335");

    let mut compositor = Compositor::raster(Arc::new(FontBook::new()), RenderMode::Export);
    compositor.render_sync(&ad, Background::Image(&image)).unwrap();
    let frame = compositor.frame().unwrap();

    // Corner is untouched background.
    assert_eq!(frame.get_pixel(5, 5), Some(magenta));
    // CTA button (270 x 67.5 centered at (540, 720)) covers the image.
    assert_eq!(frame.get_pixel(420, 720), Some([0xEA, 0x43, 0x35, 255]));
    // The translucent export backdrop lightens the image without hiding it.
    let backdrop = frame.get_pixel(150, 300).unwrap();
    assert_ne!(backdrop, magenta);
    assert!(backdrop[1] > 200, "backdrop should be mostly white: {:?}", backdrop);
}

#[test]
fn test_conformance_07_invalid_colors_use_defaults() {
    let broken = AdDescription::new("Hello", "Go").with_colors("blue", "#12");
    let defaults = AdDescription::new("Hello", "Go");
    assert_eq!(
        render_hash(&broken, RenderMode::Edit, Background::Gradient),
        render_hash(&defaults, RenderMode::Edit, Background::Gradient)
    );
}

#[test]
fn test_conformance_08_export_png_matches_frame() {
    let mut compositor = Compositor::raster(Arc::new(FontBook::new()), RenderMode::Export);
    compositor
        .render_sync(&ad_json("split-screen"), Background::Gradient)
        .unwrap();
    let png = compositor.export_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (1080, 1080));
    assert_eq!(decoded.into_raw(), compositor.frame().unwrap().data);
}
