//! Text measurement, greedy wrapping and line rasterization.
//!
//! Two kinds of faces are available:
//! - the built-in `sans` family, a fixed metric table (every character
//!   advances `0.6 em`) drawn from the `font8x8` bitmap glyphs, always present
//!   so layouts render identically on every host;
//! - TrueType/OpenType faces registered at runtime and rasterized with fontdue.

use std::collections::HashMap;
use std::path::Path;

use adforge_core::config::{AdforgeConfig, FontWeight};
use adforge_core::frame::FrameBuffer;
use adforge_core::{AdError, AdResult, Color, Point2D};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use fontdue::FontSettings;
use serde::Serialize;

/// Family name of the built-in face.
pub const BUILTIN_FAMILY: &str = "sans";

/// Horizontal advance of every built-in glyph: `0.6 em`, computed as
/// `size * 3 / 5` so integral multiples of five measure exactly.
pub fn builtin_advance(size: f32) -> f32 {
    size * 3.0 / 5.0
}

const BUILTIN_ALIASES: [&str; 4] = [BUILTIN_FAMILY, "sans-serif", "inter", "arial"];

/// Drawn for characters the bitmap tables do not cover.
const MISSING_GLYPH: [u8; 8] = [0x7E, 0x42, 0x42, 0x42, 0x42, 0x42, 0x7E, 0x00];

/// Text horizontal alignment relative to the text origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A font request: family, pixel size and weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub weight: FontWeight,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::Regular,
        }
    }

    pub fn bold(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::Bold,
        }
    }
}

/// The host's text measurement facility.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels.
    fn measure_width(&self, text: &str, font: &Font) -> AdResult<f32>;
}

/// Greedily wrap `text` so every line measures below `max_width`.
///
/// Words are split on single spaces and never broken, so a word wider than
/// `max_width` overflows on its own line. An empty string yields one empty line.
pub fn wrap_text(
    measure: &dyn TextMeasure,
    text: &str,
    font: &Font,
    max_width: f32,
) -> AdResult<Vec<String>> {
    let mut words = text.split(' ');
    let mut lines = Vec::new();
    let mut current = words.next().unwrap_or_default().to_string();

    for word in words {
        let candidate = format!("{} {}", current, word);
        if measure.measure_width(&candidate, font)? < max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    lines.push(current);
    Ok(lines)
}

/// Horizontal start of a line of `width` drawn at `x` with `align`.
pub fn aligned_start(x: f32, width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    }
}

enum Face<'a> {
    Builtin,
    Outline(&'a fontdue::Font),
}

/// Registry of font families available to the renderer.
#[derive(Default)]
pub struct FontBook {
    faces: HashMap<(String, FontWeight), fontdue::Font>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families: Vec<_> = self.faces.keys().collect();
        families.sort();
        f.debug_struct("FontBook").field("faces", &families).finish()
    }
}

fn normalize_family(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl FontBook {
    /// A font book with only the built-in family.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a font book and register every face listed in the config.
    ///
    /// Fails when `render.font_family` names a family that is neither built in
    /// nor registered by the config.
    pub fn from_config(config: &AdforgeConfig) -> AdResult<Self> {
        let mut book = Self::new();
        for asset in &config.fonts {
            book.register_file(&asset.family, asset.weight, &asset.path)?;
        }
        let family = &config.render.font_family;
        if !book.has_family(family) {
            return Err(AdError::font(format!(
                "font family '{}' is not built in and no [[fonts]] entry registers it",
                family
            )));
        }
        Ok(book)
    }

    /// Register a TrueType/OpenType face from raw bytes.
    pub fn register_bytes(
        &mut self,
        family: &str,
        weight: FontWeight,
        data: &[u8],
    ) -> AdResult<()> {
        let key = normalize_family(family);
        if BUILTIN_ALIASES.contains(&key.as_str()) {
            return Err(AdError::font(format!(
                "'{}' is reserved for the built-in face",
                family
            )));
        }
        let font = fontdue::Font::from_bytes(data, FontSettings::default())
            .map_err(|e| AdError::font(format!("failed to parse font {}: {}", family, e)))?;
        tracing::debug!("registered font family '{}' ({:?})", family, weight);
        self.faces.insert((key, weight), font);
        Ok(())
    }

    /// Register a face from a font file on disk.
    pub fn register_file(&mut self, family: &str, weight: FontWeight, path: &Path) -> AdResult<()> {
        let data = std::fs::read(path).map_err(|e| {
            AdError::font(format!("failed to read font file {}: {}", path.display(), e))
        })?;
        tracing::info!("Loading font {} from {}", family, path.display());
        self.register_bytes(family, weight, &data)
    }

    /// Whether `family` resolves to a face.
    pub fn has_family(&self, family: &str) -> bool {
        let key = normalize_family(family);
        BUILTIN_ALIASES.contains(&key.as_str()) || self.faces.keys().any(|(f, _)| *f == key)
    }

    fn resolve(&self, font: &Font) -> AdResult<Face<'_>> {
        let key = normalize_family(&font.family);
        if BUILTIN_ALIASES.contains(&key.as_str()) {
            return Ok(Face::Builtin);
        }
        self.faces
            .get(&(key.clone(), font.weight))
            .or_else(|| self.faces.get(&(key, FontWeight::Regular)))
            .map(Face::Outline)
            .ok_or_else(|| AdError::font(format!("unsupported font family '{}'", font.family)))
    }

    /// Rasterize one line of text into `fb`.
    ///
    /// `origin.y` is the vertical middle of the line; `origin.x` is interpreted
    /// according to `align`.
    pub fn draw_line(
        &self,
        fb: &mut FrameBuffer,
        text: &str,
        font: &Font,
        origin: Point2D,
        align: TextAlign,
        color: Color,
    ) -> AdResult<()> {
        if text.is_empty() || font.size <= 0.0 {
            // Still surface an unresolvable family.
            self.resolve(font)?;
            return Ok(());
        }
        let width = self.measure_width(text, font)?;
        let start_x = aligned_start(origin.x, width, align);
        match self.resolve(font)? {
            Face::Builtin => draw_builtin_line(fb, text, font, start_x, origin.y, color),
            Face::Outline(face) => draw_outline_line(fb, face, text, font.size, start_x, origin.y, color),
        }
        Ok(())
    }
}

impl TextMeasure for FontBook {
    fn measure_width(&self, text: &str, font: &Font) -> AdResult<f32> {
        match self.resolve(font)? {
            Face::Builtin => Ok(text.chars().count() as f32 * builtin_advance(font.size)),
            Face::Outline(face) => Ok(text
                .chars()
                .map(|ch| face.metrics(ch, font.size).advance_width)
                .sum()),
        }
    }
}

fn builtin_glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .unwrap_or(MISSING_GLYPH)
}

/// Draw with the 8x8 bitmap glyphs scaled to a `0.6 em x 1 em` cell. Each
/// pixel whose center falls on a set bitmap cell is filled; bold also fills the
/// cell right of every set bit.
fn draw_builtin_line(
    fb: &mut FrameBuffer,
    text: &str,
    font: &Font,
    start_x: f32,
    middle_y: f32,
    color: Color,
) {
    let rgba = color.to_rgba8();
    let advance = builtin_advance(font.size);
    let top = middle_y - font.size / 2.0;
    let bold = font.weight == FontWeight::Bold;

    let row_start = top.floor() as i64;
    let row_end = (top + font.size).ceil() as i64;

    for (i, ch) in text.chars().enumerate() {
        let glyph = builtin_glyph(ch);
        if glyph.iter().all(|&row| row == 0) {
            continue;
        }
        let cell_x = start_x + i as f32 * advance;
        let col_start = cell_x.floor() as i64;
        let col_end = (cell_x + advance).ceil() as i64;

        for py in row_start..row_end {
            let row = (((py as f32 + 0.5) - top) / font.size * 8.0).floor();
            if !(0.0..8.0).contains(&row) {
                continue;
            }
            let bits = glyph[row as usize];
            for px in col_start..col_end {
                let col = (((px as f32 + 0.5) - cell_x) / advance * 8.0).floor();
                if !(0.0..8.0).contains(&col) {
                    continue;
                }
                // font8x8: bit 0 is the leftmost column.
                let col = col as u8;
                let set = bits & (1 << col) != 0 || (bold && col > 0 && bits & (1 << (col - 1)) != 0);
                if set {
                    fb.blend_pixel(px, py, rgba);
                }
            }
        }
    }
}

fn draw_outline_line(
    fb: &mut FrameBuffer,
    face: &fontdue::Font,
    text: &str,
    size: f32,
    start_x: f32,
    middle_y: f32,
    color: Color,
) {
    let [r, g, b, a] = color.to_rgba8();
    let baseline = match face.horizontal_line_metrics(size) {
        Some(m) => middle_y + (m.ascent + m.descent) / 2.0,
        None => middle_y + size / 2.0,
    };
    let mut cursor_x = start_x;

    for ch in text.chars() {
        let (metrics, bitmap) = face.rasterize(ch, size);
        let glyph_x = (cursor_x + metrics.xmin as f32).round() as i64;
        let glyph_y = (baseline - (metrics.height as f32 + metrics.ymin as f32)).round() as i64;

        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let coverage = bitmap[gy * metrics.width + gx];
                if coverage == 0 {
                    continue;
                }
                let alpha = (coverage as u32 * a as u32 / 255) as u8;
                fb.blend_pixel(glyph_x + gx as i64, glyph_y + gy as i64, [r, g, b, alpha]);
            }
        }

        cursor_x += metrics.advance_width;
    }
}
