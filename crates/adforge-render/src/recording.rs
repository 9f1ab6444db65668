//! A surface that records draw calls instead of rasterizing them.
//!
//! Used to inspect what a layout pass draws (tests, `adforge ops`) without
//! depending on pixel output.

use std::sync::Arc;

use adforge_core::frame::FrameBuffer;
use adforge_core::{AdResult, Color, Point2D, Rect};
use serde::Serialize;

use crate::shapes::Path;
use crate::surface::Surface;
use crate::text::{Font, FontBook, TextAlign, TextMeasure};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SurfaceCall {
    Resize {
        width: u32,
        height: u32,
    },
    Clear {
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    FillLinearGradient {
        rect: Rect,
        from: Point2D,
        to: Point2D,
        start: Color,
        end: Color,
    },
    FillPath {
        path: Path,
        color: Color,
    },
    DrawText {
        text: String,
        origin: Point2D,
        font: Font,
        color: Color,
        align: TextAlign,
    },
    DrawImage {
        image_width: u32,
        image_height: u32,
        dest: Rect,
    },
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    fonts: Arc<FontBook>,
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32, fonts: Arc<FontBook>) -> Self {
        Self {
            width,
            height,
            fonts,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    /// Recorded text draws, in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasure for RecordingSurface {
    fn measure_width(&self, text: &str, font: &Font) -> AdResult<f32> {
        self.fonts.measure_width(text, font)
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.calls.push(SurfaceCall::Resize { width, height });
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(SurfaceCall::Clear { color });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(SurfaceCall::FillRect { rect, color });
    }

    fn fill_linear_gradient(&mut self, rect: Rect, from: Point2D, to: Point2D, start: Color, end: Color) {
        self.calls.push(SurfaceCall::FillLinearGradient {
            rect,
            from,
            to,
            start,
            end,
        });
    }

    fn fill_path(&mut self, path: &Path, color: Color) {
        self.calls.push(SurfaceCall::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point2D,
        font: &Font,
        color: Color,
        align: TextAlign,
    ) -> AdResult<()> {
        // Resolve the family so recording fails exactly where rasterizing would.
        self.fonts.measure_width(text, font)?;
        self.calls.push(SurfaceCall::DrawText {
            text: text.to_string(),
            origin,
            font: font.clone(),
            color,
            align,
        });
        Ok(())
    }

    fn draw_image(&mut self, image: &FrameBuffer, dest: Rect) {
        self.calls.push(SurfaceCall::DrawImage {
            image_width: image.width,
            image_height: image.height,
            dest,
        });
    }
}
