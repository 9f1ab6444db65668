//! The 2D drawing surface layouts paint onto, and its raster implementation.

use std::sync::Arc;

use adforge_core::frame::FrameBuffer;
use adforge_core::{AdResult, Color, Point2D, Rect};

use crate::shapes::{self, pixel_range, Path};
use crate::text::{Font, FontBook, TextAlign, TextMeasure};

/// Drawing operations the compositor and the layout strategies rely on.
///
/// All coordinates are surface pixels with the origin at the top-left corner.
pub trait Surface: TextMeasure {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Resize the surface. Contents are discarded.
    fn resize(&mut self, width: u32, height: u32);

    /// Replace every pixel with `color`.
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fill `rect` with a linear gradient running from `start` at `from` to
    /// `end` at `to`.
    fn fill_linear_gradient(&mut self, rect: Rect, from: Point2D, to: Point2D, start: Color, end: Color);

    fn fill_path(&mut self, path: &Path, color: Color);

    /// Draw one line of text. `origin.y` is the vertical middle of the line.
    fn draw_text(
        &mut self,
        text: &str,
        origin: Point2D,
        font: &Font,
        color: Color,
        align: TextAlign,
    ) -> AdResult<()>;

    /// Draw `image` stretched over `dest`; parts outside the surface are clipped.
    fn draw_image(&mut self, image: &FrameBuffer, dest: Rect);
}

/// A CPU surface backed by an RGBA8 frame buffer.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    frame: FrameBuffer,
    fonts: Arc<FontBook>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, fonts: Arc<FontBook>) -> Self {
        Self {
            frame: FrameBuffer::new(width, height),
            fonts,
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Pixel rows and columns whose centers fall inside `rect`, clipped.
    fn covered(&self, rect: Rect) -> Option<((i64, i64), (i64, i64))> {
        let (x0, x1) = pixel_range(rect.x, rect.right());
        let (y0, y1) = pixel_range(rect.y, rect.bottom());
        let cols = (x0.max(0), x1.min(self.frame.width as i64));
        let rows = (y0.max(0), y1.min(self.frame.height as i64));
        if cols.0 >= cols.1 || rows.0 >= rows.1 {
            return None;
        }
        Some((cols, rows))
    }
}

impl TextMeasure for RasterSurface {
    fn measure_width(&self, text: &str, font: &Font) -> AdResult<f32> {
        self.fonts.measure_width(text, font)
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.frame.width
    }

    fn height(&self) -> u32 {
        self.frame.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.frame.width != width || self.frame.height != height {
            self.frame = FrameBuffer::new(width, height);
        }
    }

    fn clear(&mut self, color: Color) {
        self.frame.fill(&color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(((x0, x1), (y0, y1))) = self.covered(rect) else {
            return;
        };
        let rgba = color.to_rgba8();
        for y in y0..y1 {
            self.frame.blend_span(y, x0, x1, rgba);
        }
    }

    fn fill_linear_gradient(&mut self, rect: Rect, from: Point2D, to: Point2D, start: Color, end: Color) {
        let Some(((x0, x1), (y0, y1))) = self.covered(rect) else {
            return;
        };
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len_sq = dx * dx + dy * dy;

        for y in y0..y1 {
            for x in x0..x1 {
                let t = if len_sq > 0.0 {
                    let px = x as f32 + 0.5 - from.x;
                    let py = y as f32 + 0.5 - from.y;
                    ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                self.frame.blend_pixel(x, y, start.lerp(&end, t).to_rgba8());
            }
        }
    }

    fn fill_path(&mut self, path: &Path, color: Color) {
        shapes::fill_path(&mut self.frame, path, color);
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point2D,
        font: &Font,
        color: Color,
        align: TextAlign,
    ) -> AdResult<()> {
        self.fonts
            .draw_line(&mut self.frame, text, font, origin, align, color)
    }

    fn draw_image(&mut self, image: &FrameBuffer, dest: Rect) {
        if image.is_empty() || dest.is_empty() {
            return;
        }
        let Some(((x0, x1), (y0, y1))) = self.covered(dest) else {
            return;
        };
        let sx_scale = image.width as f32 / dest.width;
        let sy_scale = image.height as f32 / dest.height;

        // Nearest-neighbor sampling.
        for y in y0..y1 {
            let sy = (((y as f32 + 0.5 - dest.y) * sy_scale) as u32).min(image.height - 1);
            for x in x0..x1 {
                let sx = (((x as f32 + 0.5 - dest.x) * sx_scale) as u32).min(image.width - 1);
                if let Some(pixel) = image.get_pixel(sx, sy) {
                    self.frame.blend_pixel(x, y, pixel);
                }
            }
        }
    }
}
