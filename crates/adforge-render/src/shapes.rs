//! Vector paths and their scanline fill.

use std::f32::consts::{FRAC_PI_2, PI};

use adforge_core::frame::FrameBuffer;
use adforge_core::{Color, Point2D, Rect};
use serde::Serialize;

/// Line segments used to flatten a quarter circle.
const QUARTER_ARC_STEPS: u32 = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathSegment {
    MoveTo(Point2D),
    LineTo(Point2D),
    /// Circular arc around `center`. Angles are in radians, measured in surface
    /// space (y down), so a positive sweep runs clockwise on screen.
    Arc {
        center: Point2D,
        radius: f32,
        start_angle: f32,
        sweep: f32,
    },
    Close,
}

/// An ordered list of path segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point2D) -> &mut Self {
        self.segments.push(PathSegment::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Point2D) -> &mut Self {
        self.segments.push(PathSegment::LineTo(p));
        self
    }

    pub fn arc(&mut self, center: Point2D, radius: f32, start_angle: f32, sweep: f32) -> &mut Self {
        self.segments.push(PathSegment::Arc {
            center,
            radius,
            start_angle,
            sweep,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.segments.push(PathSegment::Close);
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Flatten into closed polygons. Arcs become chords; every subpath is
    /// closed implicitly.
    pub fn flatten(&self) -> Vec<Vec<Point2D>> {
        let mut polygons = Vec::new();
        let mut current: Vec<Point2D> = Vec::new();

        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(p) => {
                    if current.len() > 1 {
                        polygons.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(p);
                }
                PathSegment::LineTo(p) => current.push(p),
                PathSegment::Arc {
                    center,
                    radius,
                    start_angle,
                    sweep,
                } => {
                    let steps =
                        ((sweep.abs() / FRAC_PI_2) * QUARTER_ARC_STEPS as f32).ceil().max(1.0) as u32;
                    for k in 0..=steps {
                        let angle = start_angle + sweep * k as f32 / steps as f32;
                        current.push(Point2D::new(
                            center.x + radius * angle.cos(),
                            center.y + radius * angle.sin(),
                        ));
                    }
                }
                PathSegment::Close => {
                    if current.len() > 1 {
                        let start = current[0];
                        polygons.push(std::mem::take(&mut current));
                        current.push(start);
                    }
                }
            }
        }
        if current.len() > 1 {
            polygons.push(current);
        }
        polygons
    }
}

/// Axis-aligned bounds of flattened polygons, or `None` when there are no points.
fn polygon_bounds(polygons: &[Vec<Point2D>]) -> Option<Rect> {
    let mut points = polygons.iter().flatten();
    let first = points.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Closed rounded-rectangle outline with corner radius `r`.
///
/// Eight segments, clockwise from `(x + r, y)`: top edge, top-right arc, right
/// edge, bottom-right arc, bottom edge, bottom-left arc, left edge, top-left arc.
/// The radius is used as given; see [`clamp_radius`].
pub fn rounded_rect_path(x: f32, y: f32, width: f32, height: f32, r: f32) -> Path {
    let right = x + width;
    let bottom = y + height;
    let mut path = Path::new();
    path.move_to(Point2D::new(x + r, y))
        .line_to(Point2D::new(right - r, y))
        .arc(Point2D::new(right - r, y + r), r, -FRAC_PI_2, FRAC_PI_2)
        .line_to(Point2D::new(right, bottom - r))
        .arc(Point2D::new(right - r, bottom - r), r, 0.0, FRAC_PI_2)
        .line_to(Point2D::new(x + r, bottom))
        .arc(Point2D::new(x + r, bottom - r), r, FRAC_PI_2, FRAC_PI_2)
        .line_to(Point2D::new(x, y + r))
        .arc(Point2D::new(x + r, y + r), r, PI, FRAC_PI_2)
        .close();
    path
}

/// Limit a corner radius to `[0, min(width, height) / 2]`.
pub fn clamp_radius(width: f32, height: f32, r: f32) -> f32 {
    let limit = (width.min(height) / 2.0).max(0.0);
    r.clamp(0.0, limit)
}

/// Pixel indices whose centers fall in `[start, end)`.
pub(crate) fn pixel_range(start: f32, end: f32) -> (i64, i64) {
    ((start - 0.5).ceil() as i64, (end - 0.5).ceil() as i64)
}

/// Fill `path` into `fb` with the non-zero winding rule, sampling one point at
/// each pixel center.
pub fn fill_path(fb: &mut FrameBuffer, path: &Path, color: Color) {
    let rgba = color.to_rgba8();
    let polygons = path.flatten();

    let Some(bounds) = polygon_bounds(&polygons) else {
        return;
    };

    let mut edges: Vec<(Point2D, Point2D)> = Vec::new();
    for polygon in &polygons {
        for (i, &a) in polygon.iter().enumerate() {
            let b = polygon[(i + 1) % polygon.len()];
            if a.y != b.y {
                edges.push((a, b));
            }
        }
    }
    if edges.is_empty() {
        return;
    }

    let (row_start, row_end) = pixel_range(bounds.y, bounds.bottom());
    let row_start = row_start.max(0);
    let row_end = row_end.min(fb.height as i64);
    let mut crossings: Vec<(f32, i32)> = Vec::new();

    for py in row_start..row_end {
        let sy = py as f32 + 0.5;
        crossings.clear();
        for &(a, b) in &edges {
            let (lo, hi, dir) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
            if sy >= lo.y && sy < hi.y {
                let t = (sy - lo.y) / (hi.y - lo.y);
                crossings.push((lo.x + t * (hi.x - lo.x), dir));
            }
        }
        crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].1;
            if winding != 0 {
                let (x0, x1) = pixel_range(pair[0].0, pair[1].0);
                fb.blend_span(py, x0, x1, rgba);
            }
        }
    }
}
