//! The compositor: owns the surface and drives render passes.
//!
//! A pass paints, in order, an opaque white clear, exactly one background
//! (cover-scaled image or the fallback gradient) and the layout's foreground.
//! Passes are numbered; a pass completed after a newer one was begun is
//! discarded without touching the surface.

use std::sync::Arc;

use adforge_core::config::AdforgeConfig;
use adforge_core::frame::FrameBuffer;
use adforge_core::hash::{hash_frame, ContentHash};
use adforge_core::{AdDescription, AdError, AdResult, Color, Point2D, Rect, RenderMode};
use serde::Serialize;

use crate::export::{encode_png, to_data_url};
use crate::hit_test::HitTester;
use crate::image_loader::{cover_rect, load_background, ImageSource};
use crate::layout::{plan_layout, DrawOp, LayoutContext, LayoutPlan};
use crate::shapes::{clamp_radius, rounded_rect_path};
use crate::surface::{RasterSurface, Surface};
use crate::text::{FontBook, BUILTIN_FAMILY};

/// Alpha of the primary color at the gradient start (`0x80`).
const GRADIENT_START_ALPHA: f32 = 128.0 / 255.0;
/// Alpha of the accent color at the gradient end (`0x60`).
const GRADIENT_END_ALPHA: f32 = 96.0 / 255.0;

/// The resolved background for a pass.
#[derive(Debug, Clone, Copy)]
pub enum Background<'a> {
    Image(&'a FrameBuffer),
    Gradient,
}

impl<'a> Background<'a> {
    /// Background for the outcome of a fetch+decode. A missing reference or a
    /// failed decode falls back to the gradient.
    pub fn from_decoded(decoded: Option<&'a AdResult<FrameBuffer>>) -> Self {
        match decoded {
            Some(Ok(image)) => Background::Image(image),
            Some(Err(e)) => {
                tracing::warn!("Background unavailable, using gradient: {}", e);
                Background::Gradient
            }
            None => Background::Gradient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Image,
    Gradient,
}

/// A pass that has been begun but not yet painted.
#[derive(Debug, Clone)]
pub struct PendingPass {
    generation: u64,
    ad: AdDescription,
}

impl PendingPass {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ad(&self) -> &AdDescription {
        &self.ad
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PassOutcome {
    Rendered {
        generation: u64,
        background: BackgroundKind,
        elements: usize,
    },
    /// A newer pass was begun before this one completed.
    Superseded { generation: u64, latest: u64 },
}

impl PassOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, PassOutcome::Rendered { .. })
    }
}

/// Execute a layout plan's draw ops in order.
pub fn execute_plan<S: Surface + ?Sized>(surface: &mut S, plan: &LayoutPlan) -> AdResult<()> {
    for op in &plan.ops {
        match op {
            DrawOp::FillRect { rect, color } => surface.fill_rect(*rect, *color),
            DrawOp::RoundedRect { rect, radius, color } => {
                let r = clamp_radius(rect.width, rect.height, *radius);
                let path = rounded_rect_path(rect.x, rect.y, rect.width, rect.height, r);
                surface.fill_path(&path, *color);
            }
            DrawOp::Text(block) => {
                for (i, line) in block.lines.iter().enumerate() {
                    surface.draw_text(line, block.line_origin(i), &block.font, block.color, block.align)?;
                }
            }
        }
    }
    Ok(())
}

pub struct Compositor<S: Surface> {
    surface: S,
    mode: RenderMode,
    font_family: String,
    hit_tester: HitTester,
    generation: u64,
    in_flight: Option<u64>,
    completed: Option<u64>,
}

impl<S: Surface> Compositor<S> {
    pub fn new(surface: S, mode: RenderMode) -> Self {
        Self {
            surface,
            mode,
            font_family: BUILTIN_FAMILY.to_string(),
            hit_tester: HitTester::new(),
            generation: 0,
            in_flight: None,
            completed: None,
        }
    }

    /// Draw every layout with `family` instead of the built-in face.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn hit_tester(&self) -> &HitTester {
        &self.hit_tester
    }

    /// Generation of the most recently begun pass.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A pass has completed and no newer pass is in flight.
    pub fn is_ready(&self) -> bool {
        self.in_flight.is_none() && self.completed.is_some()
    }

    /// Start a new pass, superseding any pass still in flight.
    pub fn begin_pass(&mut self, ad: &AdDescription) -> PendingPass {
        self.generation += 1;
        if let Some(previous) = self.in_flight.replace(self.generation) {
            tracing::debug!("pass {} superseded by {}", previous, self.generation);
        }
        PendingPass {
            generation: self.generation,
            ad: ad.clone(),
        }
    }

    /// Paint a begun pass with its resolved background.
    pub fn complete_pass(&mut self, pending: PendingPass, background: Background<'_>) -> AdResult<PassOutcome> {
        if pending.generation != self.generation {
            tracing::debug!(
                "discarding stale pass {} (latest {})",
                pending.generation,
                self.generation
            );
            return Ok(PassOutcome::Superseded {
                generation: pending.generation,
                latest: self.generation,
            });
        }
        self.in_flight = None;
        let result = self.paint(&pending.ad, pending.generation, background);
        if result.is_err() {
            self.completed = None;
            self.hit_tester
                .replace(pending.generation, self.surface.width(), Vec::new());
        }
        result
    }

    /// Run a whole pass with an already resolved background.
    pub fn render_sync(&mut self, ad: &AdDescription, background: Background<'_>) -> AdResult<PassOutcome> {
        let pending = self.begin_pass(ad);
        self.complete_pass(pending, background)
    }

    /// Run a whole pass, fetching and decoding the background through `source`.
    pub async fn render(&mut self, ad: &AdDescription, source: &dyn ImageSource) -> AdResult<PassOutcome> {
        let pending = self.begin_pass(ad);
        let decoded = match ad.background_reference() {
            Some(reference) => Some(load_background(source, reference).await),
            None => None,
        };
        self.complete_pass(pending, Background::from_decoded(decoded.as_ref()))
    }

    fn paint(&mut self, ad: &AdDescription, generation: u64, background: Background<'_>) -> AdResult<PassOutcome> {
        let (width, height) = self.mode.surface_size(ad.layout);
        if self.surface.width() != width || self.surface.height() != height {
            self.surface.resize(width, height);
        }
        self.surface.clear(Color::WHITE);

        let background = match background {
            Background::Image(image) if !image.is_empty() => {
                let dest = cover_rect(image.width, image.height, width, height);
                self.surface.draw_image(image, dest);
                BackgroundKind::Image
            }
            _ => {
                paint_gradient(&mut self.surface, ad, width, height);
                BackgroundKind::Gradient
            }
        };

        let ctx = LayoutContext::new(width, height, self.mode, &self.font_family);
        let plan = plan_layout(ad, &ctx, &self.surface)?;
        execute_plan(&mut self.surface, &plan)?;

        let elements = plan.elements.len();
        self.hit_tester.replace(generation, width, plan.elements);
        self.completed = Some(generation);
        tracing::debug!(
            "pass {} rendered {} ({}x{}, {:?} background)",
            generation,
            ad.layout,
            width,
            height,
            background
        );

        Ok(PassOutcome::Rendered {
            generation,
            background,
            elements,
        })
    }
}

/// Diagonal gradient from the primary color to the accent color.
fn paint_gradient<S: Surface + ?Sized>(surface: &mut S, ad: &AdDescription, width: u32, height: u32) {
    let (w, h) = (width as f32, height as f32);
    surface.fill_linear_gradient(
        Rect::new(0.0, 0.0, w, h),
        Point2D::zero(),
        Point2D::new(w, h),
        ad.primary().with_alpha(GRADIENT_START_ALPHA),
        ad.accent().with_alpha(GRADIENT_END_ALPHA),
    );
}

impl Compositor<RasterSurface> {
    /// A raster compositor drawing with `fonts`.
    pub fn raster(fonts: Arc<FontBook>, mode: RenderMode) -> Self {
        Self::new(RasterSurface::new(0, 0, fonts), mode)
    }

    /// A raster compositor with the fonts, family and mode from a config.
    pub fn from_config(config: &AdforgeConfig) -> AdResult<Self> {
        let fonts = Arc::new(FontBook::from_config(config)?);
        Ok(Self::raster(fonts, config.render.default_mode).with_font_family(&config.render.font_family))
    }

    /// Pixels of the last completed pass.
    pub fn frame(&self) -> AdResult<&FrameBuffer> {
        if self.in_flight.is_some() {
            return Err(AdError::render("a render pass is still in flight"));
        }
        if self.completed.is_none() {
            return Err(AdError::render("no render pass has completed"));
        }
        Ok(self.surface.frame())
    }

    /// PNG bytes of the last completed pass.
    pub fn export_png(&self) -> AdResult<Vec<u8>> {
        let frame = self.frame()?;
        let png = encode_png(frame)?;
        tracing::info!("Exported {}x{} PNG ({} bytes)", frame.width, frame.height, png.len());
        Ok(png)
    }

    pub fn export_data_url(&self) -> AdResult<String> {
        to_data_url(self.frame()?)
    }

    pub fn content_hash(&self) -> AdResult<ContentHash> {
        Ok(hash_frame(self.frame()?))
    }
}
