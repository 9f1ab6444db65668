//! Interactive editing: pick an element, change it, re-render.

use std::sync::Arc;

use adforge_core::frame::FrameBuffer;
use adforge_core::{AdDescription, AdError, AdResult, Color, ElementKind, LayoutKind, Point2D, RenderMode};

use crate::compositor::{Background, Compositor, PassOutcome};
use crate::hit_test::Selection;
use crate::image_loader::{load_background, ImageSource};
use crate::surface::RasterSurface;
use crate::text::FontBook;

/// New value for an element field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// `#RRGGBB` hex color.
    Color(String),
}

/// Decoded background kept across edits. `image` is `None` when the reference
/// failed to load.
#[derive(Debug)]
struct CachedBackground {
    reference: String,
    image: Option<FrameBuffer>,
}

/// An ad open for editing on an edit-mode raster surface.
pub struct EditSession {
    ad: AdDescription,
    compositor: Compositor<RasterSurface>,
    background: Option<CachedBackground>,
}

impl EditSession {
    pub fn new(ad: AdDescription, fonts: Arc<FontBook>) -> Self {
        Self::with_compositor(ad, Compositor::raster(fonts, RenderMode::Edit))
    }

    pub fn with_compositor(ad: AdDescription, compositor: Compositor<RasterSurface>) -> Self {
        Self {
            ad,
            compositor,
            background: None,
        }
    }

    pub fn ad(&self) -> &AdDescription {
        &self.ad
    }

    pub fn compositor(&self) -> &Compositor<RasterSurface> {
        &self.compositor
    }

    /// Load the background if its reference changed, then render.
    pub async fn refresh(&mut self, source: &dyn ImageSource) -> AdResult<PassOutcome> {
        match self.ad.background_reference() {
            None => self.background = None,
            Some(reference) => {
                let cached = self
                    .background
                    .as_ref()
                    .is_some_and(|c| c.reference == reference);
                if !cached {
                    let image = match load_background(source, reference).await {
                        Ok(image) => Some(image),
                        Err(e) => {
                            tracing::warn!("Background unavailable, using gradient: {}", e);
                            None
                        }
                    };
                    self.background = Some(CachedBackground {
                        reference: reference.to_string(),
                        image,
                    });
                }
            }
        }
        self.rerender()
    }

    /// Render synchronously with the cached background.
    pub fn rerender(&mut self) -> AdResult<PassOutcome> {
        let background = match (self.ad.background_reference(), &self.background) {
            (Some(reference), Some(cached)) if cached.reference == reference => {
                cached.image.as_ref().map_or(Background::Gradient, Background::Image)
            }
            (Some(reference), _) => {
                tracing::debug!("background {} not loaded yet", reference);
                Background::Gradient
            }
            (None, _) => Background::Gradient,
        };
        self.compositor.render_sync(&self.ad, background)
    }

    /// Pick the element under a pointer on a display `displayed_width` wide.
    pub fn select(&self, x: f32, y: f32, displayed_width: f32) -> Option<Selection> {
        self.compositor
            .hit_tester()
            .select(Point2D::new(x, y), displayed_width)
    }

    /// Change one field of the ad and re-render.
    ///
    /// Text edits replace the element's text. Color edits on the title set the
    /// primary color, on the CTA the accent color; the subtitle color is fixed.
    pub fn update_field(&mut self, kind: ElementKind, value: FieldValue) -> AdResult<PassOutcome> {
        match value {
            FieldValue::Text(text) => match kind {
                ElementKind::Title => self.ad.title = text,
                ElementKind::Subtitle => self.ad.subtitle = text,
                ElementKind::Cta => self.ad.cta_text = text,
            },
            FieldValue::Color(hex) => {
                let color = Color::from_hex(&hex)
                    .map_err(|e| AdError::InvalidArgument(format!("'{}': {}", hex, e)))?;
                match kind {
                    ElementKind::Title => self.ad.primary_color = color.to_string(),
                    ElementKind::Cta => self.ad.accent_color = color.to_string(),
                    ElementKind::Subtitle => {
                        return Err(AdError::InvalidArgument(
                            "subtitle color cannot be edited".to_string(),
                        ))
                    }
                }
            }
        }
        tracing::debug!("updated {} field", kind);
        self.rerender()
    }

    /// Apply an edit to a selection made on the current render.
    pub fn apply(&mut self, selection: &Selection, value: FieldValue) -> AdResult<PassOutcome> {
        if self.compositor.hit_tester().resolve(selection.id).is_none() {
            return Err(AdError::InvalidArgument(format!(
                "selection of {} is from an earlier render",
                selection.kind()
            )));
        }
        self.update_field(selection.kind(), value)
    }

    /// Switch layouts and re-render.
    pub fn set_layout(&mut self, layout: LayoutKind) -> AdResult<PassOutcome> {
        self.ad.layout = layout;
        self.rerender()
    }

    pub fn export_png(&self) -> AdResult<Vec<u8>> {
        self.compositor.export_png()
    }
}
