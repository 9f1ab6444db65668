//! Layout strategies.
//!
//! Every layout runs the same procedure: an optional panel, a wrapped title, a
//! wrapped subtitle and a rounded CTA button. The layouts differ only in the
//! numbers, which live in one geometry table ([`geometry`]). Positions are
//! fractions of the surface size; pixel offsets and font sizes are edit-scale
//! values multiplied by `font_scale = width / 800`.

use adforge_core::config::FontWeight;
use adforge_core::{AdDescription, AdResult, Color, ElementKind, LayoutKind, Point2D, Rect, RenderMode};
use serde::Serialize;

use crate::text::{aligned_start, wrap_text, Font, TextAlign, TextMeasure};

/// Surface width the edit-scale sizes are expressed against.
pub const REFERENCE_WIDTH: f32 = 800.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

const SUBTITLE_GRAY: Color = Color {
    r: 0x33 as f32 / 255.0,
    g: 0x33 as f32 / 255.0,
    b: 0x33 as f32 / 255.0,
    a: 1.0,
};

/// A wrapped block of text. Line `i` is centered vertically on
/// `origin.y + i * line_height`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub origin: Point2D,
    pub font: Font,
    pub color: Color,
    pub align: TextAlign,
    pub line_height: f32,
}

impl TextBlock {
    pub fn line_origin(&self, index: usize) -> Point2D {
        Point2D::new(self.origin.x, self.origin.y + index as f32 * self.line_height)
    }

    /// Bounds of the drawn lines: widest line by `lines * line_height`.
    fn bounds(&self, measure: &dyn TextMeasure) -> AdResult<Rect> {
        let mut width: f32 = 0.0;
        for line in &self.lines {
            width = width.max(measure.measure_width(line, &self.font)?);
        }
        let height = self.lines.len() as f32 * self.line_height;
        Ok(Rect::new(
            aligned_start(self.origin.x, width, self.align),
            self.origin.y - self.line_height / 2.0,
            width,
            height,
        ))
    }
}

/// A layout-level drawing instruction, executed in order by the compositor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    FillRect { rect: Rect, color: Color },
    RoundedRect { rect: Rect, radius: f32, color: Color },
    Text(TextBlock),
}

/// A drawn element the user can select.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveElement {
    pub kind: ElementKind,
    pub text: String,
    pub bounds: Rect,
    /// Dominant color as drawn: text color for title and subtitle, button
    /// fill for the CTA.
    pub color: Color,
}

/// Output of one layout run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPlan {
    pub layout: LayoutKind,
    pub font_scale: f32,
    pub ops: Vec<DrawOp>,
    pub elements: Vec<InteractiveElement>,
}

impl LayoutPlan {
    fn empty(layout: LayoutKind) -> Self {
        Self {
            layout,
            font_scale: 0.0,
            ops: Vec::new(),
            elements: Vec::new(),
        }
    }

    pub fn element(&self, kind: ElementKind) -> Option<&InteractiveElement> {
        self.elements.iter().find(|e| e.kind == kind)
    }
}

/// Surface parameters a layout is planned against.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    pub width: f32,
    pub height: f32,
    pub font_scale: f32,
    pub mode: RenderMode,
    pub font_family: &'a str,
}

impl<'a> LayoutContext<'a> {
    pub fn new(width: u32, height: u32, mode: RenderMode, font_family: &'a str) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            font_scale: width as f32 / REFERENCE_WIDTH,
            mode,
            font_family,
        }
    }
}

/// `extent * num / den + px * font_scale`.
#[derive(Debug, Clone, Copy)]
struct Span {
    num: f32,
    den: f32,
    px: f32,
}

const fn frac(num: f32, den: f32) -> Span {
    Span { num, den, px: 0.0 }
}

const fn px(px: f32) -> Span {
    Span {
        num: 0.0,
        den: 1.0,
        px,
    }
}

/// The full extent minus `inset` scaled pixels.
const fn inset(inset: f32) -> Span {
    Span {
        num: 1.0,
        den: 1.0,
        px: -inset,
    }
}

impl Span {
    fn resolve(self, extent: f32, scale: f32) -> f32 {
        extent * self.num / self.den + self.px * scale
    }
}

#[derive(Debug, Clone, Copy)]
enum Paint {
    Primary,
    Fixed(Color),
}

impl Paint {
    fn resolve(self, ad: &AdDescription) -> Color {
        match self {
            Paint::Primary => ad.primary(),
            Paint::Fixed(color) => color,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PanelSpec {
    x: Span,
    y: Span,
    width: Span,
    height: Span,
    paint: Paint,
    /// Only painted in export mode.
    export_only: bool,
}

#[derive(Debug, Clone, Copy)]
struct TextSpec {
    x: Span,
    y: Span,
    align: TextAlign,
    size: f32,
    weight: FontWeight,
    paint: Paint,
    max_width: Span,
}

/// Which edge of the button `x` pins.
#[derive(Debug, Clone, Copy)]
enum ButtonAnchor {
    Center,
    LeftEdge,
    RightEdge,
}

#[derive(Debug, Clone, Copy)]
struct CtaSpec {
    x: Span,
    anchor: ButtonAnchor,
    center_y: Span,
    min_width: f32,
    height: f32,
    radius: f32,
    label_size: f32,
}

#[derive(Debug, Clone, Copy)]
struct LayoutGeometry {
    panel: Option<PanelSpec>,
    title: TextSpec,
    subtitle: TextSpec,
    cta: CtaSpec,
}

const fn title(x: Span, y: Span, align: TextAlign, size: f32, paint: Paint, max_width: Span) -> TextSpec {
    TextSpec {
        x,
        y,
        align,
        size,
        weight: FontWeight::Bold,
        paint,
        max_width,
    }
}

const fn subtitle(x: Span, y: Span, align: TextAlign, size: f32, paint: Paint, max_width: Span) -> TextSpec {
    TextSpec {
        x,
        y,
        align,
        size,
        weight: FontWeight::Regular,
        paint,
        max_width,
    }
}

fn geometry(layout: LayoutKind) -> LayoutGeometry {
    let white = Paint::Fixed(Color::WHITE);
    let gray = Paint::Fixed(SUBTITLE_GRAY);
    match layout {
        LayoutKind::Centered => LayoutGeometry {
            panel: Some(PanelSpec {
                x: frac(1.0, 10.0),
                y: frac(2.0, 10.0),
                width: frac(8.0, 10.0),
                height: frac(6.0, 10.0),
                paint: Paint::Fixed(Color::WHITE.with_alpha(0.95)),
                export_only: true,
            }),
            title: title(frac(1.0, 2.0), frac(1.0, 3.0), TextAlign::Center, 48.0, Paint::Primary, frac(9.0, 10.0)),
            subtitle: subtitle(frac(1.0, 2.0), frac(1.0, 2.0), TextAlign::Center, 24.0, gray, frac(9.0, 10.0)),
            cta: CtaSpec {
                x: frac(1.0, 2.0),
                anchor: ButtonAnchor::Center,
                center_y: frac(2.0, 3.0),
                min_width: 200.0,
                height: 50.0,
                radius: 8.0,
                label_size: 18.0,
            },
        },
        LayoutKind::LeftAligned => LayoutGeometry {
            panel: None,
            title: title(px(60.0), frac(1.0, 4.0), TextAlign::Left, 42.0, Paint::Primary, inset(120.0)),
            subtitle: subtitle(px(60.0), frac(1.0, 2.0), TextAlign::Left, 20.0, gray, inset(120.0)),
            cta: CtaSpec {
                x: px(60.0),
                anchor: ButtonAnchor::LeftEdge,
                center_y: frac(3.0, 4.0),
                min_width: 180.0,
                height: 45.0,
                radius: 6.0,
                label_size: 16.0,
            },
        },
        LayoutKind::BottomOverlay => LayoutGeometry {
            panel: Some(PanelSpec {
                x: frac(0.0, 1.0),
                y: frac(2.0, 3.0),
                width: frac(1.0, 1.0),
                height: frac(1.0, 3.0),
                paint: Paint::Fixed(Color::BLACK.with_alpha(0.7)),
                export_only: false,
            }),
            title: title(frac(1.0, 2.0), frac(3.0, 4.0), TextAlign::Center, 36.0, white, frac(9.0, 10.0)),
            subtitle: subtitle(frac(1.0, 2.0), frac(5.0, 6.0), TextAlign::Center, 18.0, white, frac(9.0, 10.0)),
            cta: CtaSpec {
                x: inset(30.0),
                anchor: ButtonAnchor::RightEdge,
                center_y: inset(40.0),
                min_width: 150.0,
                height: 40.0,
                radius: 5.0,
                label_size: 14.0,
            },
        },
        LayoutKind::SplitScreen => LayoutGeometry {
            panel: Some(PanelSpec {
                x: frac(0.0, 1.0),
                y: frac(0.0, 1.0),
                width: frac(1.0, 2.0),
                height: frac(1.0, 1.0),
                paint: Paint::Primary,
                export_only: false,
            }),
            title: title(frac(1.0, 4.0), frac(1.0, 3.0), TextAlign::Center, 42.0, white, frac(17.0, 40.0)),
            subtitle: subtitle(frac(3.0, 4.0), frac(1.0, 2.0), TextAlign::Center, 24.0, gray, frac(17.0, 40.0)),
            cta: CtaSpec {
                x: frac(3.0, 4.0),
                anchor: ButtonAnchor::Center,
                center_y: frac(2.0, 3.0),
                min_width: 160.0,
                height: 45.0,
                radius: 6.0,
                label_size: 16.0,
            },
        },
    }
}

/// Button width before scaling: grows with the label length.
pub fn cta_base_width(cta_text: &str, min_width: f32) -> f32 {
    min_width.max(cta_text.chars().count() as f32 * 20.0 + 80.0)
}

/// Plan the foreground of `ad` for a surface described by `ctx`.
///
/// The background is not part of the plan. A zero-sized surface yields an
/// empty plan.
pub fn plan_layout(
    ad: &AdDescription,
    ctx: &LayoutContext<'_>,
    measure: &dyn TextMeasure,
) -> AdResult<LayoutPlan> {
    if ctx.width <= 0.0 || ctx.height <= 0.0 {
        return Ok(LayoutPlan::empty(ad.layout));
    }

    let geo = geometry(ad.layout);
    let (w, h, s) = (ctx.width, ctx.height, ctx.font_scale);
    let mut ops = Vec::new();
    let mut elements = Vec::new();

    if let Some(panel) = geo.panel {
        if !panel.export_only || ctx.mode == RenderMode::Export {
            ops.push(DrawOp::FillRect {
                rect: Rect::new(
                    panel.x.resolve(w, s),
                    panel.y.resolve(h, s),
                    panel.width.resolve(w, s),
                    panel.height.resolve(h, s),
                ),
                color: panel.paint.resolve(ad),
            });
        }
    }

    for (kind, spec) in [(ElementKind::Title, geo.title), (ElementKind::Subtitle, geo.subtitle)] {
        let text = ad.text(kind);
        let font = Font {
            family: ctx.font_family.to_string(),
            size: spec.size * s,
            weight: spec.weight,
        };
        let block = TextBlock {
            lines: wrap_text(measure, text, &font, spec.max_width.resolve(w, s))?,
            origin: Point2D::new(spec.x.resolve(w, s), spec.y.resolve(h, s)),
            line_height: font.size * LINE_HEIGHT_FACTOR,
            color: spec.paint.resolve(ad),
            font,
            align: spec.align,
        };
        if !text.is_empty() {
            elements.push(InteractiveElement {
                kind,
                text: text.to_string(),
                bounds: block.bounds(measure)?,
                color: block.color,
            });
        }
        ops.push(DrawOp::Text(block));
    }

    let cta = geo.cta;
    let button_width = cta_base_width(&ad.cta_text, cta.min_width) * s;
    let button_height = cta.height * s;
    let anchor_x = cta.x.resolve(w, s);
    let center = Point2D::new(
        match cta.anchor {
            ButtonAnchor::Center => anchor_x,
            ButtonAnchor::LeftEdge => anchor_x + button_width / 2.0,
            ButtonAnchor::RightEdge => anchor_x - button_width / 2.0,
        },
        cta.center_y.resolve(h, s),
    );
    let button = Rect::centered_at(center, button_width, button_height);
    let accent = ad.accent();

    ops.push(DrawOp::RoundedRect {
        rect: button,
        radius: cta.radius * s,
        color: accent,
    });
    let label_font = Font {
        family: ctx.font_family.to_string(),
        size: cta.label_size * s,
        weight: FontWeight::Bold,
    };
    ops.push(DrawOp::Text(TextBlock {
        lines: vec![ad.cta_text.clone()],
        origin: center,
        line_height: label_font.size * LINE_HEIGHT_FACTOR,
        font: label_font,
        color: Color::WHITE,
        align: TextAlign::Center,
    }));
    elements.push(InteractiveElement {
        kind: ElementKind::Cta,
        text: ad.cta_text.clone(),
        bounds: button,
        color: accent,
    });

    tracing::debug!(
        "planned {} layout at {}x{}: {} ops, {} elements",
        ad.layout,
        w,
        h,
        ops.len(),
        elements.len()
    );

    Ok(LayoutPlan {
        layout: ad.layout,
        font_scale: s,
        ops,
        elements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{FontBook, BUILTIN_FAMILY};

    fn plan(ad: &AdDescription, width: u32, height: u32, mode: RenderMode) -> LayoutPlan {
        let ctx = LayoutContext::new(width, height, mode, BUILTIN_FAMILY);
        plan_layout(ad, &ctx, &FontBook::new()).unwrap()
    }

    fn texts(plan: &LayoutPlan) -> Vec<&TextBlock> {
        plan.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(block) => Some(block),
                _ => None,
            })
            .collect()
    }

    fn sample() -> AdDescription {
        AdDescription::new("Big Sale", "Go").with_subtitle("Today only")
    }

    #[test]
    fn test_cta_base_width() {
        assert_eq!(cta_base_width("Go", 200.0), 200.0);
        assert_eq!(cta_base_width("Shop the collection", 200.0), 460.0);
        assert_eq!(cta_base_width("", 150.0), 150.0);
    }

    #[test]
    fn test_centered_edit_positions() {
        let plan = plan(&sample(), 800, 600, RenderMode::Edit);
        assert_eq!(plan.font_scale, 1.0);
        // No export backdrop in edit mode.
        assert!(!plan.ops.iter().any(|op| matches!(op, DrawOp::FillRect { .. })));

        let blocks = texts(&plan);
        assert_eq!(blocks[0].origin, Point2D::new(400.0, 200.0));
        assert_eq!(blocks[0].font.size, 48.0);
        assert_eq!(blocks[0].font.weight, FontWeight::Bold);
        assert_eq!(blocks[1].origin, Point2D::new(400.0, 300.0));

        let cta = plan.element(ElementKind::Cta).unwrap();
        assert_eq!(cta.bounds, Rect::new(300.0, 375.0, 200.0, 50.0));
        assert_eq!(blocks[2].lines, vec!["Go"]);
        assert_eq!(blocks[2].color, Color::WHITE);
    }

    #[test]
    fn test_centered_export_adds_backdrop() {
        let plan = plan(&sample(), 1080, 1080, RenderMode::Export);
        match &plan.ops[0] {
            DrawOp::FillRect { rect, color } => {
                assert!((rect.x - 108.0).abs() < 1e-3);
                assert!((rect.width - 864.0).abs() < 1e-3);
                assert!((color.a - 0.95).abs() < 1e-6);
            }
            other => panic!("expected backdrop, got {:?}", other),
        }
        assert!((plan.font_scale - 1.35).abs() < 1e-6);
    }

    #[test]
    fn test_elements_in_draw_order() {
        let plan = plan(&sample(), 800, 600, RenderMode::Edit);
        let kinds: Vec<_> = plan.elements.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ElementKind::Title, ElementKind::Subtitle, ElementKind::Cta]);
    }

    #[test]
    fn test_empty_subtitle_not_recorded_but_drawn() {
        let ad = AdDescription::new("Title", "Buy").with_layout(LayoutKind::BottomOverlay);
        let plan = plan(&ad, 800, 600, RenderMode::Edit);
        assert!(plan.element(ElementKind::Subtitle).is_none());
        let blocks = texts(&plan);
        assert_eq!(blocks[1].lines, vec![String::new()]);

        let with_sub = plan_layout(
            &ad.clone().with_subtitle("Now"),
            &LayoutContext::new(800, 600, RenderMode::Edit, BUILTIN_FAMILY),
            &FontBook::new(),
        )
        .unwrap();
        assert_eq!(
            plan.element(ElementKind::Cta).unwrap().bounds,
            with_sub.element(ElementKind::Cta).unwrap().bounds
        );
    }

    #[test]
    fn test_left_aligned_anchors() {
        let ad = sample().with_layout(LayoutKind::LeftAligned);
        let plan = plan(&ad, 800, 600, RenderMode::Edit);
        let title = plan.element(ElementKind::Title).unwrap();
        assert_eq!(title.bounds.x, 60.0);
        assert_eq!(texts(&plan)[0].align, TextAlign::Left);
        let cta = plan.element(ElementKind::Cta).unwrap();
        assert_eq!(cta.bounds.x, 60.0);
        assert_eq!(cta.bounds.width, 180.0);
        assert_eq!(cta.bounds.center().y, 450.0);
    }

    #[test]
    fn test_bottom_overlay_band_and_right_button() {
        let ad = sample().with_layout(LayoutKind::BottomOverlay);
        let plan = plan(&ad, 800, 600, RenderMode::Edit);
        match &plan.ops[0] {
            DrawOp::FillRect { rect, color } => {
                assert_eq!(rect.y, 400.0);
                assert_eq!(rect.height, 200.0);
                assert!((color.a - 0.7).abs() < 1e-6);
            }
            other => panic!("expected band, got {:?}", other),
        }
        let cta = plan.element(ElementKind::Cta).unwrap();
        assert_eq!(cta.bounds.right(), 770.0);
        assert_eq!(cta.bounds.center().y, 560.0);
        assert_eq!(texts(&plan)[0].color, Color::WHITE);
    }

    #[test]
    fn test_split_screen_panel_uses_primary() {
        let ad = sample()
            .with_layout(LayoutKind::SplitScreen)
            .with_colors("#112233", "#445566");
        let plan = plan(&ad, 800, 1200, RenderMode::Edit);
        match &plan.ops[0] {
            DrawOp::FillRect { rect, color } => {
                assert_eq!(*rect, Rect::new(0.0, 0.0, 400.0, 1200.0));
                assert_eq!(color.to_rgba8(), [0x11, 0x22, 0x33, 255]);
            }
            other => panic!("expected panel, got {:?}", other),
        }
        let cta = plan.element(ElementKind::Cta).unwrap();
        assert_eq!(cta.bounds.center(), Point2D::new(600.0, 800.0));
        assert_eq!(cta.color.to_rgba8(), [0x44, 0x55, 0x66, 255]);
    }

    #[test]
    fn test_title_wraps_at_layout_max_width() {
        let ad = AdDescription::new("one two three four five six seven eight nine ten", "Go")
            .with_layout(LayoutKind::SplitScreen);
        let plan = plan(&ad, 800, 1200, RenderMode::Edit);
        let title = texts(&plan)[0];
        assert!(title.lines.len() > 1);
        assert_eq!(title.lines.join(" "), ad.title);
        assert_eq!(title.line_origin(1).y, title.origin.y + 42.0 * 1.2);
        let bounds = plan.element(ElementKind::Title).unwrap().bounds;
        assert_eq!(bounds.height, title.lines.len() as f32 * title.line_height);
    }

    #[test]
    fn test_zero_size_surface_is_empty_plan() {
        let plan = plan(&sample(), 0, 0, RenderMode::Export);
        assert!(plan.ops.is_empty());
        assert!(plan.elements.is_empty());
    }

    #[test]
    fn test_unknown_font_family_fails() {
        let ctx = LayoutContext::new(800, 600, RenderMode::Edit, "Missing");
        assert!(plan_layout(&sample(), &ctx, &FontBook::new()).is_err());
    }
}
