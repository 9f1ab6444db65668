//! The ad description record: the renderer's only input.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{AdError, AdResult};
use crate::Color;

/// Default primary color of a stored ad.
pub const DEFAULT_PRIMARY_COLOR: &str = "#4285F4";
/// Default accent color of a stored ad.
pub const DEFAULT_ACCENT_COLOR: &str = "#EA4335";

/// One of the four named layout variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutKind {
    #[default]
    Centered,
    LeftAligned,
    BottomOverlay,
    SplitScreen,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 4] = [
        LayoutKind::Centered,
        LayoutKind::LeftAligned,
        LayoutKind::BottomOverlay,
        LayoutKind::SplitScreen,
    ];

    /// Resolve a layout name. Unknown names resolve to [`LayoutKind::Centered`];
    /// this is the single default used by every render mode.
    pub fn from_name(name: &str) -> LayoutKind {
        match name.trim().to_ascii_lowercase().as_str() {
            "centered" => LayoutKind::Centered,
            "left-aligned" => LayoutKind::LeftAligned,
            "bottom-overlay" => LayoutKind::BottomOverlay,
            "split-screen" => LayoutKind::SplitScreen,
            other => {
                tracing::debug!("unknown layout '{}', using centered", other);
                LayoutKind::Centered
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::Centered => "centered",
            LayoutKind::LeftAligned => "left-aligned",
            LayoutKind::BottomOverlay => "bottom-overlay",
            LayoutKind::SplitScreen => "split-screen",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LayoutKind::Centered => "Title and text centered in the middle",
            LayoutKind::LeftAligned => "Content aligned to the left side",
            LayoutKind::BottomOverlay => "Text overlaid at the bottom",
            LayoutKind::SplitScreen => "Content split between left and right",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(LayoutKind::from_name(s))
    }
}

impl Serialize for LayoutKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for LayoutKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(name
            .map(|n| LayoutKind::from_name(&n))
            .unwrap_or_default())
    }
}

/// The interactive elements every layout can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Title,
    Subtitle,
    Cta,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Title => write!(f, "title"),
            ElementKind::Subtitle => write!(f, "subtitle"),
            ElementKind::Cta => write!(f, "cta"),
        }
    }
}

/// Which presentation a surface is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Square download/export surface.
    #[default]
    Export,
    /// Interactive editing preview.
    Edit,
}

impl RenderMode {
    pub const EXPORT_SIZE: u32 = 1080;
    pub const EDIT_WIDTH: u32 = 800;
    pub const EDIT_HEIGHT: u32 = 600;
    pub const SPLIT_EDIT_HEIGHT: u32 = 1200;

    /// Native surface size for this mode and layout.
    pub fn surface_size(&self, layout: LayoutKind) -> (u32, u32) {
        match (self, layout) {
            (RenderMode::Export, _) => (Self::EXPORT_SIZE, Self::EXPORT_SIZE),
            (RenderMode::Edit, LayoutKind::SplitScreen) => {
                (Self::EDIT_WIDTH, Self::SPLIT_EDIT_HEIGHT)
            }
            (RenderMode::Edit, _) => (Self::EDIT_WIDTH, Self::EDIT_HEIGHT),
        }
    }
}

impl FromStr for RenderMode {
    type Err = AdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "export" => Ok(RenderMode::Export),
            "edit" => Ok(RenderMode::Edit),
            other => Err(AdError::InvalidArgument(format!(
                "unknown render mode '{}' (expected export or edit)",
                other
            ))),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Export => write!(f, "export"),
            RenderMode::Edit => write!(f, "edit"),
        }
    }
}

fn default_primary_color() -> String {
    DEFAULT_PRIMARY_COLOR.to_string()
}

fn default_accent_color() -> String {
    DEFAULT_ACCENT_COLOR.to_string()
}

/// Structured input record driving one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDescription {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub cta_text: String,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default)]
    pub layout: LayoutKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
}

impl AdDescription {
    pub fn new(title: impl Into<String>, cta_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            cta_text: cta_text.into(),
            primary_color: default_primary_color(),
            accent_color: default_accent_color(),
            layout: LayoutKind::default(),
            background_image_url: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_layout(mut self, layout: LayoutKind) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_colors(mut self, primary: impl Into<String>, accent: impl Into<String>) -> Self {
        self.primary_color = primary.into();
        self.accent_color = accent.into();
        self
    }

    pub fn with_background(mut self, reference: impl Into<String>) -> Self {
        self.background_image_url = Some(reference.into());
        self
    }

    /// Parse an ad description from JSON.
    pub fn from_json(json: &str) -> AdResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The background reference, treating blank strings as absent.
    pub fn background_reference(&self) -> Option<&str> {
        self.background_image_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn primary(&self) -> Color {
        resolve_color(&self.primary_color, DEFAULT_PRIMARY_COLOR, "primaryColor")
    }

    pub fn accent(&self) -> Color {
        resolve_color(&self.accent_color, DEFAULT_ACCENT_COLOR, "accentColor")
    }

    /// Current text of an element.
    pub fn text(&self, kind: ElementKind) -> &str {
        match kind {
            ElementKind::Title => &self.title,
            ElementKind::Subtitle => &self.subtitle,
            ElementKind::Cta => &self.cta_text,
        }
    }
}

fn resolve_color(value: &str, fallback: &str, field: &str) -> Color {
    match Color::from_hex(value) {
        Ok(color) => color,
        Err(_) => {
            tracing::warn!("invalid {} '{}', using {}", field, value, fallback);
            Color::from_hex(fallback).unwrap_or(Color::BLACK)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_name() {
        assert_eq!(LayoutKind::from_name("left-aligned"), LayoutKind::LeftAligned);
        assert_eq!(LayoutKind::from_name(" Bottom-Overlay "), LayoutKind::BottomOverlay);
        assert_eq!(LayoutKind::from_name("split-screen"), LayoutKind::SplitScreen);
        assert_eq!(LayoutKind::from_name("unknown-value"), LayoutKind::Centered);
        assert_eq!(LayoutKind::from_name(""), LayoutKind::Centered);
    }

    #[test]
    fn test_layout_name_round_trip() {
        for layout in LayoutKind::ALL {
            assert_eq!(LayoutKind::from_name(layout.name()), layout);
        }
    }

    #[test]
    fn test_deserialize_full_record() {
        let json = r##"{
            "title": "Grow Faster",
            "subtitle": "Tools for teams",
            "ctaText": "Go",
            "primaryColor": "#112233",
            "accentColor": "#445566",
            "layout": "split-screen",
            "backgroundImageUrl": "data:image/png;base64,AAAA"
        }"##;
        let ad = AdDescription::from_json(json).unwrap();
        assert_eq!(ad.cta_text, "Go");
        assert_eq!(ad.layout, LayoutKind::SplitScreen);
        assert_eq!(ad.primary().to_rgba8(), [0x11, 0x22, 0x33, 255]);
        assert_eq!(ad.background_reference(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let ad = AdDescription::from_json(r#"{"title":"X","ctaText":"Y"}"#).unwrap();
        assert_eq!(ad.subtitle, "");
        assert_eq!(ad.layout, LayoutKind::Centered);
        assert_eq!(ad.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(ad.accent_color, DEFAULT_ACCENT_COLOR);
        assert_eq!(ad.background_reference(), None);
    }

    #[test]
    fn test_deserialize_unknown_and_null_layout() {
        let ad =
            AdDescription::from_json(r#"{"title":"X","ctaText":"Y","layout":"diagonal"}"#).unwrap();
        assert_eq!(ad.layout, LayoutKind::Centered);
        let ad = AdDescription::from_json(r#"{"title":"X","ctaText":"Y","layout":null}"#).unwrap();
        assert_eq!(ad.layout, LayoutKind::Centered);
    }

    #[test]
    fn test_missing_required_field_is_error() {
        assert!(AdDescription::from_json(r#"{"title":"X"}"#).is_err());
    }

    #[test]
    fn test_blank_background_is_absent() {
        let ad = AdDescription::new("X", "Y").with_background("   ");
        assert_eq!(ad.background_reference(), None);
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let ad = AdDescription::new("X", "Y").with_colors("blue", "#12");
        assert_eq!(ad.primary().to_rgba8(), [0x42, 0x85, 0xF4, 255]);
        assert_eq!(ad.accent().to_rgba8(), [0xEA, 0x43, 0x35, 255]);
    }

    #[test]
    fn test_serialize_layout_as_name() {
        let ad = AdDescription::new("X", "Y").with_layout(LayoutKind::BottomOverlay);
        let json = serde_json::to_string(&ad).unwrap();
        assert!(json.contains(r#""layout":"bottom-overlay""#));
        assert!(json.contains(r#""ctaText":"Y""#));
    }

    #[test]
    fn test_surface_sizes() {
        assert_eq!(RenderMode::Export.surface_size(LayoutKind::SplitScreen), (1080, 1080));
        assert_eq!(RenderMode::Edit.surface_size(LayoutKind::Centered), (800, 600));
        assert_eq!(RenderMode::Edit.surface_size(LayoutKind::SplitScreen), (800, 1200));
    }

    #[test]
    fn test_render_mode_from_str() {
        assert_eq!("edit".parse::<RenderMode>().unwrap(), RenderMode::Edit);
        assert_eq!("EXPORT".parse::<RenderMode>().unwrap(), RenderMode::Export);
        assert!("print".parse::<RenderMode>().is_err());
    }
}
