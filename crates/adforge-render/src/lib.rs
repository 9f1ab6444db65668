//! # adforge-render
//!
//! The Adforge rendering engine. Takes an ad description and paints it onto a
//! 2D surface: background image or gradient, then one of four layouts.
//! Single-threaded and CPU-only; only the background fetch is async.

pub mod compositor;
pub mod editor;
pub mod export;
pub mod image_loader;
pub mod layout;
pub mod recording;
pub mod shapes;
pub mod surface;
pub mod text;

pub use compositor::{Background, BackgroundKind, Compositor, PassOutcome, PendingPass};
pub use editor::{EditSession, FieldValue};
pub use hit_test::{ElementId, HitTester, Selection};
pub use image_loader::{ImageSource, LocalImageSource};
pub use layout::{plan_layout, DrawOp, InteractiveElement, LayoutContext, LayoutPlan};
pub use recording::{RecordingSurface, SurfaceCall};
pub use surface::{RasterSurface, Surface};
pub use text::{Font, FontBook, TextAlign, TextMeasure};
