//! # adforge-core
//!
//! Core types and primitives for the Adforge ad renderer.
//! This crate contains foundational types shared across all Adforge crates:
//! the ad description record, colors, frame buffers, geometry, content hashes,
//! configuration and error types.

pub mod ad;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod math;

pub use ad::{AdDescription, ElementKind, LayoutKind, RenderMode};
pub use color::Color;
pub use config::{AdforgeConfig, FontAsset, FontWeight};
pub use error::{AdError, AdResult};
pub use frame::FrameBuffer;
pub use hash::ContentHash;
pub use math::{Point2D, Rect};
