//! Ollim Style Model
//!
//! Defines the data contracts every mockup is derived from:
//! - **Style:** The single [`StyleConfig`] state object and its commands
//! - **Catalogs:** Device models, colors, browser chrome, background and canvas presets
//! - **Geometry:** Frame sizes and screen insets per device
//! - **Preview:** Display-only fit scaling
//! - **Export:** Output formats, quality presets, and size estimates
//!
//! Everything here is pure data and arithmetic; rasterization lives in
//! `ollim-render-engine`.

pub mod catalog;
pub mod color;
pub mod export;
pub mod geometry;
pub mod preview;
pub mod store;
pub mod style;

pub use color::*;
pub use export::*;
pub use geometry::*;
pub use preview::*;
pub use store::*;
pub use style::*;
