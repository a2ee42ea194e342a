//! Ollim Render Engine
//!
//! Turns a style configuration and a screenshot into a device mockup, and
//! rasterizes that mockup for the on-screen preview or for export.
//!
//! # Pipeline Architecture
//!
//! ```text
//! StyleCommand ──► StyleStore ──┐
//!                               ├── Compositor ──► Scene
//! image bytes ───► ImageSlot ───┘                    │
//!                          ┌─────────────────────────┤
//!                          ▼                         ▼
//!             Rasterize (fit × zoom)       Rasterize (2x export)
//!                          │                         │
//!                          ▼                ┌────────┴────────┐
//!                       preview             ▼                 ▼
//!                                   PNG / JPEG file       clipboard
//! ```

pub mod asset;
pub mod clipboard;
pub mod compositor;
pub mod effects;
pub mod export;
pub mod raster;
pub mod scene;
pub mod session;
pub mod text;

pub use asset::{ImageAsset, ImageMime};
pub use clipboard::{default_clipboard, ClipboardSink, NoClipboard};
pub use export::*;
pub use raster::{rasterize, Surface};
pub use scene::Scene;
pub use session::{ImageSelection, PendingImage, Studio};
