//! Preview scaling: fit the logical canvas into the visible viewport.
//!
//! The factor only affects how the composition is displayed. Exports always
//! rasterize the logical canvas at the fixed export multiplier.

use serde::{Deserialize, Serialize};

/// Share of the viewport the canvas may occupy.
pub const VIEWPORT_FILL: f64 = 0.9;

/// Fit factor for a canvas shown inside a viewport.
///
/// `min(vw * 0.9 / cw, vh * 0.9 / ch, 1)`; never upscales. Degenerate inputs
/// yield 0.
pub fn compute_scale(
    viewport_width: f64,
    viewport_height: f64,
    canvas_width: f64,
    canvas_height: f64,
) -> f64 {
    if canvas_width <= 0.0 || canvas_height <= 0.0 {
        return 0.0;
    }
    let scale_x = viewport_width * VIEWPORT_FILL / canvas_width;
    let scale_y = viewport_height * VIEWPORT_FILL / canvas_height;
    scale_x.min(scale_y).min(1.0).max(0.0)
}

/// Observed viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

/// Tracks the viewport and the resulting fit factor.
///
/// Driven by resize notifications; the factor stays 0 until the first one.
#[derive(Debug, Clone, Default)]
pub struct PreviewScaler {
    viewport: Option<ViewportSize>,
    canvas: (u32, u32),
    fit: f64,
}

impl PreviewScaler {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            viewport: None,
            canvas: (canvas_width, canvas_height),
            fit: 0.0,
        }
    }

    /// Record a viewport resize and recompute the fit.
    pub fn observe_resize(&mut self, width: f64, height: f64) -> f64 {
        self.viewport = Some(ViewportSize { width, height });
        self.recompute();
        tracing::debug!(width, height, fit = self.fit, "Viewport resized");
        self.fit
    }

    /// Canvas size changed; recompute against the last observed viewport.
    pub fn set_canvas(&mut self, width: u32, height: u32) {
        self.canvas = (width, height);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.fit = match self.viewport {
            Some(vp) => compute_scale(
                vp.width,
                vp.height,
                self.canvas.0 as f64,
                self.canvas.1 as f64,
            ),
            None => 0.0,
        };
    }

    pub fn viewport(&self) -> Option<ViewportSize> {
        self.viewport
    }

    /// Fit factor without zoom.
    pub fn fit(&self) -> f64 {
        self.fit
    }

    /// Effective display scale: fit times user zoom.
    pub fn display_scale(&self, zoom_percent: u32) -> f64 {
        self.fit * zoom_percent as f64 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_scale_fits_smaller_axis() {
        let scale = compute_scale(1000.0, 800.0, 1080.0, 1080.0);
        assert!((scale - 720.0 / 1080.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_scale_never_upscales() {
        assert_eq!(compute_scale(4000.0, 4000.0, 1080.0, 1080.0), 1.0);
    }

    #[test]
    fn test_compute_scale_degenerate_canvas() {
        assert_eq!(compute_scale(1000.0, 1000.0, 0.0, 1080.0), 0.0);
    }

    #[test]
    fn test_scaler_is_zero_before_first_resize() {
        let scaler = PreviewScaler::new(1080, 1080);
        assert_eq!(scaler.fit(), 0.0);
        assert_eq!(scaler.display_scale(150), 0.0);
    }

    #[test]
    fn test_scaler_tracks_resizes_and_canvas_changes() {
        let mut scaler = PreviewScaler::new(1000, 1000);
        assert!((scaler.observe_resize(500.0, 500.0) - 0.45).abs() < 1e-9);
        scaler.set_canvas(2000, 1000);
        assert!((scaler.fit() - 0.225).abs() < 1e-9);
        assert!((scaler.display_scale(200) - 0.45).abs() < 1e-9);
    }
}
