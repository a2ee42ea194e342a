//! Scene graph produced by the compositor and consumed by the rasterizer.
//!
//! A scene is a background plus one device layer. Device nodes are positioned
//! in device-local logical pixels; the rasterizer centers the layer on the
//! canvas, applies the mockup scale, and adds the drop shadow.

use ollim_style_model::color::{LinearGradient, Rgba};
use ollim_style_model::geometry::Rect;
use ollim_style_model::style::PhoneFamily;

use crate::asset::ImageAsset;

/// Canvas background.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundLayer {
    /// True alpha zero in exports.
    Transparent,
    Solid(Rgba),
    Gradient(LinearGradient),
}

/// Drop shadow under the device layer, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropShadow {
    /// Blur radius; the Gaussian sigma is half of it.
    pub blur: f64,
    pub offset_y: f64,
    pub opacity: f64,
}

impl DropShadow {
    /// Shadow for an intensity in `[0, 100]`; none at 0.
    pub fn from_intensity(intensity: u32) -> Option<Self> {
        if intensity == 0 {
            return None;
        }
        let intensity = intensity.min(100) as f64;
        Some(Self {
            blur: 20.0 + intensity * 0.8,
            offset_y: intensity * 0.3,
            opacity: intensity / 100.0,
        })
    }
}

/// Horizontal text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// What fills an empty image slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub background: Rgba,
    pub icon: Rgba,
    pub title: String,
    pub subtitle: String,
    pub text: Rgba,
}

/// Phone frame art.
///
/// `key` names reference art in the assets directory; without it the bezel
/// is drawn from `family`, `bezel` and the screen cut-out.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameArt {
    pub key: &'static str,
    pub family: PhoneFamily,
    pub bezel: Rgba,
    /// Screen opening, frame-local.
    pub screen: Rect,
    pub screen_radius: f64,
}

/// One drawable element of the device layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Fill {
        rect: Rect,
        radius: f64,
        color: Rgba,
    },
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: Rgba,
    },
    /// Screenshot drawn with object-fit cover.
    Image {
        rect: Rect,
        radius: f64,
        asset: ImageAsset,
    },
    Placeholder {
        rect: Rect,
        radius: f64,
        placeholder: Placeholder,
    },
    FrameArt {
        rect: Rect,
        art: FrameArt,
    },
    /// Single line of text; `y` is the top of the line box.
    Text {
        x: f64,
        y: f64,
        size: f64,
        color: Rgba,
        text: String,
        max_width: f64,
        align: TextAlign,
    },
}

/// The device with its frame, content, and effects.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceLayer {
    pub width: f64,
    pub height: f64,
    /// Mockup scale around the layer center.
    pub scale: f64,
    /// Rounded clip applied to the whole layer; 0 for none.
    pub corner_radius: f64,
    pub shadow: Option<DropShadow>,
    pub nodes: Vec<Node>,
}

impl DeviceLayer {
    /// Top-left corner on the canvas once centered and scaled.
    pub fn placement(&self, canvas_width: f64, canvas_height: f64) -> Rect {
        let width = self.width * self.scale;
        let height = self.height * self.scale;
        Rect::new(
            (canvas_width - width) / 2.0,
            (canvas_height - height) / 2.0,
            width,
            height,
        )
    }

    /// The content image node, if one is placed.
    pub fn image(&self) -> Option<&ImageAsset> {
        self.nodes.iter().find_map(|node| match node {
            Node::Image { asset, .. } => Some(asset),
            _ => None,
        })
    }

    pub fn has_placeholder(&self) -> bool {
        self.nodes
            .iter()
            .any(|node| matches!(node, Node::Placeholder { .. }))
    }

    pub fn has_frame_art(&self) -> bool {
        self.nodes
            .iter()
            .any(|node| matches!(node, Node::FrameArt { .. }))
    }

    /// Every text run, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A fully composed mockup at logical canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: BackgroundLayer,
    pub device: DeviceLayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_absent_at_zero() {
        assert_eq!(DropShadow::from_intensity(0), None);
    }

    #[test]
    fn test_shadow_formula() {
        let shadow = DropShadow::from_intensity(50).unwrap();
        assert_eq!(shadow.blur, 60.0);
        assert_eq!(shadow.offset_y, 15.0);
        assert_eq!(shadow.opacity, 0.5);

        let full = DropShadow::from_intensity(100).unwrap();
        assert_eq!(full.blur, 100.0);
        assert_eq!(full.offset_y, 30.0);
        assert_eq!(full.opacity, 1.0);
    }

    proptest::proptest! {
        #[test]
        fn shadow_tracks_intensity(intensity in 1u32..=100) {
            let shadow = DropShadow::from_intensity(intensity).unwrap();
            let i = intensity as f64;
            proptest::prop_assert!((shadow.blur - (20.0 + 0.8 * i)).abs() < 1e-9);
            proptest::prop_assert!((shadow.offset_y - 0.3 * i).abs() < 1e-9);
            proptest::prop_assert!((shadow.opacity - i / 100.0).abs() < 1e-9);
            proptest::prop_assert!(shadow.opacity > 0.0 && shadow.opacity <= 1.0);
        }
    }

    #[test]
    fn test_placement_centers_scaled_layer() {
        let layer = DeviceLayer {
            width: 200.0,
            height: 100.0,
            scale: 0.5,
            corner_radius: 0.0,
            shadow: None,
            nodes: Vec::new(),
        };
        assert_eq!(
            layer.placement(1000.0, 500.0),
            Rect::new(450.0, 225.0, 100.0, 50.0)
        );
    }
}
