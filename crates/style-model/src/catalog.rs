//! Static style catalogs.
//!
//! Device models, color variants, browser chrome presets, background presets,
//! and canvas sizes are read-only lookup tables keyed by id. Every lookup
//! falls back to the first entry of its table when the id is unknown, so a
//! stale or mistyped id never becomes an error.

use serde::Serialize;

use crate::color::Rgba;
use crate::style::{BrowserTheme, BrowserType};

/// A phone model entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceModel {
    pub id: &'static str,
    pub name: &'static str,
    /// Human-readable native screen resolution.
    pub screen_resolution: &'static str,
    /// Reference thumbnail path (relative to the assets directory).
    pub thumb_image: &'static str,
}

/// A color/finish variant for a phone family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceColor {
    pub id: &'static str,
    pub name: &'static str,
    /// Reference frame art path (relative to the assets directory).
    pub frame_image: &'static str,
    /// Reference thumbnail path (relative to the assets directory).
    pub thumb_image: &'static str,
    /// Bezel tint used when the frame art is drawn procedurally.
    pub bezel: Rgba,
    /// Display-mode skin: no physical bezel, the screen fills the frame.
    pub display_mode: bool,
}

/// Chrome palette for one browser theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromePalette {
    pub thumb_image: &'static str,
    pub window: Rgba,
    pub toolbar: Rgba,
    pub tab_strip: Rgba,
    pub active_tab: Rgba,
    pub address_bar: Rgba,
    pub text: Rgba,
    pub muted_text: Rgba,
    pub divider: Rgba,
}

/// A browser chrome preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowserPreset {
    pub id: BrowserType,
    pub name: &'static str,
    pub light: ChromePalette,
    pub dark: ChromePalette,
}

impl BrowserPreset {
    pub fn palette(&self, theme: BrowserTheme) -> &ChromePalette {
        match theme {
            BrowserTheme::Light => &self.light,
            BrowserTheme::Dark => &self.dark,
        }
    }
}

/// A gradient background preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientPreset {
    pub id: &'static str,
    pub name: &'static str,
    /// CSS `linear-gradient(...)` descriptor.
    pub style: &'static str,
}

/// A canvas size preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasSize {
    pub id: &'static str,
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Traffic-light button colors shared by both browser presets.
pub const TRAFFIC_LIGHTS: [Rgba; 3] = [
    Rgba::rgb(0xff, 0x5f, 0x57),
    Rgba::rgb(0xfe, 0xbc, 0x2e),
    Rgba::rgb(0x28, 0xc8, 0x40),
];

pub static IPHONE_MODELS: &[DeviceModel] = &[DeviceModel {
    id: "iphone-16-pro",
    name: "iPhone 16 Pro",
    screen_resolution: "1206 x 2622",
    thumb_image: "devices/iphone/iphone-16-pro-thumb.png",
}];

pub static IPHONE_COLORS: &[DeviceColor] = &[
    DeviceColor {
        id: "black-titanium",
        name: "Black Titanium",
        frame_image: "devices/iphone/black-titanium.png",
        thumb_image: "devices/iphone/black-titanium-thumb.png",
        bezel: Rgba::rgb(0x3c, 0x3c, 0x3d),
        display_mode: false,
    },
    DeviceColor {
        id: "white-titanium",
        name: "White Titanium",
        frame_image: "devices/iphone/white-titanium.png",
        thumb_image: "devices/iphone/white-titanium-thumb.png",
        bezel: Rgba::rgb(0xf2, 0xf1, 0xed),
        display_mode: false,
    },
    DeviceColor {
        id: "natural-titanium",
        name: "Natural Titanium",
        frame_image: "devices/iphone/natural-titanium.png",
        thumb_image: "devices/iphone/natural-titanium-thumb.png",
        bezel: Rgba::rgb(0xc2, 0xbc, 0xb2),
        display_mode: false,
    },
    DeviceColor {
        id: "desert-titanium",
        name: "Desert Titanium",
        frame_image: "devices/iphone/desert-titanium.png",
        thumb_image: "devices/iphone/desert-titanium-thumb.png",
        bezel: Rgba::rgb(0xbf, 0xa4, 0x8f),
        display_mode: false,
    },
    DeviceColor {
        id: "display",
        name: "Display",
        frame_image: "devices/iphone/display.png",
        thumb_image: "devices/iphone/display-thumb.png",
        bezel: Rgba::rgb(0x1c, 0x1c, 0x1e),
        display_mode: true,
    },
];

pub static PIXEL_MODELS: &[DeviceModel] = &[DeviceModel {
    id: "pixel-9-pro",
    name: "Pixel 9 Pro",
    screen_resolution: "1280 x 2856",
    thumb_image: "devices/pixel/pixel-9-pro-thumb.png",
}];

pub static PIXEL_COLORS: &[DeviceColor] = &[
    DeviceColor {
        id: "obsidian",
        name: "Obsidian",
        frame_image: "devices/pixel/obsidian.png",
        thumb_image: "devices/pixel/obsidian-thumb.png",
        bezel: Rgba::rgb(0x20, 0x21, 0x24),
        display_mode: false,
    },
    DeviceColor {
        id: "porcelain",
        name: "Porcelain",
        frame_image: "devices/pixel/porcelain.png",
        thumb_image: "devices/pixel/porcelain-thumb.png",
        bezel: Rgba::rgb(0xe8, 0xe4, 0xdc),
        display_mode: false,
    },
    DeviceColor {
        id: "hazel",
        name: "Hazel",
        frame_image: "devices/pixel/hazel.png",
        thumb_image: "devices/pixel/hazel-thumb.png",
        bezel: Rgba::rgb(0x8d, 0x91, 0x85),
        display_mode: false,
    },
    DeviceColor {
        id: "rose-quartz",
        name: "Rose Quartz",
        frame_image: "devices/pixel/rose-quartz.png",
        thumb_image: "devices/pixel/rose-quartz-thumb.png",
        bezel: Rgba::rgb(0xf0, 0xcf, 0xc8),
        display_mode: false,
    },
    DeviceColor {
        id: "display",
        name: "Display",
        frame_image: "devices/pixel/display.png",
        thumb_image: "devices/pixel/display-thumb.png",
        bezel: Rgba::rgb(0x12, 0x12, 0x12),
        display_mode: true,
    },
];

pub static BROWSER_PRESETS: &[BrowserPreset] = &[
    BrowserPreset {
        id: BrowserType::Safari,
        name: "Safari",
        light: ChromePalette {
            thumb_image: "browsers/safari-light-thumb.png",
            window: Rgba::rgb(0xff, 0xff, 0xff),
            toolbar: Rgba::rgb(0xf6, 0xf6, 0xf6),
            tab_strip: Rgba::rgb(0xe9, 0xe9, 0xeb),
            active_tab: Rgba::rgb(0xf6, 0xf6, 0xf6),
            address_bar: Rgba::rgb(0xe3, 0xe3, 0xe5),
            text: Rgba::rgb(0x1d, 0x1d, 0x1f),
            muted_text: Rgba::rgb(0x86, 0x86, 0x8b),
            divider: Rgba::rgb(0xd8, 0xd8, 0xda),
        },
        dark: ChromePalette {
            thumb_image: "browsers/safari-dark-thumb.png",
            window: Rgba::rgb(0x1e, 0x1e, 0x1e),
            toolbar: Rgba::rgb(0x2c, 0x2c, 0x2e),
            tab_strip: Rgba::rgb(0x24, 0x24, 0x26),
            active_tab: Rgba::rgb(0x2c, 0x2c, 0x2e),
            address_bar: Rgba::rgb(0x3a, 0x3a, 0x3c),
            text: Rgba::rgb(0xf5, 0xf5, 0xf7),
            muted_text: Rgba::rgb(0x98, 0x98, 0x9d),
            divider: Rgba::rgb(0x10, 0x10, 0x10),
        },
    },
    BrowserPreset {
        id: BrowserType::Chrome,
        name: "Chrome",
        light: ChromePalette {
            thumb_image: "browsers/chrome-light-thumb.png",
            window: Rgba::rgb(0xff, 0xff, 0xff),
            toolbar: Rgba::rgb(0xff, 0xff, 0xff),
            tab_strip: Rgba::rgb(0xde, 0xe1, 0xe6),
            active_tab: Rgba::rgb(0xff, 0xff, 0xff),
            address_bar: Rgba::rgb(0xf1, 0xf3, 0xf4),
            text: Rgba::rgb(0x20, 0x21, 0x24),
            muted_text: Rgba::rgb(0x5f, 0x63, 0x68),
            divider: Rgba::rgb(0xda, 0xdc, 0xe0),
        },
        dark: ChromePalette {
            thumb_image: "browsers/chrome-dark-thumb.png",
            window: Rgba::rgb(0x20, 0x21, 0x24),
            toolbar: Rgba::rgb(0x35, 0x36, 0x3a),
            tab_strip: Rgba::rgb(0x20, 0x21, 0x24),
            active_tab: Rgba::rgb(0x35, 0x36, 0x3a),
            address_bar: Rgba::rgb(0x20, 0x21, 0x24),
            text: Rgba::rgb(0xe8, 0xea, 0xed),
            muted_text: Rgba::rgb(0x9a, 0xa0, 0xa6),
            divider: Rgba::rgb(0x4a, 0x4c, 0x50),
        },
    },
];

pub static GRADIENT_PRESETS: &[GradientPreset] = &[
    GradientPreset {
        id: "lavender",
        name: "Lavender",
        style: "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    },
    GradientPreset {
        id: "peach",
        name: "Peach",
        style: "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    },
    GradientPreset {
        id: "ocean",
        name: "Ocean",
        style: "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
    },
    GradientPreset {
        id: "mint",
        name: "Mint",
        style: "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
    },
    GradientPreset {
        id: "sunset",
        name: "Sunset",
        style: "linear-gradient(135deg, #fa709a 0%, #fee140 100%)",
    },
    GradientPreset {
        id: "midnight",
        name: "Midnight",
        style: "linear-gradient(135deg, #0f2027 0%, #203a43 50%, #2c5364 100%)",
    },
];

pub static SOLID_COLORS: &[&str] = &[
    "#ffffff", "#f5f5f7", "#000000", "#1d1d1f", "#667eea", "#f5576c", "#43e97b", "#fee140",
];

pub static CANVAS_SIZES: &[CanvasSize] = &[
    CanvasSize {
        id: "square",
        label: "Instagram Post",
        width: 1080,
        height: 1080,
    },
    CanvasSize {
        id: "story",
        label: "Instagram Story",
        width: 1080,
        height: 1920,
    },
    CanvasSize {
        id: "twitter",
        label: "Twitter / X",
        width: 1600,
        height: 900,
    },
    CanvasSize {
        id: "dribbble",
        label: "Dribbble",
        width: 1600,
        height: 1200,
    },
    CanvasSize {
        id: "desktop",
        label: "Desktop",
        width: 1920,
        height: 1080,
    },
];

/// Find an entry by id, falling back to the first entry.
fn find_or_first<T>(items: &'static [T], id: &str, key: impl Fn(&T) -> &str) -> &'static T {
    items.iter().find(|item| key(item) == id).unwrap_or_else(|| {
        tracing::warn!(id, "Unknown catalog id, falling back to first entry");
        &items[0]
    })
}

pub fn iphone_model(id: &str) -> &'static DeviceModel {
    find_or_first(IPHONE_MODELS, id, |m| m.id)
}

pub fn iphone_color(id: &str) -> &'static DeviceColor {
    find_or_first(IPHONE_COLORS, id, |c| c.id)
}

pub fn pixel_model(id: &str) -> &'static DeviceModel {
    find_or_first(PIXEL_MODELS, id, |m| m.id)
}

pub fn pixel_color(id: &str) -> &'static DeviceColor {
    find_or_first(PIXEL_COLORS, id, |c| c.id)
}

pub fn browser_preset(browser: BrowserType) -> &'static BrowserPreset {
    BROWSER_PRESETS
        .iter()
        .find(|b| b.id == browser)
        .unwrap_or(&BROWSER_PRESETS[0])
}

pub fn gradient_preset(id: &str) -> &'static GradientPreset {
    find_or_first(GRADIENT_PRESETS, id, |g| g.id)
}

pub fn canvas_preset(id: &str) -> &'static CanvasSize {
    find_or_first(CANVAS_SIZES, id, |c| c.id)
}

/// The preset whose dimensions match exactly, if any.
pub fn matching_canvas_preset(width: u32, height: u32) -> Option<&'static CanvasSize> {
    CANVAS_SIZES
        .iter()
        .find(|c| c.width == width && c.height == height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{parse_color, parse_linear_gradient};

    #[test]
    fn test_known_ids_resolve() {
        assert_eq!(pixel_color("hazel").name, "Hazel");
        assert_eq!(iphone_color("white-titanium").name, "White Titanium");
        assert_eq!(canvas_preset("twitter").width, 1600);
    }

    #[test]
    fn test_unknown_ids_fall_back_to_first() {
        assert_eq!(pixel_color("ultraviolet").id, PIXEL_COLORS[0].id);
        assert_eq!(iphone_model("iphone-3g").id, IPHONE_MODELS[0].id);
        assert_eq!(gradient_preset("").id, GRADIENT_PRESETS[0].id);
        assert_eq!(canvas_preset("billboard").id, CANVAS_SIZES[0].id);
    }

    #[test]
    fn test_each_phone_family_has_a_display_skin() {
        assert!(IPHONE_COLORS.iter().any(|c| c.display_mode));
        assert!(PIXEL_COLORS.iter().any(|c| c.display_mode));
        assert!(!IPHONE_COLORS[0].display_mode);
        assert!(!PIXEL_COLORS[0].display_mode);
    }

    #[test]
    fn test_background_presets_parse() {
        for preset in GRADIENT_PRESETS {
            assert!(parse_linear_gradient(preset.style).is_ok(), "{}", preset.id);
        }
        for color in SOLID_COLORS {
            assert!(parse_color(color).is_ok(), "{color}");
        }
    }

    #[test]
    fn test_matching_canvas_preset() {
        assert_eq!(matching_canvas_preset(1600, 900).map(|c| c.id), Some("twitter"));
        assert!(matching_canvas_preset(1200, 800).is_none());
    }

    #[test]
    fn test_browser_palettes_differ_by_theme() {
        let chrome = browser_preset(BrowserType::Chrome);
        assert_ne!(
            chrome.palette(BrowserTheme::Light).toolbar,
            chrome.palette(BrowserTheme::Dark).toolbar
        );
    }
}
