//! Frame geometry for every device kind.
//!
//! Phone frames keep the aspect ratio of their reference art and place the
//! screenshot inside a fixed screen inset, expressed as fractions of the frame
//! (`(0.0, 0.0)` top-left, `(1.0, 1.0)` bottom-right). Browser windows size
//! themselves around their content under a fixed pixel chrome layout.
//! Borderless devices have no frame at all.

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::style::{BrowserType, Device, PhoneFamily};

/// Maximum share of the canvas height a phone frame may use.
pub const PHONE_MAX_HEIGHT_RATIO: f64 = 0.7;
/// Maximum share of the canvas width a phone frame may use.
pub const PHONE_MAX_WIDTH_RATIO: f64 = 0.4;
/// Browser windows scale their content down to fit this share of the canvas.
pub const BROWSER_FIT_RATIO: f64 = 0.8;
/// Browser content size when no screenshot is selected.
pub const BROWSER_PLACEHOLDER_SIZE: (f64, f64) = (640.0, 400.0);
/// Browser window corner radius.
pub const BROWSER_CORNER_RADIUS: f64 = 10.0;
/// Borderless placeholder box.
pub const BORDERLESS_PLACEHOLDER_SIZE: (f64, f64) = (288.0, 288.0);
/// Borderless image corner radius.
pub const BORDERLESS_CORNER_RADIUS: f64 = 16.0;

/// An axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Shrink by `amount` on every side, never below zero size.
    pub fn inset(&self, amount: f64) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A sub-rectangle expressed as fractions of its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inset {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Inset {
    /// The whole container.
    pub const FULL: Inset = Inset {
        left: 0.0,
        top: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Resolve against a container of the given size.
    pub fn apply(&self, width: f64, height: f64) -> Rect {
        Rect::new(
            self.left * width,
            self.top * height,
            self.width * width,
            self.height * height,
        )
    }
}

/// Pixel geometry of a phone family's reference frame art.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhoneSpec {
    pub art_width: f64,
    pub art_height: f64,
    /// Screen opening within the art, in art pixels.
    pub screen: Rect,
    /// Screen corner radius, in art pixels.
    pub screen_radius: f64,
}

pub const IPHONE_SPEC: PhoneSpec = PhoneSpec {
    art_width: 1508.0,
    art_height: 3278.0,
    screen: Rect::new(76.0, 70.0, 1356.0, 3138.0),
    screen_radius: 200.0,
};

pub const PIXEL_SPEC: PhoneSpec = PhoneSpec {
    art_width: 600.0,
    art_height: 1301.0,
    screen: Rect::new(57.0, 127.0, 486.0, 1048.0),
    screen_radius: 24.0,
};

impl PhoneSpec {
    /// Height over width.
    pub fn aspect_ratio(&self) -> f64 {
        self.art_height / self.art_width
    }

    pub fn screen_inset(&self) -> Inset {
        Inset {
            left: self.screen.x / self.art_width,
            top: self.screen.y / self.art_height,
            width: self.screen.width / self.art_width,
            height: self.screen.height / self.art_height,
        }
    }
}

impl PhoneFamily {
    pub fn spec(self) -> &'static PhoneSpec {
        match self {
            PhoneFamily::Iphone => &IPHONE_SPEC,
            PhoneFamily::Pixel => &PIXEL_SPEC,
        }
    }
}

/// Resolved phone frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameGeometry {
    pub family: PhoneFamily,
    /// Container size. In display mode this is the screen area only.
    pub frame_width: f64,
    pub frame_height: f64,
    /// Where the screenshot sits within the container.
    pub screen_inset: Inset,
    /// Screen corner radius in logical pixels.
    pub border_radius: f64,
    /// No bezel art is drawn.
    pub display_mode: bool,
}

impl FrameGeometry {
    pub fn screen_rect(&self) -> Rect {
        self.screen_inset.apply(self.frame_width, self.frame_height)
    }
}

/// Resolve a phone frame inside an available box.
///
/// Unknown model or color ids resolve to the first catalog entry.
pub fn resolve_phone(
    family: PhoneFamily,
    model_id: &str,
    color_id: &str,
    available_width: f64,
    available_height: f64,
) -> FrameGeometry {
    let spec = family.spec();
    let (model, color) = match family {
        PhoneFamily::Iphone => (catalog::iphone_model(model_id), catalog::iphone_color(color_id)),
        PhoneFamily::Pixel => (catalog::pixel_model(model_id), catalog::pixel_color(color_id)),
    };
    tracing::trace!(model = model.id, color = color.id, "Resolving phone frame");
    let display_mode = color.display_mode;

    let aspect = spec.aspect_ratio();
    let max_height = available_height * PHONE_MAX_HEIGHT_RATIO;
    let width_from_height = max_height / aspect;
    let max_width = available_width * PHONE_MAX_WIDTH_RATIO;
    let frame_width = width_from_height.min(max_width).max(0.0);
    let frame_height = (frame_width * aspect).round();
    let border_radius = spec.screen_radius / spec.art_width * frame_width;
    let inset = spec.screen_inset();

    if display_mode {
        FrameGeometry {
            family,
            frame_width: inset.width * frame_width,
            frame_height: inset.height * frame_height,
            screen_inset: Inset::FULL,
            border_radius,
            display_mode,
        }
    } else {
        FrameGeometry {
            family,
            frame_width,
            frame_height,
            screen_inset: inset,
            border_radius,
            display_mode,
        }
    }
}

/// Fixed pixel layout of a browser chrome, in window-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromeLayout {
    /// Total chrome height above the content.
    pub height: f64,
    /// Traffic light centers.
    pub traffic_lights: [(f64, f64); 3],
    pub traffic_light_radius: f64,
    /// Tab strip and its single tab; only Chrome draws these.
    pub tab_strip: Option<Rect>,
    pub tab: Option<Rect>,
    pub tab_radius: f64,
    pub toolbar: Rect,
    pub address_bar: Rect,
    pub address_radius: f64,
    /// Address text is centered (Safari) or left-aligned (Chrome).
    pub address_centered: bool,
}

/// Chrome layout for a window of the given width.
pub fn browser_chrome(browser: BrowserType, window_width: f64) -> ChromeLayout {
    match browser {
        BrowserType::Safari => {
            let toolbar = Rect::new(0.0, 0.0, window_width, 52.0);
            let bar_width = (window_width * 0.5)
                .clamp(120.0, 480.0)
                .min((window_width - 16.0).max(0.0));
            ChromeLayout {
                height: 52.0,
                traffic_lights: [(20.0, 26.0), (40.0, 26.0), (60.0, 26.0)],
                traffic_light_radius: 6.0,
                tab_strip: None,
                tab: None,
                tab_radius: 0.0,
                toolbar,
                address_bar: Rect::new((window_width - bar_width) / 2.0, 12.0, bar_width, 28.0),
                address_radius: 8.0,
                address_centered: true,
            }
        }
        BrowserType::Chrome => {
            let tab_strip = Rect::new(0.0, 0.0, window_width, 40.0);
            let tab_width = (window_width - 100.0).clamp(0.0, 240.0);
            let toolbar = Rect::new(0.0, 40.0, window_width, 44.0);
            ChromeLayout {
                height: 84.0,
                traffic_lights: [(20.0, 20.0), (40.0, 20.0), (60.0, 20.0)],
                traffic_light_radius: 6.0,
                tab_strip: Some(tab_strip),
                tab: Some(Rect::new(78.0, 8.0, tab_width, 32.0)),
                tab_radius: 8.0,
                toolbar,
                address_bar: Rect::new(88.0, 47.0, (window_width - 104.0).max(0.0), 30.0),
                address_radius: 15.0,
                address_centered: false,
            }
        }
    }
}

/// Resolved browser window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowserGeometry {
    pub browser_type: BrowserType,
    pub window_width: f64,
    pub window_height: f64,
    /// Content area in window-local coordinates.
    pub content: Rect,
    pub chrome: ChromeLayout,
    pub corner_radius: f64,
}

/// Size a browser window around its content.
///
/// `content` is the screenshot's natural size; it is scaled down (never up)
/// so the whole window fits the fit share of the canvas.
pub fn resolve_browser(
    browser: BrowserType,
    content: Option<(u32, u32)>,
    canvas_width: f64,
    canvas_height: f64,
) -> BrowserGeometry {
    let chrome_height = browser_chrome(browser, 0.0).height;
    let (content_width, content_height) = match content {
        Some((w, h)) if w > 0 && h > 0 => {
            let (w, h) = (w as f64, h as f64);
            let max_width = canvas_width * BROWSER_FIT_RATIO;
            let max_height = (canvas_height * BROWSER_FIT_RATIO - chrome_height).max(1.0);
            let scale = (max_width / w).min(max_height / h).min(1.0);
            ((w * scale).round().max(1.0), (h * scale).round().max(1.0))
        }
        _ => BROWSER_PLACEHOLDER_SIZE,
    };

    let chrome = browser_chrome(browser, content_width);
    BrowserGeometry {
        browser_type: browser,
        window_width: content_width,
        window_height: chrome.height + content_height,
        content: Rect::new(0.0, chrome.height, content_width, content_height),
        chrome,
        corner_radius: BROWSER_CORNER_RADIUS,
    }
}

/// Resolved borderless device: the image itself with rounded corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderlessGeometry {
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
}

/// Borderless devices show the image at natural size.
pub fn resolve_borderless(content: Option<(u32, u32)>) -> BorderlessGeometry {
    let (width, height) = match content {
        Some((w, h)) if w > 0 && h > 0 => (w as f64, h as f64),
        _ => BORDERLESS_PLACEHOLDER_SIZE,
    };
    BorderlessGeometry {
        width,
        height,
        corner_radius: BORDERLESS_CORNER_RADIUS,
    }
}

/// Geometry of whichever device is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeviceGeometry {
    Phone(FrameGeometry),
    Browser(BrowserGeometry),
    Borderless(BorderlessGeometry),
}

impl DeviceGeometry {
    /// Outer size of the device container, before mockup scaling.
    pub fn size(&self) -> (f64, f64) {
        match self {
            DeviceGeometry::Phone(frame) => (frame.frame_width, frame.frame_height),
            DeviceGeometry::Browser(browser) => (browser.window_width, browser.window_height),
            DeviceGeometry::Borderless(b) => (b.width, b.height),
        }
    }

    /// Rect the screenshot (or its placeholder) occupies, container-local.
    pub fn content_rect(&self) -> Rect {
        match self {
            DeviceGeometry::Phone(frame) => frame.screen_rect(),
            DeviceGeometry::Browser(browser) => browser.content,
            DeviceGeometry::Borderless(b) => Rect::from_size(b.width, b.height),
        }
    }
}

/// Resolve the active device against the canvas.
///
/// `content` is the natural size of the selected screenshot, if any; phone
/// frames ignore it.
pub fn resolve(
    device: Device<'_>,
    content: Option<(u32, u32)>,
    canvas_width: f64,
    canvas_height: f64,
) -> DeviceGeometry {
    if let Some((family, selection)) = device.phone() {
        return DeviceGeometry::Phone(resolve_phone(
            family,
            &selection.model,
            &selection.color,
            canvas_width,
            canvas_height,
        ));
    }
    match device {
        Device::Browser(browser) => DeviceGeometry::Browser(resolve_browser(
            browser.browser_type,
            content,
            canvas_width,
            canvas_height,
        )),
        _ => DeviceGeometry::Borderless(resolve_borderless(content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleConfig;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_iphone_on_square_canvas_is_height_bound() {
        let frame = resolve_phone(PhoneFamily::Iphone, "", "black-titanium", 1080.0, 1080.0);
        let expected_width = 1080.0 * 0.7 / (3278.0 / 1508.0);
        assert!(approx(frame.frame_width, expected_width));
        assert_eq!(frame.frame_height, (expected_width * 3278.0 / 1508.0).round());
        assert!(!frame.display_mode);
    }

    #[test]
    fn test_pixel_on_tall_canvas_is_width_bound() {
        let frame = resolve_phone(PhoneFamily::Pixel, "pixel-9-pro", "obsidian", 1000.0, 4000.0);
        assert!(approx(frame.frame_width, 400.0));
        assert_eq!(frame.frame_height, (400.0_f64 * 1301.0 / 600.0).round());
        assert!(approx(frame.border_radius, 16.0));
    }

    #[test]
    fn test_pixel_screen_inset_matches_art() {
        let inset = PIXEL_SPEC.screen_inset();
        assert!(approx(inset.left, 57.0 / 600.0));
        assert!(approx(inset.top, 127.0 / 1301.0));
        assert!(approx(inset.width, 486.0 / 600.0));
        assert!(approx(inset.height, 1048.0 / 1301.0));
    }

    #[test]
    fn test_display_mode_shrinks_to_screen_area() {
        let normal = resolve_phone(PhoneFamily::Pixel, "", "obsidian", 1000.0, 4000.0);
        let display = resolve_phone(PhoneFamily::Pixel, "", "display", 1000.0, 4000.0);
        assert!(display.display_mode);
        assert_eq!(display.screen_inset, Inset::FULL);
        let screen = normal.screen_rect();
        assert!(approx(display.frame_width, screen.width));
        assert!(approx(display.frame_height, screen.height));
        assert!(approx(display.border_radius, normal.border_radius));
    }

    #[test]
    fn test_unknown_color_uses_first_entry() {
        let fallback = resolve_phone(PhoneFamily::Pixel, "", "not-a-color", 1080.0, 1080.0);
        let first = resolve_phone(PhoneFamily::Pixel, "", "obsidian", 1080.0, 1080.0);
        assert_eq!(fallback, first);
    }

    #[test]
    fn test_safari_chrome_layout() {
        let chrome = browser_chrome(BrowserType::Safari, 800.0);
        assert_eq!(chrome.height, 52.0);
        assert!(chrome.tab.is_none());
        assert!(approx(chrome.address_bar.width, 400.0));
        assert!(approx(chrome.address_bar.center().0, 400.0));
        assert!(chrome.address_centered);
    }

    #[test]
    fn test_chrome_layout_has_tab_strip() {
        let chrome = browser_chrome(BrowserType::Chrome, 800.0);
        assert_eq!(chrome.height, 84.0);
        let tab = chrome.tab.unwrap();
        assert_eq!(tab.width, 240.0);
        assert_eq!(chrome.address_bar.x, 88.0);
        assert!(!chrome.address_centered);
    }

    #[test]
    fn test_browser_scales_large_content_down() {
        let geometry = resolve_browser(BrowserType::Safari, Some((4000, 2000)), 1000.0, 1000.0);
        assert!(geometry.window_width <= 800.0 + 1e-9);
        assert!(geometry.window_height <= 800.0 + 1.0);
        assert_eq!(geometry.content.y, 52.0);
        let ratio = geometry.content.width / geometry.content.height;
        assert!((ratio - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_browser_keeps_small_content_at_natural_size() {
        let geometry = resolve_browser(BrowserType::Chrome, Some((300, 200)), 1080.0, 1080.0);
        assert_eq!(geometry.content, Rect::new(0.0, 84.0, 300.0, 200.0));
        assert_eq!(geometry.window_height, 284.0);
    }

    #[test]
    fn test_browser_placeholder_size() {
        let geometry = resolve_browser(BrowserType::Safari, None, 1080.0, 1080.0);
        assert_eq!(
            (geometry.content.width, geometry.content.height),
            BROWSER_PLACEHOLDER_SIZE
        );
    }

    #[test]
    fn test_borderless_uses_natural_size() {
        let geometry = resolve_borderless(Some((1170, 2532)));
        assert_eq!((geometry.width, geometry.height), (1170.0, 2532.0));
        let placeholder = resolve_borderless(None);
        assert_eq!((placeholder.width, placeholder.height), (288.0, 288.0));
    }

    #[test]
    fn test_resolve_dispatches_on_device() {
        let mut style = StyleConfig::default();
        assert!(matches!(
            resolve(style.device(), None, 1080.0, 1080.0),
            DeviceGeometry::Phone(_)
        ));
        style.device_type = crate::style::DeviceType::Browser;
        assert!(matches!(
            resolve(style.device(), None, 1080.0, 1080.0),
            DeviceGeometry::Browser(_)
        ));
        style.device_type = crate::style::DeviceType::None;
        let geometry = resolve(style.device(), None, 1080.0, 1080.0);
        assert_eq!(geometry.content_rect(), Rect::from_size(288.0, 288.0));
    }
}
