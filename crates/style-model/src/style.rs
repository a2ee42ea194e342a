//! Style configuration: the single state object a mockup is derived from.
//!
//! Every visual parameter lives in [`StyleConfig`]. Per-device selections
//! are kept side by side so switching device type preserves each device's
//! last choice, while [`StyleConfig::device`] exposes only the active one.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    self, CANVAS_SIZES, GRADIENT_PRESETS, IPHONE_COLORS, IPHONE_MODELS, PIXEL_COLORS, PIXEL_MODELS,
};

/// Allowed shadow intensity range.
pub const SHADOW_RANGE: (u32, u32) = (0, 100);
/// Allowed preview zoom range (percent).
pub const ZOOM_RANGE: (u32, u32) = (25, 200);
/// Allowed mockup scale range (percent).
pub const MOCKUP_SCALE_RANGE: (u32, u32) = (25, 200);
/// Step used by the zoom and scale buttons.
pub const PERCENT_STEP: u32 = 25;

/// Which kind of frame wraps the screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Iphone,
    Pixel,
    Browser,
    None,
}

/// How the canvas background is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Gradient,
    Solid,
    Transparent,
}

/// Browser chrome flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    #[default]
    Safari,
    Chrome,
}

/// Browser chrome theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrowserTheme {
    #[default]
    Light,
    Dark,
}

/// Phone family with its own frame art and geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneFamily {
    Iphone,
    Pixel,
}

/// Model and color choice for one phone family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneSelection {
    pub model: String,
    pub color: String,
}

/// Browser chrome choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSelection {
    pub browser_type: BrowserType,
    pub theme: BrowserTheme,
    pub address_url: String,
    /// Only rendered by browsers that draw a tab strip (Chrome).
    pub tab_name: String,
}

impl Default for BrowserSelection {
    fn default() -> Self {
        Self {
            browser_type: BrowserType::Safari,
            theme: BrowserTheme::Light,
            address_url: "yourapp.com".to_string(),
            tab_name: "New Tab".to_string(),
        }
    }
}

/// The complete style state of a mockup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub device_type: DeviceType,
    pub iphone: PhoneSelection,
    pub pixel: PhoneSelection,
    pub browser: BrowserSelection,

    pub background_type: BackgroundType,
    /// CSS color or gradient descriptor; `transparent` for transparent.
    pub background_value: String,

    /// Drop shadow strength in `[0, 100]`.
    pub shadow_intensity: u32,
    /// Preview zoom in percent, display only.
    pub zoom: u32,
    /// Device scale relative to its resolved base size, in percent.
    pub mockup_scale: u32,

    /// Logical canvas size.
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            device_type: DeviceType::Iphone,
            iphone: PhoneSelection {
                model: IPHONE_MODELS[0].id.to_string(),
                color: IPHONE_COLORS[0].id.to_string(),
            },
            pixel: PhoneSelection {
                model: PIXEL_MODELS[0].id.to_string(),
                color: PIXEL_COLORS[0].id.to_string(),
            },
            browser: BrowserSelection::default(),
            background_type: BackgroundType::Gradient,
            background_value: GRADIENT_PRESETS[0].style.to_string(),
            shadow_intensity: 50,
            zoom: 100,
            mockup_scale: 100,
            canvas_width: CANVAS_SIZES[0].width,
            canvas_height: CANVAS_SIZES[0].height,
        }
    }
}

/// The active device with only its own selection attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Device<'a> {
    IPhone(&'a PhoneSelection),
    Pixel(&'a PhoneSelection),
    Browser(&'a BrowserSelection),
    None,
}

impl<'a> Device<'a> {
    /// Phone family and selection, for the two phone variants.
    pub fn phone(&self) -> Option<(PhoneFamily, &'a PhoneSelection)> {
        match *self {
            Device::IPhone(selection) => Some((PhoneFamily::Iphone, selection)),
            Device::Pixel(selection) => Some((PhoneFamily::Pixel, selection)),
            Device::Browser(_) | Device::None => None,
        }
    }
}

/// Display name and thumbnail for the active device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: &'static str,
    pub thumb_image: &'static str,
}

impl StyleConfig {
    /// The active device variant.
    pub fn device(&self) -> Device<'_> {
        match self.device_type {
            DeviceType::Iphone => Device::IPhone(&self.iphone),
            DeviceType::Pixel => Device::Pixel(&self.pixel),
            DeviceType::Browser => Device::Browser(&self.browser),
            DeviceType::None => Device::None,
        }
    }

    /// Name and thumbnail of the active device.
    pub fn device_info(&self) -> DeviceInfo {
        match self.device() {
            Device::IPhone(selection) => {
                let model = catalog::iphone_model(&selection.model);
                DeviceInfo {
                    name: model.name,
                    thumb_image: model.thumb_image,
                }
            }
            Device::Pixel(selection) => {
                let model = catalog::pixel_model(&selection.model);
                DeviceInfo {
                    name: model.name,
                    thumb_image: model.thumb_image,
                }
            }
            Device::Browser(browser) => {
                let preset = catalog::browser_preset(browser.browser_type);
                DeviceInfo {
                    name: preset.name,
                    thumb_image: preset.light.thumb_image,
                }
            }
            Device::None => DeviceInfo {
                name: "None",
                thumb_image: "",
            },
        }
    }

    /// Pull every numeric field back into its documented range.
    ///
    /// Used after deserializing a style file, whose values bypass the store.
    pub fn normalized(mut self) -> Self {
        self.shadow_intensity = clamp_percent(self.shadow_intensity as i64, SHADOW_RANGE);
        self.zoom = clamp_percent(self.zoom as i64, ZOOM_RANGE);
        self.mockup_scale = clamp_percent(self.mockup_scale as i64, MOCKUP_SCALE_RANGE);
        let defaults = Self::default();
        if self.canvas_width == 0 {
            self.canvas_width = defaults.canvas_width;
        }
        if self.canvas_height == 0 {
            self.canvas_height = defaults.canvas_height;
        }
        self
    }
}

/// Clamp an integer input into an inclusive `(min, max)` range.
pub fn clamp_percent(value: i64, (min, max): (u32, u32)) -> u32 {
    value.clamp(min as i64, max as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let style = StyleConfig::default();
        assert_eq!(style.device_type, DeviceType::Iphone);
        assert_eq!(style.shadow_intensity, 50);
        assert_eq!((style.canvas_width, style.canvas_height), (1080, 1080));
        assert_eq!(style.background_value, GRADIENT_PRESETS[0].style);
    }

    #[test]
    fn test_device_variant_follows_type() {
        let mut style = StyleConfig::default();
        style.pixel.color = "hazel".to_string();
        style.device_type = DeviceType::Pixel;
        match style.device() {
            Device::Pixel(selection) => assert_eq!(selection.color, "hazel"),
            other => panic!("unexpected device {other:?}"),
        }
        assert_eq!(
            style.device().phone().map(|(family, _)| family),
            Some(PhoneFamily::Pixel)
        );

        style.device_type = DeviceType::None;
        assert_eq!(style.device(), Device::None);
    }

    #[test]
    fn test_device_info() {
        let mut style = StyleConfig::default();
        assert_eq!(style.device_info().name, "iPhone 16 Pro");
        style.device_type = DeviceType::Browser;
        style.browser.browser_type = BrowserType::Chrome;
        assert_eq!(style.device_info().name, "Chrome");
        style.device_type = DeviceType::None;
        assert_eq!(style.device_info().thumb_image, "");
    }

    #[test]
    fn test_serde_uses_lowercase_tags_and_defaults() {
        let parsed: StyleConfig =
            serde_json::from_str(r#"{ "device_type": "browser", "shadow_intensity": 10 }"#)
                .unwrap();
        assert_eq!(parsed.device_type, DeviceType::Browser);
        assert_eq!(parsed.shadow_intensity, 10);
        assert_eq!(parsed.zoom, 100);
        assert_eq!(parsed.browser.tab_name, "New Tab");
    }

    #[test]
    fn test_normalized_clamps_file_values() {
        let parsed: StyleConfig = serde_json::from_str(
            r#"{ "shadow_intensity": 400, "zoom": 5, "mockup_scale": 1000, "canvas_width": 0 }"#,
        )
        .unwrap();
        let style = parsed.normalized();
        assert_eq!(style.shadow_intensity, 100);
        assert_eq!(style.zoom, 25);
        assert_eq!(style.mockup_scale, 200);
        assert_eq!(style.canvas_width, 1080);
    }
}
