//! Style parameter store.
//!
//! Holds the one [`StyleConfig`] of a session. Every mutation is an explicit
//! [`StyleCommand`]; applying a command clamps numeric input, bumps the
//! revision when something changed, and notifies subscribers.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, GRADIENT_PRESETS, SOLID_COLORS};
use crate::style::{
    clamp_percent, BackgroundType, BrowserTheme, BrowserType, DeviceType, StyleConfig,
    MOCKUP_SCALE_RANGE, PERCENT_STEP, SHADOW_RANGE, ZOOM_RANGE,
};

/// A single style mutation.
///
/// Numeric payloads are signed so out-of-range input can be clamped rather
/// than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum StyleCommand {
    SetDeviceType(DeviceType),
    SetIphoneModel(String),
    SetIphoneColor(String),
    SetPixelModel(String),
    SetPixelColor(String),
    /// Switch to the browser device and pick its chrome in one step.
    SelectBrowser(BrowserType),
    SetBrowserTheme(BrowserTheme),
    SetAddressUrl(String),
    SetTabName(String),
    /// Also resets the value to the first preset of the new type.
    SetBackgroundType(BackgroundType),
    SetBackgroundValue(String),
    SetShadowIntensity(i64),
    SetZoom(i64),
    ZoomIn,
    ZoomOut,
    SetMockupScale(i64),
    ScaleUp,
    ScaleDown,
    /// Non-positive dimensions are ignored.
    SetCanvasSize { width: i64, height: i64 },
    /// Canvas size from a preset id; unknown ids use the first preset.
    ApplyCanvasPreset(String),
    /// Replace the whole configuration (e.g. from a style file).
    Replace(Box<StyleConfig>),
    Reset,
}

impl StyleCommand {
    /// Whether the command can change the composed scene.
    ///
    /// Zoom is display-only.
    pub fn affects_scene(&self) -> bool {
        !matches!(
            self,
            StyleCommand::SetZoom(_) | StyleCommand::ZoomIn | StyleCommand::ZoomOut
        )
    }
}

/// Notification delivered to subscribers after a change.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleEvent {
    pub revision: u64,
    pub command: StyleCommand,
}

/// Callback for style changes.
pub type StyleListener = Box<dyn Fn(&StyleEvent, &StyleConfig) + Send>;

/// Handle returned by [`StyleStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owner of the current style configuration.
pub struct StyleStore {
    config: StyleConfig,
    revision: u64,
    next_subscription: u64,
    listeners: Vec<(SubscriptionId, StyleListener)>,
}

impl std::fmt::Debug for StyleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleStore")
            .field("config", &self.config)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for StyleStore {
    fn default() -> Self {
        Self::new(StyleConfig::default())
    }
}

impl StyleStore {
    pub fn new(config: StyleConfig) -> Self {
        Self {
            config: config.normalized(),
            revision: 0,
            next_subscription: 0,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Incremented once per effective change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&mut self, listener: StyleListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Apply a command. Returns `true` if the configuration changed.
    pub fn apply(&mut self, command: StyleCommand) -> bool {
        let mut next = self.config.clone();
        apply_to(&mut next, &command);

        if next == self.config {
            tracing::debug!(?command, "Style command left configuration unchanged");
            return false;
        }

        self.config = next;
        self.revision += 1;
        tracing::debug!(revision = self.revision, ?command, "Style command applied");

        let event = StyleEvent {
            revision: self.revision,
            command,
        };
        for (_, listener) in &self.listeners {
            listener(&event, &self.config);
        }
        true
    }
}

fn apply_to(config: &mut StyleConfig, command: &StyleCommand) {
    match command {
        StyleCommand::SetDeviceType(device) => config.device_type = *device,
        StyleCommand::SetIphoneModel(id) => config.iphone.model = id.clone(),
        StyleCommand::SetIphoneColor(id) => config.iphone.color = id.clone(),
        StyleCommand::SetPixelModel(id) => config.pixel.model = id.clone(),
        StyleCommand::SetPixelColor(id) => config.pixel.color = id.clone(),
        StyleCommand::SelectBrowser(browser) => {
            config.device_type = DeviceType::Browser;
            config.browser.browser_type = *browser;
        }
        StyleCommand::SetBrowserTheme(theme) => config.browser.theme = *theme,
        StyleCommand::SetAddressUrl(url) => config.browser.address_url = url.clone(),
        StyleCommand::SetTabName(name) => config.browser.tab_name = name.clone(),
        StyleCommand::SetBackgroundType(background) => {
            if config.background_type != *background {
                config.background_type = *background;
                config.background_value = default_background_value(*background).to_string();
            }
        }
        StyleCommand::SetBackgroundValue(value) => config.background_value = value.clone(),
        StyleCommand::SetShadowIntensity(value) => {
            config.shadow_intensity = clamp_percent(*value, SHADOW_RANGE);
        }
        StyleCommand::SetZoom(value) => config.zoom = clamp_percent(*value, ZOOM_RANGE),
        StyleCommand::ZoomIn => config.zoom = step(config.zoom, true, ZOOM_RANGE),
        StyleCommand::ZoomOut => config.zoom = step(config.zoom, false, ZOOM_RANGE),
        StyleCommand::SetMockupScale(value) => {
            config.mockup_scale = clamp_percent(*value, MOCKUP_SCALE_RANGE);
        }
        StyleCommand::ScaleUp => {
            config.mockup_scale = step(config.mockup_scale, true, MOCKUP_SCALE_RANGE);
        }
        StyleCommand::ScaleDown => {
            config.mockup_scale = step(config.mockup_scale, false, MOCKUP_SCALE_RANGE);
        }
        StyleCommand::SetCanvasSize { width, height } => {
            if *width > 0 && *height > 0 {
                config.canvas_width = (*width).min(u32::MAX as i64) as u32;
                config.canvas_height = (*height).min(u32::MAX as i64) as u32;
            } else {
                tracing::warn!(width, height, "Ignoring non-positive canvas size");
            }
        }
        StyleCommand::ApplyCanvasPreset(id) => {
            let preset = catalog::canvas_preset(id);
            config.canvas_width = preset.width;
            config.canvas_height = preset.height;
        }
        StyleCommand::Replace(replacement) => *config = replacement.as_ref().clone().normalized(),
        StyleCommand::Reset => *config = StyleConfig::default(),
    }
}

/// Value a background resets to when its type is switched.
pub fn default_background_value(background: BackgroundType) -> &'static str {
    match background {
        BackgroundType::Gradient => GRADIENT_PRESETS[0].style,
        BackgroundType::Solid => SOLID_COLORS[0],
        BackgroundType::Transparent => "transparent",
    }
}

fn step(current: u32, up: bool, range: (u32, u32)) -> u32 {
    let delta = if up {
        PERCENT_STEP as i64
    } else {
        -(PERCENT_STEP as i64)
    };
    clamp_percent(current as i64 + delta, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_shadow_is_clamped() {
        let mut store = StyleStore::default();
        store.apply(StyleCommand::SetShadowIntensity(150));
        assert_eq!(store.config().shadow_intensity, 100);
        store.apply(StyleCommand::SetShadowIntensity(-3));
        assert_eq!(store.config().shadow_intensity, 0);
    }

    #[test]
    fn test_zoom_steps_stop_at_bounds() {
        let mut store = StyleStore::default();
        for _ in 0..10 {
            store.apply(StyleCommand::ZoomIn);
        }
        assert_eq!(store.config().zoom, 200);
        for _ in 0..10 {
            store.apply(StyleCommand::ZoomOut);
        }
        assert_eq!(store.config().zoom, 25);
    }

    #[test]
    fn test_scale_steps() {
        let mut store = StyleStore::default();
        store.apply(StyleCommand::ScaleDown);
        assert_eq!(store.config().mockup_scale, 75);
        store.apply(StyleCommand::SetMockupScale(190));
        store.apply(StyleCommand::ScaleUp);
        assert_eq!(store.config().mockup_scale, 200);
    }

    #[test]
    fn test_non_positive_canvas_is_ignored() {
        let mut store = StyleStore::default();
        assert!(!store.apply(StyleCommand::SetCanvasSize {
            width: 0,
            height: 500
        }));
        assert!(!store.apply(StyleCommand::SetCanvasSize {
            width: 800,
            height: -1
        }));
        assert_eq!(store.config().canvas_width, 1080);
        assert!(store.apply(StyleCommand::SetCanvasSize {
            width: 1200,
            height: 800
        }));
        assert_eq!(
            (store.config().canvas_width, store.config().canvas_height),
            (1200, 800)
        );
    }

    #[test]
    fn test_background_type_switch_resets_value() {
        let mut store = StyleStore::default();
        store.apply(StyleCommand::SetBackgroundType(BackgroundType::Solid));
        assert_eq!(store.config().background_value, SOLID_COLORS[0]);
        store.apply(StyleCommand::SetBackgroundValue("#000000".to_string()));
        store.apply(StyleCommand::SetBackgroundType(BackgroundType::Transparent));
        assert_eq!(store.config().background_value, "transparent");
    }

    #[test]
    fn test_same_background_type_keeps_value() {
        let mut store = StyleStore::default();
        store.apply(StyleCommand::SetBackgroundValue(
            GRADIENT_PRESETS[2].style.to_string(),
        ));
        assert!(!store.apply(StyleCommand::SetBackgroundType(BackgroundType::Gradient)));
        assert_eq!(store.config().background_value, GRADIENT_PRESETS[2].style);
    }

    #[test]
    fn test_select_browser_switches_device() {
        let mut store = StyleStore::default();
        store.apply(StyleCommand::SelectBrowser(BrowserType::Chrome));
        assert_eq!(store.config().device_type, DeviceType::Browser);
        assert_eq!(store.config().browser.browser_type, BrowserType::Chrome);
    }

    #[test]
    fn test_device_switch_preserves_other_selections() {
        let mut store = StyleStore::default();
        store.apply(StyleCommand::SetPixelColor("hazel".to_string()));
        store.apply(StyleCommand::SetDeviceType(DeviceType::Pixel));
        store.apply(StyleCommand::SetDeviceType(DeviceType::Iphone));
        store.apply(StyleCommand::SetDeviceType(DeviceType::Pixel));
        assert_eq!(store.config().pixel.color, "hazel");
    }

    #[test]
    fn test_canvas_preset() {
        let mut store = StyleStore::default();
        store.apply(StyleCommand::ApplyCanvasPreset("story".to_string()));
        assert_eq!(
            (store.config().canvas_width, store.config().canvas_height),
            (1080, 1920)
        );
    }

    #[test]
    fn test_listeners_see_changes_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = StyleStore::default();
        let sink = Arc::clone(&seen);
        let id = store.subscribe(Box::new(move |event, config| {
            sink.lock()
                .unwrap()
                .push((event.revision, config.shadow_intensity));
        }));

        store.apply(StyleCommand::SetShadowIntensity(10));
        store.apply(StyleCommand::SetShadowIntensity(10));
        store.apply(StyleCommand::SetShadowIntensity(20));
        assert_eq!(*seen.lock().unwrap(), vec![(1, 10), (2, 20)]);

        assert!(store.unsubscribe(id));
        store.apply(StyleCommand::SetShadowIntensity(30));
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn test_zoom_does_not_affect_scene() {
        assert!(!StyleCommand::ZoomIn.affects_scene());
        assert!(!StyleCommand::SetZoom(50).affects_scene());
        assert!(StyleCommand::ScaleUp.affects_scene());
    }

    #[test]
    fn test_commands_deserialize_from_json() {
        let command: StyleCommand =
            serde_json::from_str(r#"{ "command": "set_shadow_intensity", "value": 40 }"#).unwrap();
        assert_eq!(command, StyleCommand::SetShadowIntensity(40));
        let command: StyleCommand = serde_json::from_str(r#"{ "command": "reset" }"#).unwrap();
        assert_eq!(command, StyleCommand::Reset);
    }
}
