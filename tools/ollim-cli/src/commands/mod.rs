//! Subcommands and the style arguments they share.

pub mod catalog;
pub mod check;
pub mod copy;
pub mod export;
pub mod geometry;
pub mod preview;

use std::path::{Path, PathBuf};

use clap::Args;
use serde::de::DeserializeOwned;

use ollim_common::config::AppConfig;
use ollim_render_engine::{ImageSelection, Studio};
use ollim_style_model::{DeviceType, StyleCommand, StyleConfig};

/// Style flags shared by every rendering subcommand.
///
/// `--style` loads a full configuration first; individual flags are applied
/// on top of it in a fixed order.
#[derive(Args, Debug, Default, Clone)]
pub struct StyleArgs {
    /// StyleConfig JSON file to start from
    #[arg(long)]
    pub style: Option<PathBuf>,

    /// Device: iphone|pixel|browser|none
    #[arg(long)]
    pub device: Option<String>,

    /// Phone model id for the active phone family
    #[arg(long)]
    pub model: Option<String>,

    /// Phone color id for the active phone family
    #[arg(long)]
    pub color: Option<String>,

    /// Browser chrome: safari|chrome (selects the browser device)
    #[arg(long)]
    pub browser: Option<String>,

    /// Browser theme: light|dark
    #[arg(long)]
    pub theme: Option<String>,

    /// Address bar text
    #[arg(long)]
    pub url: Option<String>,

    /// Tab title (Chrome only)
    #[arg(long)]
    pub tab: Option<String>,

    /// Background type: gradient|solid|transparent
    #[arg(long)]
    pub background: Option<String>,

    /// CSS color or linear-gradient() for the background
    #[arg(long)]
    pub background_value: Option<String>,

    /// Shadow intensity [0, 100]
    #[arg(long, allow_negative_numbers = true)]
    pub shadow: Option<i64>,

    /// Preview zoom percent [25, 200]
    #[arg(long, allow_negative_numbers = true)]
    pub zoom: Option<i64>,

    /// Mockup scale percent [25, 200]
    #[arg(long, allow_negative_numbers = true)]
    pub scale: Option<i64>,

    /// Canvas size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size, conflicts_with = "canvas_preset")]
    pub canvas: Option<(u32, u32)>,

    /// Canvas preset id: square|story|twitter|dribbble|desktop
    #[arg(long)]
    pub canvas_preset: Option<String>,
}

impl StyleArgs {
    /// Commands that do not depend on the resulting device type.
    pub fn commands(&self) -> anyhow::Result<Vec<StyleCommand>> {
        let mut commands = Vec::new();

        if let Some(path) = &self.style {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read style {}: {e}", path.display()))?;
            let config: StyleConfig = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid style {}: {e}", path.display()))?;
            commands.push(StyleCommand::Replace(Box::new(config)));
        }
        if let Some(device) = &self.device {
            commands.push(StyleCommand::SetDeviceType(parse_keyword(device, "device")?));
        }
        if let Some(browser) = &self.browser {
            commands.push(StyleCommand::SelectBrowser(parse_keyword(browser, "browser")?));
        }
        if let Some(theme) = &self.theme {
            commands.push(StyleCommand::SetBrowserTheme(parse_keyword(theme, "theme")?));
        }
        if let Some(url) = &self.url {
            commands.push(StyleCommand::SetAddressUrl(url.clone()));
        }
        if let Some(tab) = &self.tab {
            commands.push(StyleCommand::SetTabName(tab.clone()));
        }
        if let Some(background) = &self.background {
            commands.push(StyleCommand::SetBackgroundType(parse_keyword(
                background,
                "background",
            )?));
        }
        if let Some(value) = &self.background_value {
            commands.push(StyleCommand::SetBackgroundValue(value.clone()));
        }
        if let Some(shadow) = self.shadow {
            commands.push(StyleCommand::SetShadowIntensity(shadow));
        }
        if let Some(zoom) = self.zoom {
            commands.push(StyleCommand::SetZoom(zoom));
        }
        if let Some(scale) = self.scale {
            commands.push(StyleCommand::SetMockupScale(scale));
        }
        if let Some((width, height)) = self.canvas {
            commands.push(StyleCommand::SetCanvasSize {
                width: width as i64,
                height: height as i64,
            });
        }
        if let Some(preset) = &self.canvas_preset {
            commands.push(StyleCommand::ApplyCanvasPreset(preset.clone()));
        }
        Ok(commands)
    }

    /// Model and color commands for whichever phone ends up active.
    pub fn phone_commands(&self, device: DeviceType) -> Vec<StyleCommand> {
        let mut commands = Vec::new();
        let pixel = device == DeviceType::Pixel;
        if let Some(model) = &self.model {
            commands.push(if pixel {
                StyleCommand::SetPixelModel(model.clone())
            } else {
                StyleCommand::SetIphoneModel(model.clone())
            });
        }
        if let Some(color) = &self.color {
            commands.push(if pixel {
                StyleCommand::SetPixelColor(color.clone())
            } else {
                StyleCommand::SetIphoneColor(color.clone())
            });
        }
        commands
    }

    /// The style these arguments describe, without a studio.
    pub fn resolve(&self) -> anyhow::Result<StyleConfig> {
        let mut store = ollim_style_model::StyleStore::default();
        for command in self.commands()? {
            store.apply(command);
        }
        for command in self.phone_commands(store.config().device_type) {
            store.apply(command);
        }
        Ok(store.config().clone())
    }
}

/// Build a studio from config, style flags, and an optional screenshot.
pub async fn open_studio(
    config: &AppConfig,
    style: &StyleArgs,
    image: Option<&Path>,
) -> anyhow::Result<Studio> {
    let mut studio = Studio::new(config)?;
    for command in style.commands()? {
        studio.apply(command);
    }
    for command in style.phone_commands(studio.style().device_type) {
        studio.apply(command);
    }

    if let Some(path) = image {
        match studio.open_image(path).await? {
            ImageSelection::Installed => {
                tracing::debug!(path = %path.display(), "Screenshot loaded");
            }
            ImageSelection::Rejected => {
                anyhow::bail!(
                    "Unsupported image type: {} (expected .png, .jpg, or .jpeg)",
                    path.display()
                );
            }
            ImageSelection::Superseded => {}
        }
    }
    Ok(studio)
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| format!("invalid dimension '{s}'"))
    };
    Ok((parse(width)?, parse(height)?))
}

/// Parse a lowercase keyword through the type's serde representation.
fn parse_keyword<T: DeserializeOwned>(value: &str, what: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_ascii_lowercase()))
        .map_err(|_| anyhow::anyhow!("Unknown {what}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollim_style_model::{BackgroundType, BrowserType};

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1200x800"), Ok((1200, 800)));
        assert_eq!(parse_size("64X32"), Ok((64, 32)));
        assert!(parse_size("1200").is_err());
        assert!(parse_size("0x10").is_err());
    }

    #[test]
    fn test_flags_resolve_into_style() {
        let args = StyleArgs {
            device: Some("pixel".to_string()),
            color: Some("obsidian".to_string()),
            background: Some("transparent".to_string()),
            shadow: Some(250),
            canvas: Some((1200, 800)),
            ..StyleArgs::default()
        };
        let style = args.resolve().unwrap();
        assert_eq!(style.device_type, DeviceType::Pixel);
        assert_eq!(style.pixel.color, "obsidian");
        assert_eq!(style.background_type, BackgroundType::Transparent);
        assert_eq!(style.shadow_intensity, 100);
        assert_eq!((style.canvas_width, style.canvas_height), (1200, 800));
    }

    #[test]
    fn test_browser_flag_selects_browser_device() {
        let args = StyleArgs {
            browser: Some("Chrome".to_string()),
            ..StyleArgs::default()
        };
        let style = args.resolve().unwrap();
        assert_eq!(style.device_type, DeviceType::Browser);
        assert_eq!(style.browser.browser_type, BrowserType::Chrome);
    }

    #[test]
    fn test_unknown_keyword_is_an_error() {
        let args = StyleArgs {
            device: Some("watch".to_string()),
            ..StyleArgs::default()
        };
        assert!(args.commands().is_err());
    }

    #[test]
    fn test_style_file_is_applied_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.json");
        std::fs::write(&path, r#"{"device_type": "none", "shadow_intensity": 10}"#).unwrap();
        let args = StyleArgs {
            style: Some(path),
            shadow: Some(30),
            ..StyleArgs::default()
        };
        let style = args.resolve().unwrap();
        assert_eq!(style.device_type, DeviceType::None);
        assert_eq!(style.shadow_intensity, 30);
    }
}
