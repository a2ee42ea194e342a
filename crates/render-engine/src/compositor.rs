//! Mockup compositor: turns a style configuration and an image into a scene.
//!
//! Composition is pure. The same style and image always produce an equal
//! scene, which in turn rasterizes to identical pixels.

use ollim_style_model::catalog::{
    self, ChromePalette, DeviceColor, GRADIENT_PRESETS, SOLID_COLORS, TRAFFIC_LIGHTS,
};
use ollim_style_model::color::{parse_color, parse_linear_gradient, Rgba};
use ollim_style_model::geometry::{
    self, BorderlessGeometry, BrowserGeometry, DeviceGeometry, FrameGeometry, Rect,
};
use ollim_style_model::style::{BackgroundType, Device, PhoneFamily, StyleConfig};

use crate::asset::ImageAsset;
use crate::scene::{
    BackgroundLayer, DeviceLayer, DropShadow, FrameArt, Node, Placeholder, Scene, TextAlign,
};

/// Chrome text size in logical pixels.
const CHROME_TEXT_SIZE: f64 = 12.0;

/// Compose the scene for `style` with the current screenshot, if any.
pub fn render(style: &StyleConfig, image: Option<&ImageAsset>) -> Scene {
    let canvas_width = style.canvas_width as f64;
    let canvas_height = style.canvas_height as f64;
    let device = style.device();
    let geometry = geometry::resolve(
        device,
        image.map(ImageAsset::size),
        canvas_width,
        canvas_height,
    );

    let (width, height) = geometry.size();
    let (corner_radius, nodes) = match &geometry {
        DeviceGeometry::Phone(frame) => (0.0, phone_nodes(frame, phone_color(device), image)),
        DeviceGeometry::Browser(browser) => {
            let selection = &style.browser;
            let palette = catalog::browser_preset(selection.browser_type).palette(selection.theme);
            let nodes = browser_nodes(
                browser,
                palette,
                &selection.address_url,
                &selection.tab_name,
                image,
            );
            (browser.corner_radius, nodes)
        }
        DeviceGeometry::Borderless(borderless) => {
            (borderless.corner_radius, borderless_nodes(borderless, image))
        }
    };

    Scene {
        width: style.canvas_width,
        height: style.canvas_height,
        background: resolve_background(style.background_type, &style.background_value),
        device: DeviceLayer {
            width,
            height,
            scale: style.mockup_scale as f64 / 100.0,
            corner_radius,
            shadow: DropShadow::from_intensity(style.shadow_intensity),
            nodes,
        },
    }
}

/// Background layer for a type and CSS value.
///
/// Unparseable values fall back to the first preset of their type; a plain
/// color given as a gradient value is drawn as a solid fill.
pub fn resolve_background(kind: BackgroundType, value: &str) -> BackgroundLayer {
    match kind {
        BackgroundType::Transparent => BackgroundLayer::Transparent,
        BackgroundType::Solid => match parse_color(value) {
            Ok(color) => BackgroundLayer::Solid(color),
            Err(err) => {
                tracing::warn!(
                    value,
                    error = %err,
                    "Unparseable solid background, using first preset"
                );
                BackgroundLayer::Solid(parse_color(SOLID_COLORS[0]).unwrap_or(Rgba::WHITE))
            }
        },
        BackgroundType::Gradient => {
            if let Ok(gradient) = parse_linear_gradient(value) {
                return BackgroundLayer::Gradient(gradient);
            }
            if let Ok(color) = parse_color(value) {
                return BackgroundLayer::Solid(color);
            }
            tracing::warn!(value, "Unparseable gradient background, using first preset");
            match parse_linear_gradient(GRADIENT_PRESETS[0].style) {
                Ok(gradient) => BackgroundLayer::Gradient(gradient),
                Err(_) => BackgroundLayer::Solid(Rgba::WHITE),
            }
        }
    }
}

fn phone_color(device: Device<'_>) -> &'static DeviceColor {
    match device.phone() {
        Some((PhoneFamily::Pixel, selection)) => catalog::pixel_color(&selection.color),
        Some((PhoneFamily::Iphone, selection)) => catalog::iphone_color(&selection.color),
        None => &catalog::IPHONE_COLORS[0],
    }
}

fn content_node(
    rect: Rect,
    radius: f64,
    image: Option<&ImageAsset>,
    placeholder: Placeholder,
) -> Node {
    match image {
        Some(asset) => Node::Image {
            rect,
            radius,
            asset: asset.clone(),
        },
        None => Node::Placeholder {
            rect,
            radius,
            placeholder,
        },
    }
}

fn phone_nodes(
    frame: &FrameGeometry,
    color: &'static DeviceColor,
    image: Option<&ImageAsset>,
) -> Vec<Node> {
    let screen = frame.screen_rect();
    let placeholder = Placeholder {
        background: Rgba::BLACK,
        icon: Rgba::rgb(0x52, 0x52, 0x5b),
        title: "Select Media".to_string(),
        subtitle: "Click to upload".to_string(),
        text: Rgba::rgb(0x71, 0x71, 0x7a),
    };
    let mut nodes = vec![content_node(screen, frame.border_radius, image, placeholder)];

    if !frame.display_mode {
        nodes.push(Node::FrameArt {
            rect: Rect::from_size(frame.frame_width, frame.frame_height),
            art: FrameArt {
                key: color.frame_image,
                family: frame.family,
                bezel: color.bezel,
                screen,
                screen_radius: frame.border_radius,
            },
        });
    }
    nodes
}

fn browser_nodes(
    browser: &BrowserGeometry,
    palette: &ChromePalette,
    address_url: &str,
    tab_name: &str,
    image: Option<&ImageAsset>,
) -> Vec<Node> {
    let chrome = &browser.chrome;
    let mut nodes = vec![Node::Fill {
        rect: Rect::from_size(browser.window_width, browser.window_height),
        radius: 0.0,
        color: palette.window,
    }];

    if let Some(strip) = chrome.tab_strip {
        nodes.push(Node::Fill {
            rect: strip,
            radius: 0.0,
            color: palette.tab_strip,
        });
    }
    if let Some(tab) = chrome.tab {
        // Extends under the toolbar so only the top corners stay rounded.
        nodes.push(Node::Fill {
            rect: Rect::new(tab.x, tab.y, tab.width, tab.height + chrome.tab_radius),
            radius: chrome.tab_radius,
            color: palette.active_tab,
        });
    }
    nodes.push(Node::Fill {
        rect: chrome.toolbar,
        radius: 0.0,
        color: palette.toolbar,
    });
    if let Some(tab) = chrome.tab {
        nodes.push(text_node(
            tab_name,
            tab.x + 12.0,
            tab.center().1,
            tab.width - 24.0,
            palette.text,
            TextAlign::Left,
        ));
    }

    for ((cx, cy), color) in chrome.traffic_lights.iter().zip(TRAFFIC_LIGHTS) {
        nodes.push(Node::Circle {
            cx: *cx,
            cy: *cy,
            radius: chrome.traffic_light_radius,
            color,
        });
    }

    let bar = chrome.address_bar;
    nodes.push(Node::Fill {
        rect: bar,
        radius: chrome.address_radius,
        color: palette.address_bar,
    });
    let (text_x, align) = if chrome.address_centered {
        (bar.center().0, TextAlign::Center)
    } else {
        (bar.x + 14.0, TextAlign::Left)
    };
    nodes.push(text_node(
        address_url,
        text_x,
        bar.center().1,
        bar.width - 28.0,
        palette.text,
        align,
    ));

    nodes.push(Node::Fill {
        rect: Rect::new(0.0, chrome.height - 1.0, browser.window_width, 1.0),
        radius: 0.0,
        color: palette.divider,
    });

    let placeholder = Placeholder {
        background: palette.window,
        icon: palette.muted_text,
        title: "Select image".to_string(),
        subtitle: "Click or paste".to_string(),
        text: palette.muted_text,
    };
    nodes.push(content_node(browser.content, 0.0, image, placeholder));
    nodes
}

fn borderless_nodes(borderless: &BorderlessGeometry, image: Option<&ImageAsset>) -> Vec<Node> {
    let placeholder = Placeholder {
        background: Rgba::rgb(0xf5, 0xf5, 0xf7),
        icon: Rgba::rgb(0x66, 0x7e, 0xea),
        title: "Select image".to_string(),
        subtitle: "Click or paste".to_string(),
        text: Rgba::rgb(0x86, 0x86, 0x8b),
    };
    vec![content_node(
        Rect::from_size(borderless.width, borderless.height),
        borderless.corner_radius,
        image,
        placeholder,
    )]
}

fn text_node(
    text: &str,
    x: f64,
    center_y: f64,
    max_width: f64,
    color: Rgba,
    align: TextAlign,
) -> Node {
    Node::Text {
        x,
        y: center_y - CHROME_TEXT_SIZE / 2.0,
        size: CHROME_TEXT_SIZE,
        color,
        text: text.to_string(),
        max_width: max_width.max(0.0),
        align,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollim_style_model::style::{BrowserTheme, BrowserType, DeviceType};

    #[test]
    fn test_default_scene_has_phone_frame_and_placeholder() {
        let scene = render(&StyleConfig::default(), None);
        assert_eq!((scene.width, scene.height), (1080, 1080));
        assert!(scene.device.has_placeholder());
        assert!(scene.device.has_frame_art());
        assert!(matches!(scene.background, BackgroundLayer::Gradient(_)));
        assert_eq!(scene.device.shadow, DropShadow::from_intensity(50));
    }

    #[test]
    fn test_display_mode_omits_frame_art() {
        let mut style = StyleConfig::default();
        style.iphone.color = "display".to_string();
        let scene = render(&style, None);
        assert!(!scene.device.has_frame_art());
        assert!(scene.device.has_placeholder());
    }

    #[test]
    fn test_borderless_without_shadow() {
        let mut style = StyleConfig::default();
        style.device_type = DeviceType::None;
        style.shadow_intensity = 0;
        let scene = render(&style, None);
        assert_eq!(scene.device.shadow, None);
        assert_eq!((scene.device.width, scene.device.height), (288.0, 288.0));
        assert!(scene.device.has_placeholder());
        assert!(!scene.device.has_frame_art());
    }

    #[test]
    fn test_chrome_draws_tab_name_and_safari_does_not() {
        let mut style = StyleConfig::default();
        style.device_type = DeviceType::Browser;
        style.browser.browser_type = BrowserType::Chrome;
        style.browser.theme = BrowserTheme::Dark;
        style.browser.tab_name = "My App".to_string();
        let chrome = render(&style, None);
        assert!(chrome.device.texts().any(|t| t == "My App"));
        let dark = catalog::browser_preset(BrowserType::Chrome).palette(BrowserTheme::Dark);
        assert!(chrome.device.nodes.iter().any(|node| matches!(
            node,
            Node::Fill { color, .. } if *color == dark.toolbar
        )));

        style.browser.browser_type = BrowserType::Safari;
        let safari = render(&style, None);
        assert!(!safari.device.texts().any(|t| t == "My App"));
        assert!(safari.device.texts().any(|t| t == "yourapp.com"));
    }

    #[test]
    fn test_mockup_scale_is_carried() {
        let mut style = StyleConfig::default();
        style.mockup_scale = 150;
        assert_eq!(render(&style, None).device.scale, 1.5);
    }

    #[test]
    fn test_background_fallbacks() {
        assert_eq!(
            resolve_background(BackgroundType::Solid, "not a color"),
            BackgroundLayer::Solid(parse_color(SOLID_COLORS[0]).unwrap())
        );
        assert_eq!(
            resolve_background(BackgroundType::Gradient, "#123456"),
            BackgroundLayer::Solid(Rgba::rgb(0x12, 0x34, 0x56))
        );
        assert_eq!(
            resolve_background(BackgroundType::Gradient, "nonsense"),
            BackgroundLayer::Gradient(parse_linear_gradient(GRADIENT_PRESETS[0].style).unwrap())
        );
        assert_eq!(
            resolve_background(BackgroundType::Transparent, "#fff"),
            BackgroundLayer::Transparent
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let style = StyleConfig::default();
        assert_eq!(render(&style, None), render(&style, None));
    }
}
