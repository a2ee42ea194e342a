//! Scene rasterizer shared by the on-screen preview and the exporter.
//!
//! A scene is drawn at `multiplier` device pixels per logical pixel. The
//! device layer is drawn into its own pixmap (cropped to what can reach the
//! canvas), clipped to its corner radius, shadowed, and composited centered.

use tiny_skia::{
    Color, FillRule, FilterQuality, GradientStop, Mask, Paint, Path, PathBuilder, Pattern, Pixmap,
    PixmapPaint, Point, SpreadMode, Transform,
};

use ollim_common::error::{OllimError, OllimResult};
use ollim_style_model::color::{LinearGradient, Rgba};
use ollim_style_model::geometry::Rect;
use ollim_style_model::style::PhoneFamily;

use crate::asset::{FrameArtSource, ImageAsset};
use crate::effects;
use crate::scene::{BackgroundLayer, DeviceLayer, FrameArt, Node, Placeholder, Scene, TextAlign};
use crate::text;

/// Checkerboard tile edge for transparent previews, in logical pixels.
const CHECKER_TILE: f64 = 20.0;
const CHECKER_LIGHT: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
const CHECKER_DARK: Rgba = Rgba::rgb(0xe5, 0xe5, 0xe5);
/// Cubic Bezier handle length for quarter circles.
const KAPPA: f32 = 0.552_284_8;

/// Where a raster is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// On-screen preview; transparent backgrounds show a checkerboard.
    Display,
    /// File or clipboard output; transparent means alpha zero.
    Export,
}

/// Pixel size of a scene at `multiplier`.
pub fn output_size(scene: &Scene, multiplier: f64) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * multiplier).round().max(1.0)) as u32;
    (scale(scene.width), scale(scene.height))
}

/// Rasterize a scene into a premultiplied pixmap.
pub fn rasterize(
    scene: &Scene,
    multiplier: f64,
    surface: Surface,
    art: &dyn FrameArtSource,
) -> OllimResult<Pixmap> {
    if !(multiplier.is_finite() && multiplier > 0.0) {
        return Err(OllimError::render(format!(
            "invalid raster multiplier {multiplier}"
        )));
    }
    let (width, height) = output_size(scene, multiplier);
    let mut canvas = Pixmap::new(width, height).ok_or_else(|| {
        OllimError::render(format!("failed to allocate {width}x{height} canvas"))
    })?;

    draw_background(&mut canvas, &scene.background, scene, multiplier, surface)?;
    draw_device(&mut canvas, &scene.device, scene, multiplier, art)?;
    Ok(canvas)
}

fn skia_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn solid_paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

fn canvas_rect(canvas: &Pixmap) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(0.0, 0.0, canvas.width() as f32, canvas.height() as f32)
}

/// Rounded rectangle outline; plain rectangle when `radius` is 0.
pub fn rounded_rect_path(rect: Rect, radius: f64) -> Option<Path> {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0) as f32;
    if r <= 0.0 {
        return skia_rect(rect).map(PathBuilder::from_rect);
    }
    let mut pb = PathBuilder::new();
    push_rounded_rect(&mut pb, rect, r);
    pb.finish()
}

fn push_rounded_rect(pb: &mut PathBuilder, rect: Rect, r: f32) {
    let (x, y) = (rect.x as f32, rect.y as f32);
    let (right, bottom) = (rect.right() as f32, rect.bottom() as f32);
    let k = r * KAPPA;
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
}

/// Ring between an outer and an inner rounded rectangle.
fn ring_path(outer: Rect, outer_radius: f64, inner: Rect, inner_radius: f64) -> Option<Path> {
    let clamp = |rect: Rect, r: f64| {
        r.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0) as f32
    };
    let mut pb = PathBuilder::new();
    push_rounded_rect(&mut pb, outer, clamp(outer, outer_radius));
    push_rounded_rect(&mut pb, inner, clamp(inner, inner_radius));
    pb.finish()
}

fn draw_background(
    canvas: &mut Pixmap,
    background: &BackgroundLayer,
    scene: &Scene,
    multiplier: f64,
    surface: Surface,
) -> OllimResult<()> {
    match background {
        BackgroundLayer::Transparent => {
            if surface == Surface::Display {
                draw_checkerboard(canvas, multiplier)?;
            }
        }
        BackgroundLayer::Solid(color) => canvas.fill(skia_color(*color)),
        BackgroundLayer::Gradient(gradient) => {
            fill_gradient(canvas, gradient, scene, multiplier);
        }
    }
    Ok(())
}

fn fill_gradient(
    canvas: &mut Pixmap,
    gradient: &LinearGradient,
    scene: &Scene,
    multiplier: f64,
) {
    let ((x0, y0), (x1, y1)) = gradient.endpoints(scene.width as f64, scene.height as f64);
    let stops = gradient
        .stops
        .iter()
        .map(|stop| GradientStop::new(stop.position as f32, skia_color(stop.color)))
        .collect::<Vec<_>>();
    let shader = tiny_skia::LinearGradient::new(
        Point::from_xy(x0 as f32, y0 as f32),
        Point::from_xy(x1 as f32, y1 as f32),
        stops,
        SpreadMode::Pad,
        Transform::from_scale(multiplier as f32, multiplier as f32),
    );

    match shader {
        Some(shader) => {
            let mut paint = Paint::default();
            paint.shader = shader;
            if let Some(rect) = canvas_rect(canvas) {
                canvas.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
        None => canvas.fill(skia_color(gradient.first_color())),
    }
}

fn draw_checkerboard(canvas: &mut Pixmap, multiplier: f64) -> OllimResult<()> {
    let tile = ((CHECKER_TILE * multiplier).round() as u32).max(2);
    let half = (tile / 2) as f64;
    let mut cell = Pixmap::new(tile, tile)
        .ok_or_else(|| OllimError::render("failed to allocate checkerboard tile"))?;
    cell.fill(skia_color(CHECKER_LIGHT));
    let dark = solid_paint(CHECKER_DARK);
    for rect in [Rect::new(0.0, 0.0, half, half), Rect::new(half, half, half, half)] {
        if let Some(rect) = skia_rect(rect) {
            cell.fill_rect(rect, &dark, Transform::identity(), None);
        }
    }

    let mut paint = Paint::default();
    paint.shader = Pattern::new(
        cell.as_ref(),
        SpreadMode::Repeat,
        FilterQuality::Nearest,
        1.0,
        Transform::identity(),
    );
    if let Some(rect) = canvas_rect(canvas) {
        canvas.fill_rect(rect, &paint, Transform::identity(), None);
    }
    Ok(())
}

fn draw_device(
    canvas: &mut Pixmap,
    device: &DeviceLayer,
    scene: &Scene,
    multiplier: f64,
    art: &dyn FrameArtSource,
) -> OllimResult<()> {
    let k = multiplier * device.scale;
    if k <= 0.0 || device.width <= 0.0 || device.height <= 0.0 {
        return Ok(());
    }

    let placement = device.placement(scene.width as f64, scene.height as f64);
    let place_x = placement.x * multiplier;
    let place_y = placement.y * multiplier;
    let layer_width = device.width * k;
    let layer_height = device.height * k;

    // Anything farther than the shadow reach outside the canvas is invisible.
    let reach = device
        .shadow
        .map(|s| (s.blur * k * 1.5).ceil() + (s.offset_y * k).abs().ceil() + 2.0)
        .unwrap_or(0.0);
    let x0 = place_x.max(-reach).floor();
    let y0 = place_y.max(-reach).floor();
    let x1 = (place_x + layer_width).min(canvas.width() as f64 + reach).ceil();
    let y1 = (place_y + layer_height).min(canvas.height() as f64 + reach).ceil();
    if x1 <= x0 || y1 <= y0 {
        return Ok(());
    }

    let mut layer = Pixmap::new((x1 - x0) as u32, (y1 - y0) as u32)
        .ok_or_else(|| OllimError::render("failed to allocate device layer"))?;
    let base = Transform::from_translate((place_x - x0) as f32, (place_y - y0) as f32)
        .pre_scale(k as f32, k as f32);

    for node in &device.nodes {
        draw_node(&mut layer, node, base, art)?;
    }

    if device.corner_radius > 0.0 {
        let clip = rounded_rect_path(
            Rect::from_size(device.width, device.height),
            device.corner_radius,
        )
        .ok_or_else(|| OllimError::render("invalid device clip"))?;
        let mut mask = Mask::new(layer.width(), layer.height())
            .ok_or_else(|| OllimError::render("failed to allocate device mask"))?;
        mask.fill_path(&clip, FillRule::Winding, true, base);
        layer.apply_mask(&mask);
    }

    let paint = PixmapPaint::default();
    if let Some(shadow) = device.shadow {
        let image = effects::drop_shadow(&layer, shadow.blur * k, shadow.opacity)?;
        let offset = (shadow.offset_y * k).round() as i32;
        canvas.draw_pixmap(
            x0 as i32 - image.pad as i32,
            y0 as i32 - image.pad as i32 + offset,
            image.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }
    canvas.draw_pixmap(
        x0 as i32,
        y0 as i32,
        layer.as_ref(),
        &paint,
        Transform::identity(),
        None,
    );
    Ok(())
}

fn draw_node(
    layer: &mut Pixmap,
    node: &Node,
    base: Transform,
    art: &dyn FrameArtSource,
) -> OllimResult<()> {
    match node {
        Node::Fill {
            rect,
            radius,
            color,
        } => fill_rounded(layer, *rect, *radius, *color, base),
        Node::Circle {
            cx,
            cy,
            radius,
            color,
        } => {
            if let Some(path) = PathBuilder::from_circle(*cx as f32, *cy as f32, *radius as f32) {
                layer.fill_path(&path, &solid_paint(*color), FillRule::Winding, base, None);
            }
        }
        Node::Image {
            rect,
            radius,
            asset,
        } => draw_cover_image(layer, asset, *rect, *radius, base),
        Node::Placeholder {
            rect,
            radius,
            placeholder,
        } => draw_placeholder(layer, *rect, *radius, placeholder, base),
        Node::FrameArt { rect, art: frame } => match art.load(frame.key)? {
            Some(asset) => draw_stretched_image(layer, &asset, *rect, base),
            None => draw_procedural_frame(layer, *rect, frame, base),
        },
        Node::Text {
            x,
            y,
            size,
            color,
            text,
            max_width,
            align,
        } => draw_text(layer, text, *x, *y, *size, *max_width, *align, *color, base),
    }
    Ok(())
}

fn fill_rounded(layer: &mut Pixmap, rect: Rect, radius: f64, color: Rgba, base: Transform) {
    if let Some(path) = rounded_rect_path(rect, radius) {
        layer.fill_path(&path, &solid_paint(color), FillRule::Winding, base, None);
    }
}

/// Object-fit cover: fill `rect`, keep aspect, crop overflow, centered.
fn draw_cover_image(
    layer: &mut Pixmap,
    asset: &ImageAsset,
    rect: Rect,
    radius: f64,
    base: Transform,
) {
    let (iw, ih) = (asset.width() as f64, asset.height() as f64);
    let scale = (rect.width / iw).max(rect.height / ih);
    let dx = rect.x + (rect.width - iw * scale) / 2.0;
    let dy = rect.y + (rect.height - ih * scale) / 2.0;
    fill_with_image(
        layer,
        asset,
        rect,
        radius,
        Transform::from_row(scale as f32, 0.0, 0.0, scale as f32, dx as f32, dy as f32),
        base,
    );
}

fn draw_stretched_image(layer: &mut Pixmap, asset: &ImageAsset, rect: Rect, base: Transform) {
    let sx = rect.width / asset.width() as f64;
    let sy = rect.height / asset.height() as f64;
    fill_with_image(
        layer,
        asset,
        rect,
        0.0,
        Transform::from_row(sx as f32, 0.0, 0.0, sy as f32, rect.x as f32, rect.y as f32),
        base,
    );
}

fn fill_with_image(
    layer: &mut Pixmap,
    asset: &ImageAsset,
    rect: Rect,
    radius: f64,
    image_transform: Transform,
    base: Transform,
) {
    let Some(path) = rounded_rect_path(rect, radius) else {
        return;
    };
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.shader = Pattern::new(
        asset.pixmap().as_ref(),
        SpreadMode::Pad,
        FilterQuality::Bicubic,
        1.0,
        image_transform,
    );
    layer.fill_path(&path, &paint, FillRule::Winding, base, None);
}

fn draw_placeholder(
    layer: &mut Pixmap,
    rect: Rect,
    radius: f64,
    placeholder: &Placeholder,
    base: Transform,
) {
    fill_rounded(layer, rect, radius, placeholder.background, base);

    let (cx, cy) = rect.center();
    let icon = (rect.width.min(rect.height) * 0.06).clamp(8.0, 28.0);
    let icon_y = cy - icon - 4.0;
    if let Some(path) = PathBuilder::from_circle(cx as f32, icon_y as f32, icon as f32) {
        layer.fill_path(&path, &solid_paint(placeholder.icon), FillRule::Winding, base, None);
    }
    // plus sign cut into the icon
    let arm = icon * 0.5;
    let bar = (icon * 0.16).max(1.0);
    fill_rounded(
        layer,
        Rect::new(cx - arm, icon_y - bar / 2.0, arm * 2.0, bar),
        0.0,
        placeholder.background,
        base,
    );
    fill_rounded(
        layer,
        Rect::new(cx - bar / 2.0, icon_y - arm, bar, arm * 2.0),
        0.0,
        placeholder.background,
        base,
    );

    let max_width = (rect.width - 16.0).max(0.0);
    let title_size = 10.0;
    let subtitle_size = 8.0;
    draw_text(
        layer,
        &placeholder.title,
        cx,
        cy + 4.0,
        title_size,
        max_width,
        TextAlign::Center,
        placeholder.text,
        base,
    );
    draw_text(
        layer,
        &placeholder.subtitle,
        cx,
        cy + 4.0 + title_size + 6.0,
        subtitle_size,
        max_width,
        TextAlign::Center,
        placeholder.icon,
        base,
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_text(
    layer: &mut Pixmap,
    content: &str,
    x: f64,
    y: f64,
    size: f64,
    max_width: f64,
    align: TextAlign,
    color: Rgba,
    base: Transform,
) {
    let fitted = text::fit(content, size, max_width);
    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - text::measure(&fitted, size) / 2.0,
    };
    if let Some(path) = text::glyph_path(&fitted, left, y, size) {
        layer.fill_path(&path, &solid_paint(color), FillRule::Winding, base, None);
    }
}

/// Bezel drawn from the frame's screen geometry when no art is available.
fn draw_procedural_frame(layer: &mut Pixmap, rect: Rect, frame: &FrameArt, base: Transform) {
    let screen = frame.screen;
    let margin = (screen.x - rect.x).max(1.0);
    let outer_radius = frame.screen_radius + margin;

    if let Some(body) = ring_path(rect, outer_radius, screen, frame.screen_radius) {
        layer.fill_path(&body, &solid_paint(frame.bezel), FillRule::EvenOdd, base, None);
    }

    let rim = margin * 0.45;
    let inner = rect.inset(rim);
    if let Some(band) = ring_path(inner, outer_radius - rim, screen, frame.screen_radius) {
        let black = solid_paint(Rgba::rgb(0x0a, 0x0a, 0x0a));
        layer.fill_path(&band, &black, FillRule::EvenOdd, base, None);
    }

    match frame.family {
        PhoneFamily::Iphone => {
            let width = screen.width * 0.32;
            let height = screen.width * 0.094;
            let island = Rect::new(
                screen.center().0 - width / 2.0,
                screen.y + screen.width * 0.03,
                width,
                height,
            );
            fill_rounded(layer, island, height / 2.0, Rgba::BLACK, base);
        }
        PhoneFamily::Pixel => {
            let radius = screen.width * 0.03;
            let cy = screen.y + screen.width * 0.05;
            if let Some(path) = PathBuilder::from_circle(
                screen.center().0 as f32,
                cy as f32,
                radius as f32,
            ) {
                layer.fill_path(&path, &solid_paint(Rgba::BLACK), FillRule::Winding, base, None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::BuiltinFrameArt;
    use crate::compositor;
    use ollim_style_model::style::{BackgroundType, DeviceType, StyleConfig};

    fn alpha(pixmap: &Pixmap, x: u32, y: u32) -> u8 {
        pixmap.pixel(x, y).unwrap().alpha()
    }

    fn transparent_style() -> StyleConfig {
        let mut style = StyleConfig::default();
        style.background_type = BackgroundType::Transparent;
        style.background_value = "transparent".to_string();
        style
    }

    #[test]
    fn test_output_size_follows_multiplier() {
        let mut style = StyleConfig::default();
        style.canvas_width = 300;
        style.canvas_height = 200;
        let scene = compositor::render(&style, None);
        assert_eq!(output_size(&scene, 2.0), (600, 400));
        assert_eq!(output_size(&scene, 0.5), (150, 100));
    }

    #[test]
    fn test_transparent_export_has_clear_corners() {
        let mut style = transparent_style();
        style.shadow_intensity = 0;
        style.canvas_width = 200;
        style.canvas_height = 200;
        let scene = compositor::render(&style, None);
        let pixmap = rasterize(&scene, 1.0, Surface::Export, &BuiltinFrameArt).unwrap();
        assert_eq!(alpha(&pixmap, 0, 0), 0);
        assert_eq!(alpha(&pixmap, 199, 0), 0);
        assert_eq!(alpha(&pixmap, 100, 100), 255);
    }

    #[test]
    fn test_transparent_display_draws_checkerboard() {
        let mut style = transparent_style();
        style.canvas_width = 200;
        style.canvas_height = 200;
        let scene = compositor::render(&style, None);
        let pixmap = rasterize(&scene, 1.0, Surface::Display, &BuiltinFrameArt).unwrap();
        assert_eq!(alpha(&pixmap, 0, 0), 255);
        let light = pixmap.pixel(15, 5).unwrap();
        let dark = pixmap.pixel(5, 5).unwrap();
        assert_ne!(light.red(), dark.red());
    }

    #[test]
    fn test_solid_background_fills_canvas() {
        let mut style = StyleConfig::default();
        style.background_type = BackgroundType::Solid;
        style.background_value = "#ff0000".to_string();
        style.shadow_intensity = 0;
        style.canvas_width = 100;
        style.canvas_height = 100;
        let scene = compositor::render(&style, None);
        let pixmap = rasterize(&scene, 1.0, Surface::Export, &BuiltinFrameArt).unwrap();
        let corner = pixmap.pixel(0, 0).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.alpha()), (255, 0, 255));
    }

    #[test]
    fn test_shadow_darkens_below_device() {
        let mut style = transparent_style();
        style.device_type = DeviceType::None;
        style.canvas_width = 600;
        style.canvas_height = 600;
        style.shadow_intensity = 100;
        let with_shadow = rasterize(
            &compositor::render(&style, None),
            1.0,
            Surface::Export,
            &BuiltinFrameArt,
        )
        .unwrap();
        style.shadow_intensity = 0;
        let without = rasterize(
            &compositor::render(&style, None),
            1.0,
            Surface::Export,
            &BuiltinFrameArt,
        )
        .unwrap();
        // just below the 288px placeholder (156..444)
        assert!(alpha(&with_shadow, 300, 460) > 0);
        assert_eq!(alpha(&without, 300, 460), 0);
    }

    #[test]
    fn test_rounded_rect_clamps_radius() {
        let path = rounded_rect_path(Rect::new(0.0, 0.0, 10.0, 4.0), 50.0).unwrap();
        let bounds = path.bounds();
        assert_eq!((bounds.width(), bounds.height()), (10.0, 4.0));
    }

    #[test]
    fn test_invalid_multiplier_is_an_error() {
        let scene = compositor::render(&StyleConfig::default(), None);
        assert!(rasterize(&scene, 0.0, Surface::Export, &BuiltinFrameArt).is_err());
    }
}
