//! Print the resolved device geometry.

use serde::Serialize;

use ollim_common::config::AppConfig;
use ollim_style_model::geometry::{self, DeviceGeometry, Rect};
use ollim_style_model::style::DeviceInfo;

use super::StyleArgs;

#[derive(Serialize)]
struct GeometryReport {
    device: DeviceInfo,
    canvas: (u32, u32),
    mockup_scale: u32,
    geometry: DeviceGeometry,
    /// Where the scaled device lands on the canvas.
    placement: Rect,
}

pub fn run(
    _config: &AppConfig,
    style: StyleArgs,
    image_size: Option<(u32, u32)>,
) -> anyhow::Result<()> {
    let style = style.resolve()?;
    let canvas_width = style.canvas_width as f64;
    let canvas_height = style.canvas_height as f64;
    let resolved = geometry::resolve(style.device(), image_size, canvas_width, canvas_height);

    let (width, height) = resolved.size();
    let scale = style.mockup_scale as f64 / 100.0;
    let placement = Rect::new(
        (canvas_width - width * scale) / 2.0,
        (canvas_height - height * scale) / 2.0,
        width * scale,
        height * scale,
    );

    let report = GeometryReport {
        device: style.device_info(),
        canvas: (style.canvas_width, style.canvas_height),
        mockup_scale: style.mockup_scale,
        geometry: resolved,
        placement,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
