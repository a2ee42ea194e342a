//! Write the on-screen preview raster to a PNG.

use std::path::PathBuf;

use ollim_common::config::AppConfig;
use ollim_render_engine::export::encode_png;

use super::StyleArgs;

pub async fn run(
    config: &AppConfig,
    image: Option<PathBuf>,
    style: StyleArgs,
    (viewport_width, viewport_height): (u32, u32),
    output: PathBuf,
) -> anyhow::Result<()> {
    let mut studio = super::open_studio(config, &style, image.as_deref()).await?;
    let fit = studio.resize_viewport(viewport_width as f64, viewport_height as f64);
    let pixmap = studio.render_preview()?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, encode_png(&pixmap)?)?;

    println!("Preview written: {}", output.display());
    println!("  Viewport: {viewport_width}x{viewport_height}");
    println!(
        "  Fit: {:.3}, zoom {}% -> {}x{}",
        fit,
        studio.style().zoom,
        pixmap.width(),
        pixmap.height()
    );
    Ok(())
}
