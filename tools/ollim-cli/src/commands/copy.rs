//! Copy the mockup to the clipboard.

use std::path::PathBuf;

use ollim_common::config::AppConfig;

use super::StyleArgs;

pub async fn run(
    config: &AppConfig,
    image: Option<PathBuf>,
    style: StyleArgs,
) -> anyhow::Result<()> {
    let studio = super::open_studio(config, &style, image.as_deref()).await?;
    let frame = studio
        .render_to_clipboard()
        .await
        .map_err(|e| anyhow::anyhow!("Copy failed: {e}"))?;
    println!(
        "Copied {}x{} mockup ({}) to the clipboard.",
        frame.width,
        frame.height,
        studio.device_info().name
    );
    Ok(())
}
