//! Export the mockup to a PNG or JPEG file.

use std::path::PathBuf;

use ollim_common::config::AppConfig;
use ollim_render_engine::export::{ExportStage, ProgressCallback};
use ollim_style_model::export::{
    format_file_size, quality_preset, ExportFormat, ExportOptions, QUALITY_PRESETS,
};

use super::StyleArgs;

/// Output flags for `ollim export`.
#[derive(Debug, Default)]
pub struct ExportArgs {
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub format: Option<String>,
    pub quality: Option<u8>,
    pub preset: Option<String>,
}

pub async fn run(
    config: &AppConfig,
    image: Option<PathBuf>,
    style: StyleArgs,
    args: ExportArgs,
) -> anyhow::Result<()> {
    let mut studio = super::open_studio(config, &style, image.as_deref()).await?;
    if let Some(dir) = args.output.clone() {
        studio.set_output_dir(dir);
    }
    let options = export_options(studio.default_export_options(), &args)?;

    let canvas = studio.style();
    let (out_width, out_height) = studio.export_size();
    println!("Exporting mockup to: {}", studio.output_dir().display());
    println!("  Device: {}", studio.device_info().name);
    println!(
        "  Canvas: {}x{} (output {out_width}x{out_height})",
        canvas.canvas_width, canvas.canvas_height
    );
    match options.format {
        ExportFormat::Png => println!("  Format: PNG"),
        ExportFormat::Jpeg => println!("  Format: JPEG (quality {})", options.quality),
    }
    println!(
        "  Estimated size: {}",
        format_file_size(studio.estimated_size(&options))
    );

    let progress_cb: ProgressCallback = Box::new(|stage| {
        let label = match stage {
            ExportStage::Rendering => "rendering",
            ExportStage::Encoding => "encoding",
            ExportStage::Writing => "writing",
            ExportStage::Complete => "done",
        };
        print!("\r  Progress: {label:<10}");
    });

    let exported = studio
        .export_image_with(options, args.name, Some(progress_cb))
        .await
        .map_err(|e| anyhow::anyhow!("\nExport failed: {e}"))?;

    println!();
    println!("Export complete: {}", exported.path.display());
    println!(
        "  {}x{}, {} bytes",
        exported.width, exported.height, exported.bytes
    );
    Ok(())
}

/// Resolve format and quality flags against the configured defaults.
fn export_options(defaults: ExportOptions, args: &ExportArgs) -> anyhow::Result<ExportOptions> {
    let format = match &args.format {
        Some(format) => format.parse::<ExportFormat>().map_err(anyhow::Error::msg)?,
        None => defaults.format,
    };

    let quality = match (&args.preset, args.quality) {
        (Some(id), _) => {
            if !QUALITY_PRESETS.iter().any(|p| p.id == id.as_str()) {
                anyhow::bail!("Unknown quality preset: {id}. Use: max, high, medium, low");
            }
            quality_preset(id).quality
        }
        (None, Some(quality)) => {
            if quality > 100 {
                anyhow::bail!("Quality must be in [0, 100], got {quality}");
            }
            quality
        }
        (None, None) => defaults.quality,
    };

    Ok(ExportOptions::new(format, quality))
}
