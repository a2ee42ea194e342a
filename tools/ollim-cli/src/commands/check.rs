//! Check configuration, assets, and clipboard support.

use std::path::PathBuf;

use ollim_common::config::{config_file_path, AppConfig};
use ollim_render_engine::asset::frame_art_source;
use ollim_render_engine::clipboard::default_clipboard;
use ollim_style_model::catalog::{IPHONE_COLORS, PIXEL_COLORS};
use ollim_style_model::export::ExportFormat;

pub fn run(config: &AppConfig, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Ollim System Check");
    println!("{}", "=".repeat(50));

    let path = config_path.unwrap_or_else(config_file_path);
    if path.exists() {
        println!("[OK] Config: {}", path.display());
    } else {
        println!("[OK] Config: defaults ({} not found)", path.display());
    }

    match config.export.format.parse::<ExportFormat>() {
        Ok(format) => println!(
            "[OK] Default export: {} (quality {}, timeout {}s)",
            format.extension(),
            config.export.quality,
            config.export.timeout_secs
        ),
        Err(e) => println!("[FAIL] Default export format: {e}"),
    }

    // Output directory
    let out = &config.output_dir;
    match std::fs::create_dir_all(out) {
        Ok(()) => println!("[OK] Output directory: {}", out.display()),
        Err(e) => println!("[FAIL] Output directory {}: {e}", out.display()),
    }

    // Frame art
    match &config.assets_dir {
        Some(dir) if dir.is_dir() => {
            let art = frame_art_source(Some(dir));
            let keys = IPHONE_COLORS
                .iter()
                .chain(PIXEL_COLORS)
                .filter(|c| !c.display_mode)
                .map(|c| c.frame_image);
            let (mut found, mut missing, mut broken) = (0, 0, 0);
            for key in keys {
                match art.load(key) {
                    Ok(Some(_)) => found += 1,
                    Ok(None) => missing += 1,
                    Err(e) => {
                        broken += 1;
                        println!("[FAIL] Frame art {key}: {e}");
                    }
                }
            }
            println!(
                "[OK] Frame art: {} ({found} found, {missing} drawn procedurally, {broken} broken)",
                dir.display()
            );
        }
        Some(dir) => println!(
            "[WARN] Frame art directory missing: {} (frames drawn procedurally)",
            dir.display()
        ),
        None => println!("[OK] Frame art: procedural"),
    }

    // Clipboard
    let clipboard = default_clipboard();
    if clipboard.name() == "none" {
        println!("[WARN] Clipboard: not compiled in (build with --features clipboard)");
    } else {
        println!("[OK] Clipboard: {}", clipboard.name());
    }

    Ok(())
}
