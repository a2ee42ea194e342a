//! List the built-in style catalogs.

use clap::ValueEnum;
use serde_json::json;

use ollim_style_model::catalog::{
    BROWSER_PRESETS, CANVAS_SIZES, GRADIENT_PRESETS, IPHONE_COLORS, IPHONE_MODELS, PIXEL_COLORS,
    PIXEL_MODELS, SOLID_COLORS,
};
use ollim_style_model::export::QUALITY_PRESETS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogKind {
    /// Phone models and colors
    Devices,
    /// Browser chrome presets
    Browsers,
    /// Gradient backgrounds
    Gradients,
    /// Solid background colors
    Colors,
    /// Canvas size presets
    Canvas,
    /// JPEG quality presets
    Quality,
}

const ALL: [CatalogKind; 6] = [
    CatalogKind::Devices,
    CatalogKind::Browsers,
    CatalogKind::Gradients,
    CatalogKind::Colors,
    CatalogKind::Canvas,
    CatalogKind::Quality,
];

pub fn run(kind: Option<CatalogKind>, as_json: bool) -> anyhow::Result<()> {
    let kinds: Vec<CatalogKind> = kind.map(|k| vec![k]).unwrap_or_else(|| ALL.to_vec());

    if as_json {
        let mut out = serde_json::Map::new();
        for kind in &kinds {
            let (key, value) = to_json(*kind);
            out.insert(key.to_string(), value);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (i, kind) in kinds.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_table(*kind);
    }
    Ok(())
}

fn to_json(kind: CatalogKind) -> (&'static str, serde_json::Value) {
    match kind {
        CatalogKind::Devices => (
            "devices",
            json!({
                "iphone": { "models": IPHONE_MODELS, "colors": IPHONE_COLORS },
                "pixel": { "models": PIXEL_MODELS, "colors": PIXEL_COLORS },
            }),
        ),
        CatalogKind::Browsers => ("browsers", json!(BROWSER_PRESETS)),
        CatalogKind::Gradients => ("gradients", json!(GRADIENT_PRESETS)),
        CatalogKind::Colors => ("colors", json!(SOLID_COLORS)),
        CatalogKind::Canvas => ("canvas", json!(CANVAS_SIZES)),
        CatalogKind::Quality => ("quality", json!(QUALITY_PRESETS)),
    }
}

fn print_table(kind: CatalogKind) {
    match kind {
        CatalogKind::Devices => {
            println!("Devices:");
            for (family, models, colors) in [
                ("iphone", IPHONE_MODELS, IPHONE_COLORS),
                ("pixel", PIXEL_MODELS, PIXEL_COLORS),
            ] {
                for model in models {
                    println!(
                        "  {family:<7} {:<16} {} ({})",
                        model.id, model.name, model.screen_resolution
                    );
                }
                for color in colors {
                    let mode = if color.display_mode { " [display]" } else { "" };
                    println!("          color {:<18} {}{mode}", color.id, color.name);
                }
            }
        }
        CatalogKind::Browsers => {
            println!("Browsers:");
            for preset in BROWSER_PRESETS {
                let id = serde_json::to_value(preset.id)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                println!("  {id:<8} {} (light, dark)", preset.name);
            }
        }
        CatalogKind::Gradients => {
            println!("Gradients:");
            for preset in GRADIENT_PRESETS {
                println!("  {:<9} {}", preset.id, preset.style);
            }
        }
        CatalogKind::Colors => {
            println!("Solid colors:");
            println!("  {}", SOLID_COLORS.join(" "));
        }
        CatalogKind::Canvas => {
            println!("Canvas sizes:");
            for size in CANVAS_SIZES {
                println!(
                    "  {:<9} {:>4}x{:<4} {}",
                    size.id, size.width, size.height, size.label
                );
            }
        }
        CatalogKind::Quality => {
            println!("JPEG quality presets:");
            for preset in QUALITY_PRESETS {
                println!(
                    "  {:<7} {:>3}  {}",
                    preset.id, preset.quality, preset.label
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_has_every_catalog() {
        for kind in ALL {
            let (key, value) = to_json(kind);
            assert!(!key.is_empty());
            assert!(!value.is_null());
        }
        let (_, devices) = to_json(CatalogKind::Devices);
        assert_eq!(devices["iphone"]["models"][0]["id"], IPHONE_MODELS[0].id);
    }
}
