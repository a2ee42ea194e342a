//! Export options and output size estimation.

use serde::{Deserialize, Serialize};

/// Supersampling multiplier applied to every export.
pub const EXPORT_MULTIPLIER: u32 = 2;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn supports_alpha(&self) -> bool {
        matches!(self, ExportFormat::Png)
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            other => Err(format!("unsupported export format '{other}'")),
        }
    }
}

/// JPEG quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub quality: u8,
    /// Estimated size relative to the maximum preset.
    pub size_ratio: f64,
}

pub static QUALITY_PRESETS: &[QualityPreset] = &[
    QualityPreset {
        id: "max",
        label: "Maximum",
        quality: 100,
        size_ratio: 1.0,
    },
    QualityPreset {
        id: "high",
        label: "High",
        quality: 85,
        size_ratio: 0.6,
    },
    QualityPreset {
        id: "medium",
        label: "Medium",
        quality: 70,
        size_ratio: 0.4,
    },
    QualityPreset {
        id: "low",
        label: "Low",
        quality: 50,
        size_ratio: 0.25,
    },
];

/// Id of the preset selected by default.
pub const DEFAULT_QUALITY_PRESET: &str = "high";

/// Preset by id, falling back to the default preset.
pub fn quality_preset(id: &str) -> &'static QualityPreset {
    QUALITY_PRESETS
        .iter()
        .find(|p| p.id == id)
        .or_else(|| QUALITY_PRESETS.iter().find(|p| p.id == DEFAULT_QUALITY_PRESET))
        .unwrap_or(&QUALITY_PRESETS[0])
}

/// Preset whose quality is closest to the given value.
pub fn nearest_quality_preset(quality: u8) -> &'static QualityPreset {
    QUALITY_PRESETS
        .iter()
        .min_by_key(|p| (p.quality as i16 - quality as i16).abs())
        .unwrap_or(&QUALITY_PRESETS[0])
}

/// Format and encoder quality for one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// `[0, 100]`; ignored for PNG.
    pub quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: quality_preset(DEFAULT_QUALITY_PRESET).quality,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat, quality: u8) -> Self {
        Self {
            format,
            quality: quality.min(100),
        }
    }

    pub fn png() -> Self {
        Self::new(ExportFormat::Png, 100)
    }

    pub fn jpeg(quality: u8) -> Self {
        Self::new(ExportFormat::Jpeg, quality)
    }
}

const PNG_BYTES_PER_PIXEL: f64 = 1.2;
const JPEG_BYTES_PER_PIXEL: f64 = 0.5;

/// Rough output size in bytes for a canvas exported with `options`.
pub fn estimate_file_size(canvas_width: u32, canvas_height: u32, options: &ExportOptions) -> u64 {
    let pixels = (canvas_width as f64 * EXPORT_MULTIPLIER as f64)
        * (canvas_height as f64 * EXPORT_MULTIPLIER as f64);
    let bytes = match options.format {
        ExportFormat::Png => pixels * PNG_BYTES_PER_PIXEL,
        ExportFormat::Jpeg => {
            pixels * JPEG_BYTES_PER_PIXEL * nearest_quality_preset(options.quality).size_ratio
        }
    };
    bytes.round() as u64
}

/// `~NNNKB` below one megabyte, `~N.NMB` above.
///
/// Kilobytes are thousandths of a binary megabyte, so 300 000 bytes reads
/// `~286KB`.
pub fn format_file_size(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    let megabytes = bytes as f64 / MB;
    if megabytes < 1.0 {
        format!("~{}KB", (megabytes * 1000.0).round())
    } else {
        format!("~{megabytes:.1}MB")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(ExportFormat::Png.extension(), "png");
        assert_eq!(ExportFormat::Jpeg.extension(), "jpeg");
        assert_eq!("JPG".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert!("webp".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_quality_presets() {
        assert_eq!(quality_preset("medium").quality, 70);
        assert_eq!(quality_preset("nope").id, "high");
        assert_eq!(nearest_quality_preset(90).id, "high");
        assert_eq!(nearest_quality_preset(0).id, "low");
        assert_eq!(ExportOptions::default().quality, 85);
    }

    #[test]
    fn test_quality_is_capped() {
        assert_eq!(ExportOptions::jpeg(255).quality, 100);
    }

    #[test]
    fn test_png_estimate() {
        // 1080x1080 at 2x = 4_665_600 px * 1.2
        let bytes = estimate_file_size(1080, 1080, &ExportOptions::png());
        assert_eq!(bytes, 5_598_720);
        assert_eq!(format_file_size(bytes), "~5.3MB");
    }

    #[test]
    fn test_jpeg_estimate_uses_preset_ratio() {
        let high = estimate_file_size(500, 500, &ExportOptions::jpeg(85));
        assert_eq!(high, 300_000);
        assert_eq!(format_file_size(high), "~286KB");
        let low = estimate_file_size(500, 500, &ExportOptions::jpeg(50));
        assert!(low < high);
    }

    #[test]
    fn test_kilobytes_are_thousandths_of_a_megabyte() {
        assert_eq!(format_file_size(0), "~0KB");
        assert_eq!(format_file_size(524_288), "~500KB");
        assert_eq!(format_file_size(1_048_575), "~1000KB");
        assert_eq!(format_file_size(1_048_576), "~1.0MB");
    }
}
