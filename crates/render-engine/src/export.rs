//! Export configuration and job management.
//!
//! An export rasterizes an already-composed scene at the fixed export
//! multiplier, encodes it, and writes it to a timestamped file. At most one
//! export (or clipboard copy) runs at a time; the raster work happens on a
//! blocking worker bounded by a timeout.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use serde::Serialize;
use tiny_skia::Pixmap;

use ollim_common::error::{OllimError, OllimResult};
pub use ollim_style_model::export::{ExportFormat, ExportOptions, EXPORT_MULTIPLIER};

use crate::asset::{demultiply_in_place, FrameArtSource};
use crate::clipboard::ClipboardSink;
use crate::raster::{rasterize, Surface};
use crate::scene::Scene;

/// Prefix of generated file names.
pub const FILE_PREFIX: &str = "ollim";

/// Default bound on a single export.
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// The composed scene, shared with the session.
    pub scene: Arc<Scene>,

    /// Format and quality.
    pub options: ExportOptions,

    /// Output directory.
    pub output_dir: PathBuf,

    /// File stem override; a timestamped name is used otherwise.
    pub file_stem: Option<String>,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Rendering,
    Encoding,
    Writing,
    Complete,
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportStage) + Send>;

/// A file written by an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
    /// Encoded size on disk.
    pub bytes: u64,
}

/// Straight-alpha RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaFrame {
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let mut pixels = pixmap.data().to_vec();
        demultiply_in_place(&mut pixels);
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            pixels,
        }
    }
}

/// Resets the in-flight flag when dropped.
struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Runs exports one at a time.
pub struct ExportPipeline {
    in_flight: Arc<AtomicBool>,
    timeout: Duration,
    art: Arc<dyn FrameArtSource>,
}

impl std::fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("in_flight", &self.is_exporting())
            .field("timeout", &self.timeout)
            .field("art", &self.art.name())
            .finish()
    }
}

impl ExportPipeline {
    pub fn new(art: Arc<dyn FrameArtSource>, timeout: Duration) -> Self {
        Self {
            in_flight: Arc::new(AtomicBool::new(false)),
            timeout,
            art,
        }
    }

    /// Whether an export or clipboard copy is running.
    pub fn is_exporting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn frame_art(&self) -> &Arc<dyn FrameArtSource> {
        &self.art
    }

    fn acquire(&self) -> OllimResult<ExportGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OllimError::ExportInProgress)?;
        Ok(ExportGuard {
            flag: Arc::clone(&self.in_flight),
        })
    }

    /// Rasterize, encode, and write the job's scene.
    pub async fn export(
        &self,
        job: ExportJob,
        progress: Option<ProgressCallback>,
    ) -> OllimResult<ExportedImage> {
        if let Some(stem) = job.file_stem.as_deref() {
            validate_file_stem(stem)?;
        }
        let guard = self.acquire()?;
        tracing::info!(
            output = %job.output_dir.display(),
            format = ?job.options.format,
            quality = job.options.quality,
            width = job.scene.width,
            height = job.scene.height,
            "Starting export"
        );

        let started = Instant::now();
        let art = Arc::clone(&self.art);
        let result = self
            .run_blocking(move || {
                let _guard = guard;
                write_export(&job, art.as_ref(), progress.as_ref())
            })
            .await;

        match &result {
            Ok(image) => tracing::info!(
                path = %image.path.display(),
                width = image.width,
                height = image.height,
                bytes = image.bytes,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Export complete"
            ),
            Err(err) => tracing::warn!(error = %err, "Export failed"),
        }
        result
    }

    /// Rasterize the scene at the export multiplier and hand it to `sink`.
    pub async fn copy_to_clipboard(
        &self,
        scene: Arc<Scene>,
        sink: Arc<dyn ClipboardSink>,
    ) -> OllimResult<RgbaFrame> {
        let guard = self.acquire()?;
        tracing::info!(sink = sink.name(), "Copying canvas to clipboard");
        let art = Arc::clone(&self.art);
        self.run_blocking(move || {
            let _guard = guard;
            let multiplier = EXPORT_MULTIPLIER as f64;
            let pixmap = rasterize(&scene, multiplier, Surface::Export, art.as_ref())?;
            let frame = RgbaFrame::from_pixmap(&pixmap);
            sink.copy_image(&frame)?;
            Ok(frame)
        })
        .await
    }

    async fn run_blocking<T, F>(&self, work: F) -> OllimResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> OllimResult<T> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(work);
        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => {
                joined.map_err(|e| OllimError::export(format!("export worker failed: {e}")))?
            }
            // The worker keeps the guard until it actually finishes.
            Err(_) => Err(OllimError::export(format!(
                "export timed out after {}s",
                self.timeout.as_secs_f64()
            ))),
        }
    }
}

fn write_export(
    job: &ExportJob,
    art: &dyn FrameArtSource,
    progress: Option<&ProgressCallback>,
) -> OllimResult<ExportedImage> {
    let report = |stage| {
        if let Some(cb) = progress {
            cb(stage);
        }
    };

    report(ExportStage::Rendering);
    let pixmap = rasterize(&job.scene, EXPORT_MULTIPLIER as f64, Surface::Export, art)?;

    report(ExportStage::Encoding);
    let encoded = encode(&pixmap, &job.options)?;

    report(ExportStage::Writing);
    std::fs::create_dir_all(&job.output_dir)?;
    let name = export_file_name(job.file_stem.as_deref(), job.options.format, Local::now());
    let path = unique_path(&job.output_dir, &name);
    std::fs::write(&path, &encoded)?;

    report(ExportStage::Complete);
    Ok(ExportedImage {
        path,
        width: pixmap.width(),
        height: pixmap.height(),
        format: job.options.format,
        bytes: encoded.len() as u64,
    })
}

/// Encode a premultiplied pixmap in the requested format.
pub fn encode(pixmap: &Pixmap, options: &ExportOptions) -> OllimResult<Vec<u8>> {
    match options.format {
        ExportFormat::Png => encode_png(pixmap),
        ExportFormat::Jpeg => encode_jpeg(pixmap, options.quality),
    }
}

/// Lossless PNG with straight alpha.
pub fn encode_png(pixmap: &Pixmap) -> OllimResult<Vec<u8>> {
    let frame = RgbaFrame::from_pixmap(pixmap);
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            &frame.pixels,
            frame.width,
            frame.height,
            ColorType::Rgba8.into(),
        )
        .map_err(|e| OllimError::export(format!("PNG encoding failed: {e}")))?;
    Ok(buf)
}

/// JPEG with alpha flattened over opaque white. Quality 0 becomes 1.
pub fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> OllimResult<Vec<u8>> {
    let rgb = flatten_over_white(pixmap);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .write_image(&rgb, pixmap.width(), pixmap.height(), ColorType::Rgb8.into())
        .map_err(|e| OllimError::export(format!("JPEG encoding failed: {e}")))?;
    Ok(buf)
}

/// Composite premultiplied pixels over white and drop alpha.
fn flatten_over_white(pixmap: &Pixmap) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixmap.width() as usize * pixmap.height() as usize * 3);
    for pixel in pixmap.data().chunks_exact(4) {
        let uncovered = 255 - pixel[3];
        rgb.push(pixel[0].saturating_add(uncovered));
        rgb.push(pixel[1].saturating_add(uncovered));
        rgb.push(pixel[2].saturating_add(uncovered));
    }
    rgb
}

/// `ollim-YYYYMMDD-HHMMSS.ext`, or `<stem>.ext` when a stem is given.
pub fn export_file_name(stem: Option<&str>, format: ExportFormat, at: DateTime<Local>) -> String {
    match stem.map(str::trim).filter(|s| !s.is_empty()) {
        Some(stem) => format!("{stem}.{}", format.extension()),
        None => format!(
            "{FILE_PREFIX}-{}.{}",
            at.format("%Y%m%d-%H%M%S"),
            format.extension()
        ),
    }
}

/// A file stem must name a file directly inside the output directory.
pub fn validate_file_stem(stem: &str) -> OllimResult<()> {
    let stem = stem.trim();
    if stem.contains(['/', '\\', '\0']) || stem == "." || stem == ".." {
        return Err(OllimError::config(format!(
            "invalid file name '{stem}': must not contain path separators"
        )));
    }
    Ok(())
}

/// First free path for `name` in `dir`, adding `-1`, `-2`, ... on collision.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
    (1..)
        .map(|n| dir.join(format!("{stem}-{n}.{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tiny_skia::Color;

    #[test]
    fn test_file_name_from_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            export_file_name(None, ExportFormat::Png, at),
            "ollim-20240309-140507.png"
        );
        assert_eq!(
            export_file_name(None, ExportFormat::Jpeg, at),
            "ollim-20240309-140507.jpeg"
        );
        assert_eq!(
            export_file_name(Some("hero"), ExportFormat::Png, at),
            "hero.png"
        );
        assert_eq!(
            export_file_name(Some("  "), ExportFormat::Png, at),
            "ollim-20240309-140507.png"
        );
    }

    #[test]
    fn test_unique_path_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shot.png"), b"x").unwrap();
        std::fs::write(dir.path().join("shot-1.png"), b"x").unwrap();
        assert_eq!(
            unique_path(dir.path(), "shot.png"),
            dir.path().join("shot-2.png")
        );
    }

    #[test]
    fn test_flatten_over_white() {
        let mut pixmap = Pixmap::new(2, 1).unwrap();
        pixmap.fill(Color::from_rgba8(0, 0, 0, 0));
        let flat = flatten_over_white(&pixmap);
        assert_eq!(flat, vec![255; 6]);

        pixmap.fill(Color::from_rgba8(255, 0, 0, 255));
        assert_eq!(&flatten_over_white(&pixmap)[..3], &[255, 0, 0]);
    }

    #[test]
    fn test_png_keeps_alpha() {
        let mut pixmap = Pixmap::new(4, 4).unwrap();
        pixmap.fill(Color::from_rgba8(0, 0, 0, 0));
        let bytes = encode_png(&pixmap).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_jpeg_quality_zero_is_accepted() {
        let mut pixmap = Pixmap::new(8, 8).unwrap();
        pixmap.fill(Color::from_rgba8(10, 20, 30, 255));
        let bytes = encode_jpeg(&pixmap, 0).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_file_stem_must_stay_in_output_dir() {
        assert!(validate_file_stem("launch-shot").is_ok());
        assert!(validate_file_stem("v1.2 final").is_ok());
        for bad in ["../x", "../../x", "a/b", "a\\b", "/etc/x", "..", "."] {
            assert!(
                matches!(validate_file_stem(bad), Err(OllimError::Config { .. })),
                "{bad} accepted"
            );
        }
    }

    fn job_in(dir: &Path, file_stem: Option<&str>) -> ExportJob {
        let style = ollim_style_model::StyleConfig::default();
        ExportJob {
            scene: Arc::new(crate::compositor::render(&style, None)),
            options: ExportOptions::png(),
            output_dir: dir.to_path_buf(),
            file_stem: file_stem.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_escaping_file_stem_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("out");
        let pipeline = ExportPipeline::new(
            Arc::new(crate::asset::BuiltinFrameArt),
            DEFAULT_EXPORT_TIMEOUT,
        );

        let err = pipeline
            .export(job_in(&out, Some("../escaped")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OllimError::Config { .. }));
        assert!(!root.path().join("escaped.png").exists());
        assert!(!pipeline.is_exporting());

        let exported = pipeline
            .export(job_in(&out, Some("kept")), None)
            .await
            .unwrap();
        assert_eq!(exported.path, out.join("kept.png"));
    }

    /// Frame art that takes a while to load.
    struct SlowArt {
        delay: Duration,
        loads: std::sync::atomic::AtomicUsize,
    }

    impl FrameArtSource for SlowArt {
        fn load(&self, _key: &str) -> OllimResult<Option<crate::asset::ImageAsset>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            Ok(None)
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_timeout_keeps_gate_until_worker_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let art = Arc::new(SlowArt {
            delay: Duration::from_millis(500),
            loads: std::sync::atomic::AtomicUsize::new(0),
        });
        let pipeline = ExportPipeline::new(art.clone(), Duration::from_millis(20));

        let err = pipeline
            .export(job_in(dir.path(), None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OllimError::Export { .. }));
        assert!(err.to_string().contains("timed out"));

        // The worker is still rasterizing.
        assert!(pipeline.is_exporting());
        assert!(matches!(
            pipeline.acquire(),
            Err(OllimError::ExportInProgress)
        ));

        let deadline = Instant::now() + Duration::from_secs(10);
        while pipeline.is_exporting() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!pipeline.is_exporting());
        assert_eq!(art.loads.load(Ordering::SeqCst), 1);
        assert!(pipeline.acquire().is_ok());
    }

    #[test]
    fn test_gate_rejects_second_acquire() {
        let pipeline = ExportPipeline::new(
            Arc::new(crate::asset::BuiltinFrameArt),
            DEFAULT_EXPORT_TIMEOUT,
        );
        let guard = pipeline.acquire().unwrap();
        assert!(pipeline.is_exporting());
        assert!(matches!(
            pipeline.acquire(),
            Err(OllimError::ExportInProgress)
        ));
        drop(guard);
        assert!(!pipeline.is_exporting());
        assert!(pipeline.acquire().is_ok());
    }
}
