//! The studio: one editing session.
//!
//! Owns the style store, the current screenshot, the composed scene, the
//! preview scaler, and the export gate. Every style command that touches the
//! composition re-derives the scene synchronously; exports and clipboard
//! copies read the scene as it was when they were requested.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tiny_skia::Pixmap;

use ollim_common::config::AppConfig;
use ollim_common::error::{OllimError, OllimResult};
use ollim_style_model::export::{
    estimate_file_size, ExportFormat, ExportOptions, EXPORT_MULTIPLIER,
};
use ollim_style_model::preview::PreviewScaler;
use ollim_style_model::store::{StyleCommand, StyleListener, StyleStore, SubscriptionId};
use ollim_style_model::style::{DeviceInfo, StyleConfig};

use crate::asset::{
    content_hash, decode_blocking, frame_art_source, CommitOutcome, ImageAsset, ImageMime,
    ImageSlot, SelectionTicket,
};
use crate::clipboard::{default_clipboard, ClipboardSink};
use crate::compositor;
use crate::export::{ExportJob, ExportPipeline, ExportedImage, ProgressCallback, RgbaFrame};
use crate::raster::{output_size, rasterize, Surface};
use crate::scene::Scene;

/// What happened to an image selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSelection {
    /// The image is now on the canvas.
    Installed,
    /// Not a PNG or JPEG; nothing changed.
    Rejected,
    /// A newer selection was made while this one decoded.
    Superseded,
}

/// A selection that has been ticketed but not yet decoded.
#[derive(Debug)]
pub struct PendingImage {
    ticket: SelectionTicket,
    mime: ImageMime,
    bytes: Vec<u8>,
}

impl PendingImage {
    pub fn ticket(&self) -> SelectionTicket {
        self.ticket
    }

    /// Decode on a blocking worker. Holds no borrow of the studio.
    pub async fn decode(self) -> (SelectionTicket, OllimResult<ImageAsset>) {
        let ticket = self.ticket;
        (ticket, decode_blocking(self.bytes, self.mime).await)
    }
}

pub struct Studio {
    store: StyleStore,
    image: ImageSlot,
    scene: Arc<Scene>,
    preview: PreviewScaler,
    exporter: ExportPipeline,
    clipboard: Arc<dyn ClipboardSink>,
    output_dir: PathBuf,
    export_defaults: ExportOptions,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("store", &self.store)
            .field("image", &self.image)
            .field("preview", &self.preview)
            .field("exporter", &self.exporter)
            .field("clipboard", &self.clipboard.name())
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Studio {
    /// A session with default style and the given application config.
    pub fn new(config: &AppConfig) -> OllimResult<Self> {
        Self::with_style(config, StyleConfig::default())
    }

    /// A session starting from `style`.
    pub fn with_style(config: &AppConfig, style: StyleConfig) -> OllimResult<Self> {
        let format: ExportFormat = config
            .export
            .format
            .parse()
            .map_err(OllimError::config)?;
        if config.export.timeout_secs == 0 {
            return Err(OllimError::config("export.timeout_secs must be positive"));
        }

        let store = StyleStore::new(style);
        let scene = Arc::new(compositor::render(store.config(), None));
        let preview = PreviewScaler::new(scene.width, scene.height);
        let exporter = ExportPipeline::new(
            frame_art_source(config.assets_dir.as_deref()),
            Duration::from_secs(config.export.timeout_secs),
        );

        tracing::debug!(
            output_dir = %config.output_dir.display(),
            frame_art = exporter.frame_art().name(),
            "Studio ready"
        );

        Ok(Self {
            store,
            image: ImageSlot::new(),
            scene,
            preview,
            exporter,
            clipboard: default_clipboard(),
            output_dir: config.output_dir.clone(),
            export_defaults: ExportOptions::new(format, config.export.quality),
        })
    }

    /// Replace the clipboard sink.
    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn style(&self) -> &StyleConfig {
        self.store.config()
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn subscribe(&mut self, listener: StyleListener) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Apply a style command. Returns whether the style changed.
    pub fn apply(&mut self, command: StyleCommand) -> bool {
        let recompose = command.affects_scene();
        let changed = self.store.apply(command);
        if changed && recompose {
            self.recompose();
        }
        changed
    }

    /// The scene as of the last change.
    pub fn scene(&self) -> Arc<Scene> {
        Arc::clone(&self.scene)
    }

    pub fn image(&self) -> Option<&ImageAsset> {
        self.image.current()
    }

    /// Ticket a new selection. `None` when the MIME type is not accepted.
    pub fn begin_image(&mut self, bytes: Vec<u8>, mime: &str) -> Option<PendingImage> {
        let Some(mime) = ImageMime::from_mime(mime) else {
            tracing::warn!(mime, "Ignoring unsupported image type");
            return None;
        };
        let ticket = self.image.begin();
        tracing::debug!(
            mime = mime.as_str(),
            bytes = bytes.len(),
            hash = content_hash(&bytes),
            "Image selected"
        );
        Some(PendingImage {
            ticket,
            mime,
            bytes,
        })
    }

    /// Install a decode result. A failed decode leaves the current image.
    pub fn install_image(
        &mut self,
        ticket: SelectionTicket,
        decoded: OllimResult<ImageAsset>,
    ) -> OllimResult<ImageSelection> {
        let asset = decoded.map_err(|err| {
            tracing::warn!(error = %err, "Image decode failed, keeping current image");
            err
        })?;
        match self.image.commit(ticket, asset) {
            CommitOutcome::Installed => {
                self.recompose();
                Ok(ImageSelection::Installed)
            }
            CommitOutcome::Superseded => Ok(ImageSelection::Superseded),
        }
    }

    /// Select, decode, and install an image in one step.
    pub async fn set_image(&mut self, bytes: Vec<u8>, mime: &str) -> OllimResult<ImageSelection> {
        let Some(pending) = self.begin_image(bytes, mime) else {
            return Ok(ImageSelection::Rejected);
        };
        let (ticket, decoded) = pending.decode().await;
        self.install_image(ticket, decoded)
    }

    /// Read an image file, taking its type from the extension.
    pub async fn open_image(&mut self, path: &Path) -> OllimResult<ImageSelection> {
        if !path.is_file() {
            return Err(OllimError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let Some(mime) = ImageMime::mime_for_path(path) else {
            tracing::warn!(path = %path.display(), "Ignoring file with unsupported extension");
            return Ok(ImageSelection::Rejected);
        };
        let bytes = tokio::fs::read(path).await?;
        self.set_image(bytes, mime).await
    }

    pub fn clear_image(&mut self) {
        self.image.clear();
        self.recompose();
    }

    /// Record a viewport resize and return the new fit factor.
    pub fn resize_viewport(&mut self, width: f64, height: f64) -> f64 {
        self.preview.observe_resize(width, height)
    }

    /// Display scale: viewport fit times user zoom.
    pub fn preview_scale(&self) -> f64 {
        self.preview.display_scale(self.style().zoom)
    }

    /// Rasterize the scene for on-screen display.
    pub fn render_preview(&self) -> OllimResult<Pixmap> {
        let scale = self.preview_scale();
        if scale <= 0.0 {
            return Err(OllimError::render("viewport has not been measured yet"));
        }
        rasterize(
            &self.scene,
            scale,
            Surface::Display,
            self.exporter.frame_art().as_ref(),
        )
    }

    pub fn default_export_options(&self) -> ExportOptions {
        self.export_defaults
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = dir.into();
    }

    pub fn is_exporting(&self) -> bool {
        self.exporter.is_exporting()
    }

    /// Export the current scene under a timestamped name.
    pub async fn export_image(&self, options: ExportOptions) -> OllimResult<ExportedImage> {
        self.export_image_with(options, None, None).await
    }

    /// Export with an optional file stem and progress callback.
    pub async fn export_image_with(
        &self,
        options: ExportOptions,
        file_stem: Option<String>,
        progress: Option<ProgressCallback>,
    ) -> OllimResult<ExportedImage> {
        let job = ExportJob {
            scene: self.scene(),
            options,
            output_dir: self.output_dir.clone(),
            file_stem,
        };
        self.exporter.export(job, progress).await
    }

    /// Copy the export-resolution canvas to the clipboard.
    pub async fn render_to_clipboard(&self) -> OllimResult<RgbaFrame> {
        self.exporter
            .copy_to_clipboard(self.scene(), Arc::clone(&self.clipboard))
            .await
    }

    /// Rough size of an export with `options`.
    pub fn estimated_size(&self, options: &ExportOptions) -> u64 {
        let style = self.style();
        estimate_file_size(style.canvas_width, style.canvas_height, options)
    }

    /// Pixel size of an export of the current scene.
    pub fn export_size(&self) -> (u32, u32) {
        output_size(&self.scene, EXPORT_MULTIPLIER as f64)
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.style().device_info()
    }

    fn recompose(&mut self) {
        self.scene = Arc::new(compositor::render(
            self.store.config(),
            self.image.current(),
        ));
        self.preview.set_canvas(self.scene.width, self.scene.height);
        tracing::debug!(
            revision = self.store.revision(),
            width = self.scene.width,
            height = self.scene.height,
            has_image = self.image.current().is_some(),
            "Scene recomposed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::tests::png_bytes;
    use ollim_style_model::style::DeviceType;

    fn studio() -> Studio {
        Studio::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_format_is_rejected() {
        let mut config = AppConfig::default();
        config.export.format = "gif".to_string();
        let err = Studio::new(&config).unwrap_err();
        assert!(matches!(err, OllimError::Config { .. }));
    }

    #[test]
    fn test_zoom_does_not_recompose() {
        let mut studio = studio();
        let before = studio.scene();
        assert!(studio.apply(StyleCommand::ZoomIn));
        assert!(Arc::ptr_eq(&before, &studio.scene()));

        assert!(studio.apply(StyleCommand::SetDeviceType(DeviceType::None)));
        assert!(!Arc::ptr_eq(&before, &studio.scene()));
    }

    #[test]
    fn test_export_size_saturates_for_huge_canvas() {
        let mut studio = studio();
        assert_eq!(studio.export_size(), (2160, 2160));

        let huge = StyleConfig {
            canvas_width: 3_000_000_000,
            ..StyleConfig::default()
        };
        studio.apply(StyleCommand::Replace(Box::new(huge)));
        assert_eq!(studio.export_size(), (u32::MAX, 2160));
    }

    #[test]
    fn test_unchanged_command_keeps_scene() {
        let mut studio = studio();
        let before = studio.scene();
        assert!(!studio.apply(StyleCommand::SetShadowIntensity(50)));
        assert!(Arc::ptr_eq(&before, &studio.scene()));
    }

    #[test]
    fn test_stale_decode_is_superseded() {
        let mut studio = studio();
        let first = studio
            .begin_image(png_bytes(4, 4, [255, 0, 0, 255]), "image/png")
            .unwrap();
        let second = studio
            .begin_image(png_bytes(4, 4, [0, 0, 255, 255]), "image/png")
            .unwrap();

        let blue = ImageAsset::decode(&png_bytes(4, 4, [0, 0, 255, 255]), ImageMime::Png);
        let red = ImageAsset::decode(&png_bytes(4, 4, [255, 0, 0, 255]), ImageMime::Png);
        assert_eq!(
            studio.install_image(second.ticket(), blue).unwrap(),
            ImageSelection::Installed
        );
        assert_eq!(
            studio.install_image(first.ticket(), red).unwrap(),
            ImageSelection::Superseded
        );
        let current = studio.image().unwrap();
        assert_eq!(current.pixmap().pixel(0, 0).unwrap().blue(), 255);
    }

    #[test]
    fn test_unsupported_mime_has_no_ticket() {
        let mut studio = studio();
        assert!(studio.begin_image(vec![1, 2, 3], "image/gif").is_none());
        assert!(studio.image().is_none());
    }

    #[test]
    fn test_preview_needs_viewport() {
        let mut studio = studio();
        assert!(studio.render_preview().is_err());
        studio.resize_viewport(600.0, 600.0);
        let preview = studio.render_preview().unwrap();
        assert_eq!(preview.width(), 540);
    }

    #[test]
    fn test_preview_follows_canvas_size() {
        let mut studio = studio();
        studio.resize_viewport(1000.0, 1000.0);
        studio.apply(StyleCommand::SetCanvasSize {
            width: 1800,
            height: 900,
        });
        assert!((studio.preview_scale() - 0.5).abs() < 1e-9);
    }
}
