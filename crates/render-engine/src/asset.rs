//! Decoded image assets, the current-image slot, and frame art sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::ImageFormat;
use tiny_skia::Pixmap;

use ollim_common::error::{OllimError, OllimResult};

/// Accepted input media types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Png,
    Jpeg,
}

impl ImageMime {
    /// Parse a MIME type; anything but PNG and JPEG is rejected.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageMime::Png),
            "image/jpeg" => Some(ImageMime::Jpeg),
            _ => None,
        }
    }

    /// MIME type implied by a file extension.
    pub fn mime_for_path(path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            ImageMime::Png => ImageFormat::Png,
            ImageMime::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// An immutable decoded raster, stored premultiplied.
///
/// Identified by a hash of the encoded bytes; clones share the pixels.
#[derive(Clone)]
pub struct ImageAsset {
    id: u64,
    pixmap: Arc<Pixmap>,
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("id", &format_args!("{:016x}", self.id))
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl PartialEq for ImageAsset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ImageAsset {}

impl ImageAsset {
    /// Decode PNG or JPEG bytes. The content must match the declared type.
    pub fn decode(bytes: &[u8], mime: ImageMime) -> OllimResult<Self> {
        let decoded = image::load_from_memory_with_format(bytes, mime.image_format())
            .map_err(|e| OllimError::decode(format!("{}: {e}", mime.as_str())))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(content_hash(bytes), width, height, rgba.into_raw())
    }

    /// Build an asset from straight (non-premultiplied) RGBA pixels.
    pub fn from_rgba(id: u64, width: u32, height: u32, mut rgba: Vec<u8>) -> OllimResult<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(OllimError::decode("pixel buffer does not match dimensions"));
        }
        premultiply_in_place(&mut rgba);
        let size = tiny_skia::IntSize::from_wh(width, height)
            .ok_or_else(|| OllimError::decode("image has zero size"))?;
        let pixmap = Pixmap::from_vec(rgba, size)
            .ok_or_else(|| OllimError::decode("failed to allocate image pixmap"))?;
        Ok(Self {
            id,
            pixmap: Arc::new(pixmap),
        })
    }

    /// Content hash of the source bytes.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// Decode on a blocking worker.
pub async fn decode_blocking(bytes: Vec<u8>, mime: ImageMime) -> OllimResult<ImageAsset> {
    tokio::task::spawn_blocking(move || ImageAsset::decode(&bytes, mime))
        .await
        .map_err(|e| OllimError::decode(format!("decode worker failed: {e}")))?
}

/// FNV-1a over the encoded bytes.
pub fn content_hash(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

pub(crate) fn premultiply_in_place(bytes: &mut [u8]) {
    for pixel in bytes.chunks_exact_mut(4) {
        let alpha = pixel[3] as u16;
        pixel[0] = ((pixel[0] as u16 * alpha + 127) / 255) as u8;
        pixel[1] = ((pixel[1] as u16 * alpha + 127) / 255) as u8;
        pixel[2] = ((pixel[2] as u16 * alpha + 127) / 255) as u8;
    }
}

pub(crate) fn demultiply_in_place(bytes: &mut [u8]) {
    for pixel in bytes.chunks_exact_mut(4) {
        let alpha = pixel[3];
        if alpha == 0 {
            pixel[0] = 0;
            pixel[1] = 0;
            pixel[2] = 0;
            continue;
        }
        let alpha = alpha as u16;
        pixel[0] = ((pixel[0] as u16 * 255 + alpha / 2) / alpha).min(255) as u8;
        pixel[1] = ((pixel[1] as u16 * 255 + alpha / 2) / alpha).min(255) as u8;
        pixel[2] = ((pixel[2] as u16 * 255 + alpha / 2) / alpha).min(255) as u8;
    }
}

/// Ticket issued for one image selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket(u64);

/// Result of trying to install a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Installed,
    /// A newer selection was made while this one was decoding.
    Superseded,
}

/// Holds the current screenshot. The last selection wins.
#[derive(Debug, Default)]
pub struct ImageSlot {
    current: Option<ImageAsset>,
    generation: u64,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a selection; any earlier pending selection becomes stale.
    pub fn begin(&mut self) -> SelectionTicket {
        self.generation += 1;
        SelectionTicket(self.generation)
    }

    /// Install `asset` if `ticket` is still the latest selection.
    pub fn commit(&mut self, ticket: SelectionTicket, asset: ImageAsset) -> CommitOutcome {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.generation,
                "Discarding superseded image"
            );
            return CommitOutcome::Superseded;
        }
        self.current = Some(asset);
        CommitOutcome::Installed
    }

    pub fn current(&self) -> Option<&ImageAsset> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
    }
}

/// Supplies reference frame art by catalog path.
pub trait FrameArtSource: Send + Sync {
    /// `Ok(None)` when no art exists for `key`; the frame is then drawn
    /// procedurally.
    fn load(&self, key: &str) -> OllimResult<Option<ImageAsset>>;

    fn name(&self) -> &str;
}

/// Always draws frames procedurally.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinFrameArt;

impl FrameArtSource for BuiltinFrameArt {
    fn load(&self, _key: &str) -> OllimResult<Option<ImageAsset>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "builtin"
    }
}

/// Reads frame PNGs from an assets directory, caching decoded art.
#[derive(Debug)]
pub struct DirectoryFrameArt {
    root: PathBuf,
    cache: Mutex<HashMap<String, Option<ImageAsset>>>,
}

impl DirectoryFrameArt {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameArtSource for DirectoryFrameArt {
    fn load(&self, key: &str) -> OllimResult<Option<ImageAsset>> {
        if let Some(cached) = self
            .cache
            .lock()
            .map_err(|_| OllimError::render("frame art cache poisoned"))?
            .get(key)
        {
            return Ok(cached.clone());
        }

        let path = self.root.join(key);
        let loaded = if path.is_file() {
            let bytes = std::fs::read(&path)?;
            let asset = ImageAsset::decode(&bytes, ImageMime::Png).map_err(|e| {
                OllimError::decode(format!("frame art {}: {e}", path.display()))
            })?;
            tracing::debug!(path = %path.display(), "Loaded frame art");
            Some(asset)
        } else {
            tracing::debug!(path = %path.display(), "No frame art, drawing procedurally");
            None
        };

        self.cache
            .lock()
            .map_err(|_| OllimError::render("frame art cache poisoned"))?
            .insert(key.to_string(), loaded.clone());
        Ok(loaded)
    }

    fn name(&self) -> &str {
        "directory"
    }
}

/// Frame art source for an optional assets directory.
pub fn frame_art_source(assets_dir: Option<&Path>) -> Arc<dyn FrameArtSource> {
    match assets_dir {
        Some(dir) => Arc::new(DirectoryFrameArt::new(dir)),
        None => Arc::new(BuiltinFrameArt),
    }
}
