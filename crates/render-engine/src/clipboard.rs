//! Clipboard sinks for copying a rendered canvas.

use std::sync::Arc;

use ollim_common::error::{OllimError, OllimResult};

use crate::export::RgbaFrame;

/// Destination for a copied image.
pub trait ClipboardSink: Send + Sync {
    /// Place straight-alpha RGBA pixels on the clipboard.
    fn copy_image(&self, frame: &RgbaFrame) -> OllimResult<()>;

    fn name(&self) -> &str;
}

/// Used when the binary is built without clipboard support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl ClipboardSink for NoClipboard {
    fn copy_image(&self, _frame: &RgbaFrame) -> OllimResult<()> {
        Err(OllimError::unsupported(
            "clipboard support is not enabled in this build",
        ))
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// The desktop clipboard. A connection is opened per copy.
#[cfg(feature = "clipboard")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl ClipboardSink for SystemClipboard {
    fn copy_image(&self, frame: &RgbaFrame) -> OllimResult<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| OllimError::clipboard(format!("failed to open clipboard: {e}")))?;
        clipboard
            .set_image(arboard::ImageData {
                width: frame.width as usize,
                height: frame.height as usize,
                bytes: std::borrow::Cow::Borrowed(&frame.pixels),
            })
            .map_err(|e| OllimError::clipboard(format!("failed to set clipboard image: {e}")))?;
        tracing::debug!(
            width = frame.width,
            height = frame.height,
            "Image placed on clipboard"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// The best clipboard this build supports.
pub fn default_clipboard() -> Arc<dyn ClipboardSink> {
    #[cfg(feature = "clipboard")]
    {
        Arc::new(SystemClipboard)
    }
    #[cfg(not(feature = "clipboard"))]
    {
        Arc::new(NoClipboard)
    }
}
