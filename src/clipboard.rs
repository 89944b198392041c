//! Clipboard targets for copied QR images and payload text

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// PNG-encoded image with its pixel dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    /// Encoded PNG bytes
    pub bytes: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// A single clipboard payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardItem {
    /// `text/plain`
    Text(String),
    /// `image/png`
    Png(PngImage),
}

impl ClipboardItem {
    /// MIME type of the item.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ClipboardItem::Text(_) => "text/plain",
            ClipboardItem::Png(_) => "image/png",
        }
    }
}

/// Destination for copy actions
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with `item`.
    ///
    /// Rejections are reported as [`Error::Clipboard`] carrying the reason.
    async fn write(&self, item: ClipboardItem) -> Result<()>;
}

/// In-process clipboard that keeps the last written item
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    last: Mutex<Option<ClipboardItem>>,
}

impl MemoryClipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently written item.
    pub fn contents(&self) -> Option<ClipboardItem> {
        self.last.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write(&self, item: ClipboardItem) -> Result<()> {
        let mut guard = self
            .last
            .lock()
            .map_err(|_| Error::Clipboard("clipboard state poisoned".to_string()))?;
        *guard = Some(item);
        Ok(())
    }
}

/// Operating-system clipboard backed by `arboard`
#[cfg(feature = "system-clipboard")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(feature = "system-clipboard")]
#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write(&self, item: ClipboardItem) -> Result<()> {
        let mime = item.mime_type();
        tokio::task::spawn_blocking(move || write_system(item))
            .await
            .map_err(|e| Error::Clipboard(format!("clipboard task failed: {e}")))??;
        tracing::info!(mime, "Wrote clipboard item");
        Ok(())
    }
}

#[cfg(feature = "system-clipboard")]
fn write_system(item: ClipboardItem) -> Result<()> {
    use std::borrow::Cow;

    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;

    match item {
        ClipboardItem::Text(text) => clipboard
            .set_text(text)
            .map_err(|e| Error::Clipboard(e.to_string())),
        ClipboardItem::Png(png) => {
            // arboard takes raw RGBA pixels rather than an encoded PNG.
            let rgba = image::load_from_memory_with_format(&png.bytes, image::ImageFormat::Png)?
                .into_rgba8();
            clipboard
                .set_image(arboard::ImageData {
                    width: rgba.width() as usize,
                    height: rgba.height() as usize,
                    bytes: Cow::Owned(rgba.into_raw()),
                })
                .map_err(|e| Error::Clipboard(e.to_string()))
        }
    }
}
