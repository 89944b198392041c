//! Export of rendered QR graphics as PNG/SVG files or clipboard items
//!
//! Rasterization goes SVG markup → bitmap (through a [`BitmapDecoder`]) →
//! opaque white surface → PNG. The decode step is the only await point and
//! runs behind a single-flight guard, so overlapping exports are queued
//! rather than sharing the surface.

use crate::clipboard::{Clipboard, ClipboardItem, PngImage};
use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::render::RenderedQr;
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// File name of a PNG download.
pub const PNG_FILE_NAME: &str = "qr-code.png";
/// File name of an SVG download.
pub const SVG_FILE_NAME: &str = "qr-code.svg";

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Something that may hold a rendered vector graphic
pub trait VectorSource {
    /// SVG markup of the graphic, or `None` when nothing is rendered.
    fn locate_svg(&self) -> Option<&str>;
}

impl VectorSource for RenderedQr {
    fn locate_svg(&self) -> Option<&str> {
        Some(self.svg())
    }
}

impl<T: VectorSource> VectorSource for Option<T> {
    fn locate_svg(&self) -> Option<&str> {
        self.as_ref().and_then(VectorSource::locate_svg)
    }
}

/// Decodes SVG markup into a bitmap at its natural size
#[async_trait]
pub trait BitmapDecoder: Send + Sync {
    /// Decode `svg` once; either a bitmap or an error, never retried.
    async fn decode(&self, svg: Vec<u8>) -> Result<RgbaImage>;
}

/// Production decoder rasterizing with resvg on the blocking pool
#[derive(Debug, Default, Clone, Copy)]
pub struct ResvgDecoder;

#[async_trait]
impl BitmapDecoder for ResvgDecoder {
    async fn decode(&self, svg: Vec<u8>) -> Result<RgbaImage> {
        tokio::task::spawn_blocking(move || rasterize(&svg))
            .await
            .map_err(|e| Error::Export(format!("decode task failed: {e}")))?
    }
}

fn rasterize(svg: &[u8]) -> Result<RgbaImage> {
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default())
        .map_err(|e| Error::Export(format!("Failed to decode SVG: {e}")))?;
    let size = tree.size().to_int_size();

    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        Error::Export(format!(
            "Invalid bitmap dimensions {}x{}",
            size.width(),
            size.height()
        ))
    })?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let mut bitmap = RgbaImage::new(size.width(), size.height());
    for (dst, src) in bitmap.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    Ok(bitmap)
}

/// A finished export ready to be saved or handed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Fixed download file name
    pub file_name: &'static str,
    /// MIME type of `bytes`
    pub mime_type: &'static str,
    /// Encoded content
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its file name.
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "Saved export");
        Ok(path)
    }
}

/// Converts rendered QR graphics into downloadable and copyable forms
pub struct ExportEncoder {
    decoder: Arc<dyn BitmapDecoder>,
    clipboard: Arc<dyn Clipboard>,
    in_flight: Mutex<()>,
}

impl ExportEncoder {
    /// Create an encoder using the given decoder and clipboard
    pub fn new(decoder: Arc<dyn BitmapDecoder>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            decoder,
            clipboard,
            in_flight: Mutex::new(()),
        }
    }

    /// Rasterize the graphic into a `qr-code.png` artifact.
    pub async fn export_as_image(&self, source: &impl VectorSource) -> Result<ExportArtifact> {
        let png = self.rasterize(source).await?;
        Ok(ExportArtifact {
            file_name: PNG_FILE_NAME,
            mime_type: "image/png",
            bytes: png.bytes,
        })
    }

    /// Serialize the graphic as a `qr-code.svg` artifact.
    pub fn export_as_vector(&self, source: &impl VectorSource) -> Result<ExportArtifact> {
        let svg = source.locate_svg().ok_or(Error::GraphicMissing)?;
        Ok(ExportArtifact {
            file_name: SVG_FILE_NAME,
            mime_type: "image/svg+xml",
            bytes: svg.as_bytes().to_vec(),
        })
    }

    /// Rasterize the graphic and place it on the clipboard as `image/png`.
    pub async fn copy_image_to_clipboard(&self, source: &impl VectorSource) -> Result<()> {
        let png = self.rasterize(source).await?;
        self.clipboard.write(ClipboardItem::Png(png)).await
    }

    /// Place the payload text on the clipboard as `text/plain`.
    pub async fn copy_text_to_clipboard(&self, payload: &Payload) -> Result<()> {
        self.clipboard
            .write(ClipboardItem::Text(payload.as_str().to_string()))
            .await
    }

    async fn rasterize(&self, source: &impl VectorSource) -> Result<PngImage> {
        let markup = source
            .locate_svg()
            .ok_or(Error::GraphicMissing)?
            .as_bytes()
            .to_vec();

        let _guard = self.in_flight.lock().await;
        let bitmap = self.decoder.decode(markup).await?;
        let (width, height) = bitmap.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::Export("decoded bitmap is empty".to_string()));
        }

        let mut surface = RgbaImage::from_pixel(width, height, WHITE);
        imageops::overlay(&mut surface, &bitmap, 0, 0);

        let bytes = encode_png(surface)?;

        tracing::debug!(width, height, bytes = bytes.len(), "Rasterized QR graphic");
        Ok(PngImage {
            bytes,
            width,
            height,
        })
    }
}

/// Flatten the composited surface to RGB and encode it as PNG.
fn encode_png(surface: RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(surface)
        .into_rgb8()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| Error::Export(format!("PNG encoding failed: {e}")))?;
    Ok(bytes)
}
