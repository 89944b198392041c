//! payqr - GOST ST00012 payment QR codes
//!
//! This library builds the Russian bank payment payload
//! (`ST00012|Name=...|PersonalAcc=...`), validates the form it comes from,
//! renders it as a QR code and exports the code as PNG, SVG or a clipboard
//! item.
//!
//! # Features
//!
//! - **Payload Builder**: fixed field order, required-field validation, Sum in kopecks
//! - **Windows-1251 transcoding**: the byte stream bank scanners expect
//! - **Export**: SVG → bitmap → PNG on an opaque white surface, single-flight
//! - **Persistence**: the form record survives between runs as JSON
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use payqr::{ExportEncoder, FieldName, MemoryClipboard, PaymentFields, QrRenderer, ResvgDecoder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fields = PaymentFields::default()
//!         .with(FieldName::Name, "Иванов Иван")
//!         .with(FieldName::PersonalAcc, "40817810099910004312")
//!         .with(FieldName::PayeeInn, "7707083893");
//!
//!     let outcome = payqr::build_payload(&fields);
//!     let payload = outcome.require_valid()?;
//!     let qr = QrRenderer::default().render(payload)?;
//!
//!     let encoder = ExportEncoder::new(Arc::new(ResvgDecoder), Arc::new(MemoryClipboard::new()));
//!     let png = encoder.export_as_image(&qr).await?;
//!     png.save_to(std::path::Path::new(".")).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod amount;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod fields;
pub mod form;
pub mod logging;
pub mod payload;
pub mod render;
pub mod storage;
pub mod transcode;

// Re-exports for convenience
pub use error::{Error, Result};

pub use clipboard::{Clipboard, ClipboardItem, MemoryClipboard, PngImage};
#[cfg(feature = "system-clipboard")]
#[cfg_attr(docsrs, doc(cfg(feature = "system-clipboard")))]
pub use clipboard::SystemClipboard;
pub use config::{EcLevel, LogRotation, LoggingOptions, PayqrConfig, QrOptions, StorageOptions};
pub use export::{BitmapDecoder, ExportArtifact, ExportEncoder, ResvgDecoder, VectorSource};
pub use fields::{FieldName, PaymentFields};
pub use form::PaymentForm;
pub use payload::{BuildOutcome, Payload, build_payload};
pub use render::{QrRenderer, RenderedQr};
pub use storage::{FormStore, JsonFileStore};
pub use transcode::QrCharset;
