use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use payqr::transcode::{self, QrCharset};
use payqr::{
    BitmapDecoder, Clipboard, ClipboardItem, Error, ExportEncoder, FieldName, MemoryClipboard,
    PaymentFields, QrOptions, QrRenderer, RenderedQr, ResvgDecoder, build_payload,
};

fn sample_fields() -> PaymentFields {
    PaymentFields {
        name: "Иванов Иван".into(),
        personal_acc: "40817810099910004312".into(),
        bank_name: "ПАО Сбербанк".into(),
        bic: "044525225".into(),
        corresp_acc: "30101810400000000225".into(),
        payee_inn: "7707083893".into(),
        purpose: "Оплата услуг".into(),
        sum: "150.00".into(),
    }
}

fn scan(png_or_bitmap: &image::DynamicImage) -> Vec<u8> {
    let mut prepared = rqrr::PreparedImage::prepare(png_or_bitmap.to_luma8());
    let grids = prepared.detect_grids();
    assert!(!grids.is_empty(), "no QR code found in exported image");

    let mut bytes = Vec::new();
    grids[0].decode_to(&mut bytes).expect("decode QR grid");
    bytes
}

fn render_sample() -> (payqr::Payload, RenderedQr) {
    let outcome = build_payload(&sample_fields());
    assert!(outcome.is_valid());
    let rendered = QrRenderer::default().render(&outcome.payload).expect("render");
    (outcome.payload, rendered)
}

fn encoder_with(clipboard: Arc<dyn Clipboard>) -> ExportEncoder {
    ExportEncoder::new(Arc::new(ResvgDecoder), clipboard)
}

#[tokio::test]
async fn png_export_scans_back_to_windows_1251_payload() {
    let (payload, rendered) = render_sample();
    let encoder = encoder_with(Arc::new(MemoryClipboard::new()));

    let artifact = encoder.export_as_image(&rendered).await.expect("export png");
    assert_eq!(artifact.file_name, "qr-code.png");
    assert_eq!(artifact.mime_type, "image/png");
    assert!(artifact.bytes.starts_with(b"\x89PNG"));

    let image = image::load_from_memory(&artifact.bytes).expect("load png");
    assert!(image.width() >= 256);
    assert_eq!(image.width(), image.height());

    let scanned = scan(&image);
    let expected = transcode::encode(payload.as_str(), QrCharset::Windows1251).unwrap();
    assert_eq!(scanned, expected.as_ref());
    assert_eq!(
        transcode::decode(&scanned, QrCharset::Windows1251).unwrap(),
        payload.as_str()
    );
}

#[tokio::test]
async fn png_export_has_no_transparent_pixels() {
    let (_, rendered) = render_sample();
    let encoder = encoder_with(Arc::new(MemoryClipboard::new()));

    let artifact = encoder.export_as_image(&rendered).await.unwrap();
    let image = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
    assert!(image.pixels().all(|p| p[3] == 255));
    assert_eq!(*image.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
}

#[tokio::test]
async fn vector_export_reparses_to_the_same_code() {
    let (payload, rendered) = render_sample();
    let encoder = encoder_with(Arc::new(MemoryClipboard::new()));

    let artifact = encoder.export_as_vector(&rendered).expect("export svg");
    assert_eq!(artifact.file_name, "qr-code.svg");
    let tree = resvg::usvg::Tree::from_data(&artifact.bytes, &resvg::usvg::Options::default())
        .expect("exported svg is well-formed");
    assert!(tree.size().width() >= 256.0);

    let bitmap = ResvgDecoder.decode(artifact.bytes.clone()).await.unwrap();
    let scanned = scan(&image::DynamicImage::ImageRgba8(bitmap));
    let expected = transcode::encode(payload.as_str(), QrCharset::Windows1251).unwrap();
    assert_eq!(scanned, expected.as_ref());
}

#[tokio::test]
async fn utf8_charset_embeds_payload_unchanged() {
    let outcome = build_payload(&sample_fields());
    let renderer = QrRenderer::new(QrOptions {
        charset: QrCharset::Utf8,
        ..QrOptions::default()
    });
    let rendered = renderer.render(&outcome.payload).unwrap();

    let encoder = encoder_with(Arc::new(MemoryClipboard::new()));
    let artifact = encoder.export_as_image(&rendered).await.unwrap();
    let scanned = scan(&image::load_from_memory(&artifact.bytes).unwrap());
    assert_eq!(scanned, outcome.payload.as_str().as_bytes());
}

#[tokio::test]
async fn copy_image_writes_png_at_natural_size() {
    let (_, rendered) = render_sample();
    let clipboard = Arc::new(MemoryClipboard::new());
    let encoder = encoder_with(clipboard.clone());

    encoder.copy_image_to_clipboard(&rendered).await.unwrap();

    let item = clipboard.contents().expect("clipboard item");
    assert_eq!(item.mime_type(), "image/png");
    let ClipboardItem::Png(png) = item else {
        panic!("expected png item");
    };
    let image = image::load_from_memory(&png.bytes).unwrap();
    assert_eq!((image.width(), image.height()), (png.width, png.height));
}

#[tokio::test]
async fn copy_text_writes_raw_payload() {
    let (payload, _) = render_sample();
    let clipboard = Arc::new(MemoryClipboard::new());
    let encoder = encoder_with(clipboard.clone());

    encoder.copy_text_to_clipboard(&payload).await.unwrap();

    assert_eq!(
        clipboard.contents(),
        Some(ClipboardItem::Text(payload.as_str().to_string()))
    );
}

struct RejectingClipboard;

#[async_trait]
impl Clipboard for RejectingClipboard {
    async fn write(&self, _item: ClipboardItem) -> payqr::Result<()> {
        Err(Error::Clipboard("Document is not focused".to_string()))
    }
}

#[tokio::test]
async fn clipboard_rejection_carries_reason() {
    let (payload, rendered) = render_sample();
    let encoder = encoder_with(Arc::new(RejectingClipboard));

    let err = encoder.copy_image_to_clipboard(&rendered).await.unwrap_err();
    assert!(matches!(err, Error::Clipboard(ref reason) if reason == "Document is not focused"));
    assert_eq!(
        err.user_message(),
        "Ошибка копирования изображения: Document is not focused"
    );

    let err = encoder.copy_text_to_clipboard(&payload).await.unwrap_err();
    assert!(matches!(err, Error::Clipboard(_)));
}

#[tokio::test]
async fn missing_graphic_aborts_every_export() {
    let invalid = build_payload(&sample_fields().with(FieldName::Name, ""));
    assert!(!invalid.is_valid());
    let nothing: Option<RenderedQr> = None;

    let clipboard = Arc::new(MemoryClipboard::new());
    let encoder = encoder_with(clipboard.clone());

    assert!(matches!(
        encoder.export_as_image(&nothing).await,
        Err(Error::GraphicMissing)
    ));
    assert!(matches!(
        encoder.export_as_vector(&nothing),
        Err(Error::GraphicMissing)
    ));
    assert!(matches!(
        encoder.copy_image_to_clipboard(&nothing).await,
        Err(Error::GraphicMissing)
    ));
    assert!(clipboard.contents().is_none());
}

struct FailingDecoder;

#[async_trait]
impl BitmapDecoder for FailingDecoder {
    async fn decode(&self, _svg: Vec<u8>) -> payqr::Result<RgbaImage> {
        Err(Error::Export("image failed to load".to_string()))
    }
}

#[tokio::test]
async fn decode_failure_produces_nothing() {
    let (_, rendered) = render_sample();
    let clipboard = Arc::new(MemoryClipboard::new());
    let encoder = ExportEncoder::new(Arc::new(FailingDecoder), clipboard.clone());

    let err = encoder.export_as_image(&rendered).await.unwrap_err();
    assert!(matches!(err, Error::Export(_)));

    let err = encoder.copy_image_to_clipboard(&rendered).await.unwrap_err();
    assert_eq!(
        err.user_message(),
        "Не удалось загрузить изображение для копирования"
    );
    assert!(clipboard.contents().is_none());
}

#[derive(Default)]
struct SlowDecoder {
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl BitmapDecoder for SlowDecoder {
    async fn decode(&self, _svg: Vec<u8>) -> payqr::Result<RgbaImage> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])))
    }
}

#[tokio::test]
async fn overlapping_exports_are_serialized() {
    let (_, rendered) = render_sample();
    let decoder = Arc::new(SlowDecoder::default());
    let clipboard = Arc::new(MemoryClipboard::new());
    let encoder = ExportEncoder::new(decoder.clone(), clipboard.clone());

    let (download, copy, second_download) = tokio::join!(
        encoder.export_as_image(&rendered),
        encoder.copy_image_to_clipboard(&rendered),
        encoder.export_as_image(&rendered),
    );

    assert!(download.is_ok());
    assert!(copy.is_ok());
    assert!(second_download.is_ok());
    assert_eq!(decoder.calls.load(Ordering::SeqCst), 3);
    assert_eq!(decoder.peak.load(Ordering::SeqCst), 1);
    assert!(clipboard.contents().is_some());
}

#[tokio::test]
async fn saved_artifact_uses_fixed_file_name() {
    let (_, rendered) = render_sample();
    let encoder = encoder_with(Arc::new(MemoryClipboard::new()));
    let dir = tempfile::tempdir().unwrap();

    let png = encoder.export_as_image(&rendered).await.unwrap();
    let svg = encoder.export_as_vector(&rendered).unwrap();
    let png_path = png.save_to(dir.path()).await.unwrap();
    let svg_path = svg.save_to(dir.path()).await.unwrap();

    assert_eq!(png_path, dir.path().join("qr-code.png"));
    assert_eq!(svg_path, dir.path().join("qr-code.svg"));
    assert_eq!(std::fs::read(&svg_path).unwrap(), rendered.svg().as_bytes());
}
