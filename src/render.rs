//! QR code rendering of payment payloads

use crate::config::QrOptions;
use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::transcode;
use qrcode::QrCode;
use qrcode::render::{svg, unicode};

/// A rendered QR graphic as SVG markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQr {
    svg: String,
    modules: usize,
}

impl RenderedQr {
    /// SVG markup of the code.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Number of modules along one side, without the quiet zone.
    pub fn modules(&self) -> usize {
        self.modules
    }
}

/// Renders payloads into scannable QR graphics
#[derive(Debug, Clone)]
pub struct QrRenderer {
    options: QrOptions,
}

impl QrRenderer {
    /// Create a renderer with the given styling options
    pub fn new(options: QrOptions) -> Self {
        Self { options }
    }

    /// Options the renderer was built with.
    pub fn options(&self) -> &QrOptions {
        &self.options
    }

    /// Transcode the payload to the configured charset and render it as SVG.
    pub fn render(&self, payload: &Payload) -> Result<RenderedQr> {
        let bytes = transcode::encode(payload.as_str(), self.options.charset)?;
        self.render_bytes(&bytes)
    }

    /// Render a raw byte stream as SVG.
    pub fn render_bytes(&self, data: &[u8]) -> Result<RenderedQr> {
        let code = self.code(data)?;
        let size = self.options.size;

        let svg = code
            .render::<svg::Color>()
            .min_dimensions(size, size)
            .dark_color(svg::Color(&self.options.foreground))
            .light_color(svg::Color(&self.options.background))
            .quiet_zone(self.options.quiet_zone)
            .build();

        tracing::debug!(
            modules = code.width(),
            bytes = data.len(),
            ec_level = ?self.options.ec_level,
            "Rendered QR code"
        );

        Ok(RenderedQr {
            svg,
            modules: code.width(),
        })
    }

    /// Render the payload with Unicode half blocks for terminal output.
    pub fn render_terminal(&self, payload: &Payload) -> Result<String> {
        let bytes = transcode::encode(payload.as_str(), self.options.charset)?;
        let code = self.code(&bytes)?;

        Ok(code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .quiet_zone(self.options.quiet_zone)
            .build())
    }

    fn code(&self, data: &[u8]) -> Result<QrCode> {
        QrCode::with_error_correction_level(data, self.options.ec_level.into())
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))
    }
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self::new(QrOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::PaymentFields;
    use crate::payload::build_payload;
    use crate::transcode::QrCharset;

    fn payload() -> Payload {
        build_payload(&PaymentFields::default()).payload
    }

    #[test]
    fn renders_svg_document() {
        let rendered = QrRenderer::default().render(&payload()).unwrap();
        assert!(rendered.svg().contains("<svg"));
        assert!(rendered.svg().contains("#000"));
        assert!(rendered.svg().contains("#fff"));
        assert!(rendered.modules() >= 21);
    }

    #[test]
    fn utf8_needs_more_modules_than_windows_1251() {
        let text = payload();
        let narrow = QrRenderer::default().render(&text).unwrap();
        let wide = QrRenderer::new(QrOptions {
            charset: QrCharset::Utf8,
            ..QrOptions::default()
        })
        .render(&text)
        .unwrap();
        assert!(wide.modules() >= narrow.modules());
    }

    #[test]
    fn oversized_input_fails() {
        let huge = vec![b'x'; 8000];
        let err = QrRenderer::default().render_bytes(&huge).unwrap_err();
        assert!(matches!(err, Error::QrEncode(_)));
    }

    #[test]
    fn terminal_rendering_is_multiline() {
        let text = QrRenderer::default().render_terminal(&payload()).unwrap();
        assert!(text.lines().count() > 10);
    }
}
