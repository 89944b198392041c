//! Byte encoding of the payload before it is embedded in a QR symbol
//!
//! Bank scanners read the GOST payload as single-byte Windows-1251 text,
//! so that is the default. UTF-8 is kept for renderers that expect it.

use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1251};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;

/// Character set used for the QR byte stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QrCharset {
    /// Single-byte Cyrillic code page
    ///
    /// The last digit of the `ST00012` header nominally declares UTF-8, yet
    /// the bytes emitted here are Windows-1251 because that is what bank
    /// scanners decode. The header is left as `ST00012` regardless of the
    /// charset so existing scanners keep accepting the payload.
    #[default]
    #[serde(rename = "windows-1251", alias = "cp1251")]
    Windows1251,
    /// Pass the payload through as UTF-8
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
}

impl QrCharset {
    fn encoding(self) -> &'static Encoding {
        match self {
            QrCharset::Windows1251 => WINDOWS_1251,
            QrCharset::Utf8 => UTF_8,
        }
    }

    /// Canonical label.
    pub fn label(self) -> &'static str {
        match self {
            QrCharset::Windows1251 => "windows-1251",
            QrCharset::Utf8 => "utf-8",
        }
    }
}

impl FromStr for QrCharset {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "windows-1251" | "windows1251" | "cp1251" => Ok(Self::Windows1251),
            "utf-8" | "utf8" => Ok(Self::Utf8),
            other => Err(format!(
                "Unsupported charset '{other}', expected 'windows-1251' or 'utf-8'"
            )),
        }
    }
}

/// Encode payload text into the byte stream for the QR symbol.
///
/// Fails on the first character the charset cannot represent.
pub fn encode(text: &str, charset: QrCharset) -> Result<Cow<'_, [u8]>> {
    if charset == QrCharset::Utf8 {
        return Ok(Cow::Borrowed(text.as_bytes()));
    }

    let (bytes, _, had_errors) = charset.encoding().encode(text);
    if had_errors {
        let offending = text
            .chars()
            .find(|c| {
                let mut buf = [0u8; 4];
                charset.encoding().encode(c.encode_utf8(&mut buf)).2
            })
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(Error::Transcode(format!(
            "character '{offending}' (U+{:04X}) has no {} mapping",
            offending as u32,
            charset.label()
        )));
    }

    Ok(bytes)
}

/// Decode a QR byte stream back into text.
pub fn decode(bytes: &[u8], charset: QrCharset) -> Result<String> {
    let (text, had_errors) = charset.encoding().decode_without_bom_handling(bytes);
    if had_errors {
        return Err(Error::Transcode(format!(
            "byte stream is not valid {}",
            charset.label()
        )));
    }
    Ok(text.into_owned())
}
