//! Annotation codec: bidirectional conversion between the pixel buffer
//! and its portable encoded form, plus external-image import and file
//! export.
//!
//! The encoded form is a base64 PNG data URL, so a payload is decodable
//! with no external metadata and drops straight into an `<img>` source.
//! Encoding is deterministic for a given buffer, which is what makes
//! snapshot comparisons and the blank-surface fixture stable.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::buffer::{BACKGROUND, PixelBuffer};

const DATA_URL_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";
const PNG_DATA_URL_HEADER: &str = "data:image/png;base64,";

/// Portable, self-describing serialization of a [`PixelBuffer`]. This is
/// the only representation that crosses the crate boundary; the record
/// store carries it as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedAnnotation(String);

impl EncodedAnnotation {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for EncodedAnnotation {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for EncodedAnnotation {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl fmt::Display for EncodedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A malformed annotation payload. Always recoverable: the caller leaves
/// its buffer unchanged and surfaces a soft warning.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not a base64 image data url")]
    Format,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("undecodable image payload: {0}")]
    Image(#[from] image::ImageError),
}

/// Encode a buffer snapshot as a PNG data URL.
///
/// Deterministic for a given buffer content.
#[must_use]
pub fn encode(buffer: &PixelBuffer) -> EncodedAnnotation {
    let mut png = Vec::new();
    let written = PngEncoder::new(&mut png).write_image(
        buffer.data(),
        buffer.width(),
        buffer.height(),
        ExtendedColorType::Rgba8,
    );
    if written.is_err() {
        // Unreachable for a well-formed buffer (the byte length always
        // matches the dimensions); an empty payload beats a panic.
        png.clear();
    }
    EncodedAnnotation(format!("{PNG_DATA_URL_HEADER}{}", BASE64.encode(&png)))
}

/// Decode a payload back into a pixel buffer.
///
/// Accepts any base64 image data URL; the image format is sniffed from
/// the decoded bytes, not from the declared mime type.
///
/// # Errors
///
/// `DecodeError` when the payload is not a base64 data URL or the bytes
/// are not a decodable image.
pub fn decode(encoded: &EncodedAnnotation) -> Result<PixelBuffer, DecodeError> {
    let bytes = payload_bytes(encoded.as_str())?;
    let rgba = image::load_from_memory(&bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::from_raw(width, height, rgba.into_raw()).ok_or(DecodeError::Format)
}

/// Import an arbitrary image file onto a background-filled buffer of
/// exactly `target_width × target_height`: the source is scaled by
/// `min(target_width / src_width, target_height / src_height)` so it fits
/// while keeping its aspect ratio, then centered.
///
/// # Errors
///
/// `DecodeError::Image` when the bytes are not a decodable image.
pub fn import_external_image(
    raw: &[u8],
    target_width: u32,
    target_height: u32,
) -> Result<PixelBuffer, DecodeError> {
    let src = image::load_from_memory(raw)?.to_rgba8();
    let (src_width, src_height) = src.dimensions();
    let target_width = target_width.max(1);
    let target_height = target_height.max(1);

    let scale = (f64::from(target_width) / f64::from(src_width))
        .min(f64::from(target_height) / f64::from(src_height));
    let scaled_width =
        (f64::from(src_width) * scale).round().clamp(1.0, f64::from(target_width)) as u32;
    let scaled_height =
        (f64::from(src_height) * scale).round().clamp(1.0, f64::from(target_height)) as u32;

    let scaled = if (scaled_width, scaled_height) == (src_width, src_height) {
        src
    } else {
        image::imageops::resize(&src, scaled_width, scaled_height, FilterType::Triangle)
    };
    let mut surface = RgbaImage::from_pixel(
        target_width,
        target_height,
        image::Rgba([BACKGROUND.r, BACKGROUND.g, BACKGROUND.b, BACKGROUND.a]),
    );
    let offset_x = i64::from((target_width - scaled_width) / 2);
    let offset_y = i64::from((target_height - scaled_height) / 2);
    image::imageops::overlay(&mut surface, &scaled, offset_x, offset_y);

    PixelBuffer::from_raw(target_width, target_height, surface.into_raw()).ok_or(DecodeError::Format)
}

/// Turn a payload into a downloadable file: a timestamped filename plus
/// the decoded image bytes, verbatim (no re-encode).
///
/// # Errors
///
/// `DecodeError` when the payload is not a base64 data URL.
pub fn export_as_file(encoded: &EncodedAnnotation) -> Result<(String, Vec<u8>), DecodeError> {
    export_as_file_at(encoded, OffsetDateTime::now_utc())
}

/// Internal: export with an explicit timestamp (for testing).
pub(crate) fn export_as_file_at(
    encoded: &EncodedAnnotation,
    at: OffsetDateTime,
) -> Result<(String, Vec<u8>), DecodeError> {
    let bytes = payload_bytes(encoded.as_str())?;
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    Ok((format!("handwritten-notes-{millis}.png"), bytes))
}

/// Strip the data-URL wrapper and decode the base64 payload.
fn payload_bytes(raw: &str) -> Result<Vec<u8>, DecodeError> {
    let rest = raw.strip_prefix(DATA_URL_SCHEME).ok_or(DecodeError::Format)?;
    let (_mime, payload) = rest.split_once(BASE64_MARKER).ok_or(DecodeError::Format)?;
    Ok(BASE64.decode(payload.trim())?)
}
