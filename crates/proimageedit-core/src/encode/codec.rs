//! PNG and JPEG encoding for snapshots, compression, and export.
//!
//! PNG is lossless and keeps the alpha channel; it is used for history
//! snapshots so undo/redo never compounds artifacts. JPEG is lossy with a
//! configurable quality and has no alpha channel, so the buffer is first
//! composited over black, the same way a browser canvas exports JPEG.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::RasterBuffer;

/// Errors that can occur during encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed { format: ImageFormat, message: String },

    /// The MIME type is not one of the supported output formats
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Output formats the editor can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    /// Lossless, keeps alpha.
    Png,
    /// Lossy with quality 1-100, no alpha.
    #[default]
    Jpeg,
}

impl ImageFormat {
    /// MIME type, e.g. `image/jpeg`.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// File extension, taken from the MIME subtype (`png`, `jpeg`).
    pub fn extension(self) -> &'static str {
        let mime = self.mime_type();
        mime.split_once('/').map_or(mime, |(_, subtype)| subtype)
    }

    /// Whether encoding through this format discards information.
    pub fn is_lossy(self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }

    /// Parse a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Result<Self, EncodeError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Ok(ImageFormat::Jpeg),
            other => Err(EncodeError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => f.write_str("PNG"),
            ImageFormat::Jpeg => f.write_str("JPEG"),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mime(s)
    }
}

/// Encode a buffer in the requested format.
///
/// # Arguments
///
/// * `buffer` - The RGBA buffer to encode
/// * `format` - Output format
/// * `quality` - JPEG quality (1-100, clamped); ignored for PNG
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for further editing
/// * 60-80: Medium quality, acceptable for web/social media (editor default: 80)
/// * Below 60: Low quality, visible artifacts
pub fn encode_image(
    buffer: &RasterBuffer,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        ImageFormat::Png => encode_png(buffer.pixels(), buffer.width(), buffer.height()),
        ImageFormat::Jpeg => {
            let rgb = flatten_over_black(buffer.pixels());
            encode_jpeg(&rgb, buffer.width(), buffer.height(), quality)
        }
    }
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, 4)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::Png,
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, 3)?;

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::Jpeg,
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

fn validate(pixels: &[u8], width: u32, height: u32, channels: usize) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * channels;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(())
}

/// Composite non-premultiplied RGBA over an opaque black background.
fn flatten_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &c in &px[..3] {
            rgb.push(((c as u32 * alpha + 127) / 255) as u8);
        }
    }
    rgb
}


// ============================================================================
// Property-Based Tests
// ============================================================================
