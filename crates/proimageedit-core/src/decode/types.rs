//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Error types for image decoding operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input is empty or its format is not recognized.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The decoded image has a zero dimension.
    #[error("Decoded image has invalid dimensions {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// The live, decoded image of an editing session.
///
/// Pixels are RGBA, 8 bits per channel, row-major, non-premultiplied alpha.
/// The pixel vector always holds exactly `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap raw RGBA data, returning `None` when the length does not match
    /// the dimensions or a dimension is zero.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if pixels.len() != byte_len(width, height) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a buffer where every pixel has the same RGBA value.
    ///
    /// Zero dimensions are bumped to 1 so the buffer is never empty.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(byte_len(width, height))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build a buffer pixel by pixel from a function of `(x, y)`.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(byte_len(width, height));
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a RasterBuffer from an image::RgbaImage.
    ///
    /// Returns `None` for zero-sized images.
    pub fn from_rgba_image(img: image::RgbaImage) -> Option<Self> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, img.into_raw())
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        // Length is guaranteed by construction; the fallback is unreachable.
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable RGBA bytes. The length cannot change through a slice, so the
    /// size invariant holds.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consume the buffer and return its RGBA bytes.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Read the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index_of(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[idx..idx + CHANNELS]);
        Some(px)
    }

    /// Byte offset of pixel `(x, y)`. Caller guarantees bounds.
    #[inline]
    pub(crate) fn index_of(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

/// Expected byte length for an RGBA buffer of the given size.
#[inline]
pub fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal); // Invalid defaults to Normal
    }

    #[test]
    fn test_raster_buffer_creation() {
        let buffer = RasterBuffer::from_raw(100, 50, vec![0u8; 100 * 50 * 4]).unwrap();

        assert_eq!(buffer.width(), 100);
        assert_eq!(buffer.height(), 50);
        assert_eq!(buffer.pixel_count(), 5000);
        assert_eq!(buffer.byte_size(), 20000);
    }

    #[test]
    fn test_from_raw_rejects_length_mismatch() {
        assert!(RasterBuffer::from_raw(10, 10, vec![0u8; 10 * 10 * 3]).is_none());
        assert!(RasterBuffer::from_raw(10, 10, vec![0u8; 10 * 10 * 4 + 1]).is_none());
    }

    #[test]
    fn test_from_raw_rejects_zero_dimensions() {
        assert!(RasterBuffer::from_raw(0, 10, vec![]).is_none());
        assert!(RasterBuffer::from_raw(10, 0, vec![]).is_none());
    }

    #[test]
    fn test_filled() {
        let buffer = RasterBuffer::filled(3, 2, [255, 0, 0, 255]);
        assert_eq!(buffer.byte_size(), 24);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(buffer.pixel(x, y), Some([255, 0, 0, 255]));
            }
        }
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let buffer = RasterBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]);
        assert_eq!(&buffer.pixels()[0..4], &[0, 0, 0, 255]);
        assert_eq!(&buffer.pixels()[4..8], &[1, 0, 0, 255]);
        assert_eq!(&buffer.pixels()[12..16], &[0, 1, 0, 255]);
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let buffer = RasterBuffer::filled(2, 2, [1, 2, 3, 4]);
        assert_eq!(buffer.pixel(2, 0), None);
        assert_eq!(buffer.pixel(0, 2), None);
    }

    #[test]
    fn test_rgba_image_round_trip() {
        let buffer = RasterBuffer::from_fn(4, 3, |x, y| [x as u8, y as u8, 7, 200]);
        let img = buffer.to_rgba_image();
        assert_eq!(img.dimensions(), (4, 3));
        let back = RasterBuffer::from_rgba_image(img).unwrap();
        assert_eq!(back, buffer);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::CorruptedFile("truncated".to_string());
        assert_eq!(err.to_string(), "Corrupted or incomplete image file: truncated");

        let err = DecodeError::InvalidFormat;
        assert_eq!(err.to_string(), "Invalid or unsupported image format");
    }
}
