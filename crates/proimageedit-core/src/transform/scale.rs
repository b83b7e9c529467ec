//! Resampling to arbitrary dimensions.
//!
//! Uses the `image` crate's resize. Aspect ratio is not preserved here;
//! the caller decides the target size.

use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::decode::RasterBuffer;

/// Resampling filter used by [`scale_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, blocky).
    Nearest,
    /// Bilinear interpolation (fast, what a browser canvas uses).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, sharpest).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Largest resize target, in pixels, accepted by default.
pub const DEFAULT_MAX_PIXELS: u64 = 50_000_000;

/// Resample `buffer` to exactly `width x height`.
///
/// # Errors
///
/// Returns [`TransformError::InvalidDimensions`] if either target is zero or
/// the target holds more than `max_pixels` pixels.
pub fn scale_to(
    buffer: &RasterBuffer,
    width: u32,
    height: u32,
    filter: FilterType,
    max_pixels: u64,
) -> Result<RasterBuffer, TransformError> {
    let pixels = u64::from(width).checked_mul(u64::from(height));
    match pixels {
        Some(n) if n > 0 && n <= max_pixels => {}
        _ => return Err(TransformError::InvalidDimensions { width, height }),
    }

    // Fast path: if dimensions match, just clone
    if buffer.dimensions() == (width, height) {
        return Ok(buffer.clone());
    }

    let resized = image::imageops::resize(
        &buffer.to_rgba_image(),
        width,
        height,
        filter.to_image_filter(),
    );

    RasterBuffer::from_rgba_image(resized)
        .ok_or(TransformError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RasterBuffer {
        RasterBuffer::from_fn(width, height, |x, y| {
            [(x * 255 / width) as u8, (y * 255 / height) as u8, 100, 255]
        })
    }

    #[test]
    fn test_scale_down() {
        let out = scale_to(&gradient(100, 80), 50, 40, FilterType::Bilinear, DEFAULT_MAX_PIXELS)
            .unwrap();
        assert_eq!(out.dimensions(), (50, 40));
        assert_eq!(out.byte_size(), 50 * 40 * 4);
    }

    #[test]
    fn test_scale_up_changes_aspect() {
        let out = scale_to(&gradient(10, 10), 40, 15, FilterType::Lanczos3, DEFAULT_MAX_PIXELS)
            .unwrap();
        assert_eq!(out.dimensions(), (40, 15));
    }

    #[test]
    fn test_scale_same_size_is_copy() {
        let buffer = gradient(12, 9);
        let out = scale_to(&buffer, 12, 9, FilterType::Nearest, DEFAULT_MAX_PIXELS).unwrap();
        assert_eq!(out, buffer);
    }

    #[test]
    fn test_scale_zero_dimension_fails() {
        let buffer = gradient(10, 10);
        assert_eq!(
            scale_to(&buffer, 0, 10, FilterType::Bilinear, DEFAULT_MAX_PIXELS),
            Err(TransformError::InvalidDimensions { width: 0, height: 10 })
        );
        assert!(scale_to(&buffer, 10, 0, FilterType::Bilinear, DEFAULT_MAX_PIXELS).is_err());
    }

    #[test]
    fn test_scale_rejects_oversized_target() {
        let buffer = gradient(10, 10);
        assert_eq!(
            scale_to(&buffer, u32::MAX, u32::MAX, FilterType::Bilinear, DEFAULT_MAX_PIXELS),
            Err(TransformError::InvalidDimensions {
                width: u32::MAX,
                height: u32::MAX
            })
        );
        assert!(scale_to(&buffer, 101, 100, FilterType::Nearest, 10_000).is_err());
        assert!(scale_to(&buffer, 100, 100, FilterType::Nearest, 10_000).is_ok());
    }

    #[test]
    fn test_scale_uniform_color_preserved() {
        let buffer = RasterBuffer::filled(16, 16, [40, 80, 120, 255]);
        for filter in [FilterType::Nearest, FilterType::Bilinear, FilterType::Lanczos3] {
            let out = scale_to(&buffer, 7, 23, filter, DEFAULT_MAX_PIXELS).unwrap();
            for px in out.pixels().chunks_exact(4) {
                for (got, want) in px.iter().zip([40u8, 80, 120, 255]) {
                    assert!(got.abs_diff(want) <= 1, "{filter:?}: {px:?}");
                }
            }
        }
    }

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            FilterType::Nearest.to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            FilterType::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            FilterType::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }
}
