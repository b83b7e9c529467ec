//! Exact pixel cropping.
//!
//! Crop rectangles are integer buffer coordinates. There is no resampling:
//! the output holds exactly the source pixels inside the rectangle.
//!
//! # Example
//!
//! ```ignore
//! // Crop a 50x50 region starting at (25, 25)
//! let cropped = crop(&buffer, &CropRect::new(25, 25, 50, 50))?;
//! ```

use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::decode::{RasterBuffer, CHANNELS};

/// A rectangle in buffer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Whether the rectangle is non-empty and lies fully inside a
    /// `width x height` buffer.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= width as u64
            && self.bottom() <= height as u64
    }
}

/// Copy the pixels inside `rect` into a new buffer.
///
/// # Errors
///
/// Returns [`TransformError::InvalidRegion`] when `rect` has a zero extent or
/// reaches outside the buffer. The input is never modified.
pub fn crop(buffer: &RasterBuffer, rect: &CropRect) -> Result<RasterBuffer, TransformError> {
    let (width, height) = buffer.dimensions();
    if !rect.fits_within(width, height) {
        return Err(TransformError::InvalidRegion {
            rect: *rect,
            width,
            height,
        });
    }

    // Fast path: full crop returns a clone
    if rect.x == 0 && rect.y == 0 && rect.width == width && rect.height == height {
        return Ok(buffer.clone());
    }

    let src = buffer.pixels();
    let row_bytes = rect.width as usize * CHANNELS;
    let mut output = Vec::with_capacity(row_bytes * rect.height as usize);

    // Copy pixel data row by row
    for y in rect.y..rect.y + rect.height {
        let start = buffer.index_of(rect.x, y);
        output.extend_from_slice(&src[start..start + row_bytes]);
    }

    RasterBuffer::from_raw(rect.width, rect.height, output).ok_or(TransformError::InvalidRegion {
        rect: *rect,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(width: u32, height: u32) -> RasterBuffer {
        RasterBuffer::from_fn(width, height, |x, y| [x as u8, y as u8, 0, 255])
    }

    #[test]
    fn test_crop_center() {
        let buffer = coords(100, 100);
        let cropped = crop(&buffer, &CropRect::new(25, 25, 50, 50)).unwrap();

        assert_eq!(cropped.dimensions(), (50, 50));
        assert_eq!(cropped.pixel(0, 0), Some([25, 25, 0, 255]));
        assert_eq!(cropped.pixel(49, 49), Some([74, 74, 0, 255]));
    }

    #[test]
    fn test_crop_full_is_copy() {
        let buffer = coords(10, 8);
        let cropped = crop(&buffer, &CropRect::new(0, 0, 10, 8)).unwrap();
        assert_eq!(cropped, buffer);
    }

    #[test]
    fn test_crop_single_pixel() {
        let buffer = coords(10, 10);
        let cropped = crop(&buffer, &CropRect::new(9, 9, 1, 1)).unwrap();
        assert_eq!(cropped.dimensions(), (1, 1));
        assert_eq!(cropped.pixel(0, 0), Some([9, 9, 0, 255]));
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let buffer = coords(100, 100);
        let err = crop(&buffer, &CropRect::new(60, 0, 50, 50)).unwrap_err();
        assert!(matches!(err, TransformError::InvalidRegion { width: 100, .. }));
    }

    #[test]
    fn test_crop_zero_extent() {
        let buffer = coords(10, 10);
        assert!(crop(&buffer, &CropRect::new(0, 0, 0, 5)).is_err());
        assert!(crop(&buffer, &CropRect::new(0, 0, 5, 0)).is_err());
    }

    #[test]
    fn test_crop_overflowing_coordinates() {
        let buffer = coords(10, 10);
        assert!(crop(&buffer, &CropRect::new(u32::MAX, 0, 2, 2)).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// A buffer plus an in-bounds rectangle.
    fn buffer_and_rect() -> impl Strategy<Value = (RasterBuffer, CropRect)> {
        (1u32..=24, 1u32..=24)
            .prop_flat_map(|(w, h)| {
                let len = (w * h * 4) as usize;
                (
                    prop::collection::vec(any::<u8>(), len..=len),
                    Just(w),
                    Just(h),
                    0..w,
                    0..h,
                )
            })
            .prop_flat_map(|(pixels, w, h, x, y)| {
                (Just(pixels), Just(w), Just(h), Just(x), Just(y), 1..=w - x, 1..=h - y)
            })
            .prop_map(|(pixels, w, h, x, y, rw, rh)| {
                (
                    RasterBuffer::from_raw(w, h, pixels).unwrap(),
                    CropRect::new(x, y, rw, rh),
                )
            })
    }

    proptest! {
        /// Property: crop output is the exact sub-rectangle.
        #[test]
        fn prop_crop_is_exact((buffer, rect) in buffer_and_rect()) {
            let cropped = crop(&buffer, &rect).unwrap();
            prop_assert_eq!(cropped.dimensions(), (rect.width, rect.height));

            for j in 0..rect.height {
                for i in 0..rect.width {
                    prop_assert_eq!(cropped.pixel(i, j), buffer.pixel(rect.x + i, rect.y + j));
                }
            }
        }
    }
}
