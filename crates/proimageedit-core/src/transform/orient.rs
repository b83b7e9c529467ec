//! Lossless orientation changes: 90 degree clockwise rotation and flips.
//!
//! These are pure index permutations, so composing them never loses data:
//! four rotations or two identical flips reproduce the input exactly.

use crate::decode::{RasterBuffer, CHANNELS};

/// Rotate 90 degrees clockwise.
///
/// Input pixel `(x, y)` lands at output `(height - 1 - y, x)`; the output is
/// `height x width`.
pub fn rotate_clockwise_90(buffer: &RasterBuffer) -> RasterBuffer {
    let (w, h) = buffer.dimensions();
    let src = buffer.pixels();
    // Output pixel (ox, oy) comes from input (oy, h - 1 - ox).
    RasterBuffer::from_fn(h, w, |ox, oy| {
        let idx = buffer.index_of(oy, h - 1 - ox);
        [src[idx], src[idx + 1], src[idx + 2], src[idx + 3]]
    })
}

/// Mirror left-to-right: `(x, y)` maps to `(width - 1 - x, y)`.
pub fn flip_horizontal(buffer: &RasterBuffer) -> RasterBuffer {
    let mut out = buffer.clone();
    let row_len = buffer.width() as usize * CHANNELS;
    for row in out.pixels_mut().chunks_exact_mut(row_len) {
        let mut left = 0;
        let mut right = row_len - CHANNELS;
        while left < right {
            for c in 0..CHANNELS {
                row.swap(left + c, right + c);
            }
            left += CHANNELS;
            right -= CHANNELS;
        }
    }
    out
}

/// Mirror top-to-bottom: `(x, y)` maps to `(x, height - 1 - y)`.
pub fn flip_vertical(buffer: &RasterBuffer) -> RasterBuffer {
    let mut out = buffer.clone();
    let row_len = buffer.width() as usize * CHANNELS;
    let src_rows = buffer.pixels().chunks_exact(row_len).rev();
    for (dst, src) in out.pixels_mut().chunks_exact_mut(row_len).zip(src_rows) {
        dst.copy_from_slice(src);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Each pixel encodes its own coordinates.
    fn coords(width: u32, height: u32) -> RasterBuffer {
        RasterBuffer::from_fn(width, height, |x, y| [x as u8, y as u8, 0, 255])
    }

    #[test]
    fn test_rotate_maps_coordinates() {
        let buffer = coords(3, 2);
        let rotated = rotate_clockwise_90(&buffer);

        assert_eq!(rotated.dimensions(), (2, 3));
        for y in 0..2 {
            for x in 0..3 {
                let expected = buffer.pixel(x, y).unwrap();
                assert_eq!(rotated.pixel(2 - 1 - y, x), Some(expected), "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_rotate_top_left_goes_top_right() {
        let mut buffer = RasterBuffer::filled(4, 2, [0, 0, 0, 255]);
        buffer.pixels_mut()[0] = 255;
        let rotated = rotate_clockwise_90(&buffer);
        assert_eq!(rotated.pixel(1, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_flip_horizontal_maps_coordinates() {
        let buffer = coords(5, 3);
        let flipped = flip_horizontal(&buffer);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(flipped.pixel(4 - x, y), buffer.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_flip_vertical_maps_coordinates() {
        let buffer = coords(5, 3);
        let flipped = flip_vertical(&buffer);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(flipped.pixel(x, 2 - y), buffer.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_flip_vertical_swaps_rows() {
        let buffer = coords(1, 4);
        let flipped = flip_vertical(&buffer);
        assert_ne!(flipped, buffer);
        assert_eq!(flipped.pixel(0, 0), Some([0, 3, 0, 255]));
        assert_eq!(flipped.pixel(0, 3), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_single_pixel_is_fixed_point() {
        let buffer = RasterBuffer::filled(1, 1, [9, 8, 7, 6]);
        assert_eq!(rotate_clockwise_90(&buffer), buffer);
        assert_eq!(flip_horizontal(&buffer), buffer);
        assert_eq!(flip_vertical(&buffer), buffer);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn buffer_strategy() -> impl Strategy<Value = RasterBuffer> {
        (1u32..=20, 1u32..=20).prop_flat_map(|(w, h)| {
            let len = (w * h * 4) as usize;
            prop::collection::vec(any::<u8>(), len..=len)
                .prop_map(move |pixels| RasterBuffer::from_raw(w, h, pixels).unwrap())
        })
    }

    proptest! {
        /// Property: four clockwise quarter turns are the identity.
        #[test]
        fn prop_rotate_four_times_identity(buffer in buffer_strategy()) {
            let mut out = buffer.clone();
            for _ in 0..4 {
                out = rotate_clockwise_90(&out);
            }
            prop_assert_eq!(out, buffer);
        }

        /// Property: a rotation swaps width and height.
        #[test]
        fn prop_rotate_swaps_dimensions(buffer in buffer_strategy()) {
            let (w, h) = buffer.dimensions();
            prop_assert_eq!(rotate_clockwise_90(&buffer).dimensions(), (h, w));
        }

        /// Property: flipping twice is the identity.
        #[test]
        fn prop_flips_are_involutions(buffer in buffer_strategy()) {
            prop_assert_eq!(&flip_horizontal(&flip_horizontal(&buffer)), &buffer);
            prop_assert_eq!(&flip_vertical(&flip_vertical(&buffer)), &buffer);
        }

        /// Property: two quarter turns equal both flips.
        #[test]
        fn prop_half_turn_is_double_flip(buffer in buffer_strategy()) {
            let half = rotate_clockwise_90(&rotate_clockwise_90(&buffer));
            prop_assert_eq!(half, flip_vertical(&flip_horizontal(&buffer)));
        }
    }
}
