//! Per-pixel color filters.
//!
//! Every filter mutates an RGBA [`RasterBuffer`] in place, leaves alpha and
//! dimensions untouched, and is a pure function of its input.
//!
//! ## Filters
//! - `grayscale`: BT.601 luminance replaces R, G and B
//! - `sepia`: fixed 3x3 tone matrix
//! - `invert`: `255 - v` per color channel
//! - `brightness`: constant additive delta
//! - `contrast`: linear scaling around the 128 midpoint
//!
//! Filters are addressable by name through [`ColorOp`]'s `FromStr` impl.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EditorConfig;
use crate::decode::RasterBuffer;
use crate::luminance::calculate_luminance_u8;

/// Sepia tone matrix, applied as `out = M * [r, g, b]`.
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Midpoint used by the contrast filter.
pub const CONTRAST_MIDPOINT: f32 = 128.0;

/// A named color filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOp {
    Grayscale,
    Sepia,
    Invert,
    Brightness,
    Contrast,
}

impl ColorOp {
    /// All filters in the order the UI lists them.
    pub const ALL: [ColorOp; 5] = [
        ColorOp::Grayscale,
        ColorOp::Sepia,
        ColorOp::Invert,
        ColorOp::Brightness,
        ColorOp::Contrast,
    ];

    /// Stable name used by the UI and persisted commands.
    pub fn name(self) -> &'static str {
        match self {
            ColorOp::Grayscale => "grayscale",
            ColorOp::Sepia => "sepia",
            ColorOp::Invert => "invert",
            ColorOp::Brightness => "brightness",
            ColorOp::Contrast => "contrast",
        }
    }

    /// Apply this filter to `buffer` with the tunables from `config`.
    pub fn apply(self, buffer: &mut RasterBuffer, config: &EditorConfig) {
        match self {
            ColorOp::Grayscale => grayscale(buffer),
            ColorOp::Sepia => sepia(buffer),
            ColorOp::Invert => invert(buffer),
            ColorOp::Brightness => brightness(buffer, config.brightness_delta),
            ColorOp::Contrast => contrast(buffer, config.contrast_factor),
        }
    }
}

impl fmt::Display for ColorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a filter name is not recognized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown color operation '{0}'")]
pub struct UnknownColorOp(pub String);

impl FromStr for ColorOp {
    type Err = UnknownColorOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorOp::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownColorOp(s.to_string()))
    }
}

/// Replace R, G, B with their rounded BT.601 luminance.
pub fn grayscale(buffer: &mut RasterBuffer) {
    for px in buffer.pixels_mut().chunks_exact_mut(4) {
        let lum = calculate_luminance_u8(px[0], px[1], px[2]);
        px[0] = lum;
        px[1] = lum;
        px[2] = lum;
    }
}

/// Apply [`SEPIA_MATRIX`] to every pixel, clamping to 0-255.
pub fn sepia(buffer: &mut RasterBuffer) {
    for px in buffer.pixels_mut().chunks_exact_mut(4) {
        let rgb = [px[0] as f32, px[1] as f32, px[2] as f32];
        for (out, row) in px[..3].iter_mut().zip(SEPIA_MATRIX.iter()) {
            let v = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
            *out = clamp_channel(v);
        }
    }
}

/// Replace every color channel `v` with `255 - v`.
pub fn invert(buffer: &mut RasterBuffer) {
    for px in buffer.pixels_mut().chunks_exact_mut(4) {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
}

/// Add `delta` to every color channel with saturation.
///
/// Negative deltas darken. The editor's brightness tool uses a fixed
/// positive delta from [`EditorConfig::brightness_delta`].
pub fn brightness(buffer: &mut RasterBuffer, delta: i16) {
    if delta == 0 {
        return;
    }
    for px in buffer.pixels_mut().chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = (*c as i16 + delta).clamp(0, 255) as u8;
        }
    }
}

/// Scale every color channel away from 128 by `factor`.
///
/// Formula: `output = (input - 128) * factor + 128`, rounded and clamped.
pub fn contrast(buffer: &mut RasterBuffer, factor: f32) {
    // The mapping depends only on the input value.
    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        *out = clamp_channel((v as f32 - CONTRAST_MIDPOINT) * factor + CONTRAST_MIDPOINT);
    }
    for px in buffer.pixels_mut().chunks_exact_mut(4) {
        px[0] = lut[px[0] as usize];
        px[1] = lut[px[1] as usize];
        px[2] = lut[px[2] as usize];
    }
}

#[inline]
fn clamp_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(r: u8, g: u8, b: u8, a: u8) -> RasterBuffer {
        RasterBuffer::filled(1, 1, [r, g, b, a])
    }

    fn first_pixel(buffer: &RasterBuffer) -> [u8; 4] {
        buffer.pixel(0, 0).unwrap()
    }

    // ===== Name Lookup Tests =====

    #[test]
    fn test_from_str_known_names() {
        for op in ColorOp::ALL {
            assert_eq!(op.name().parse::<ColorOp>(), Ok(op));
        }
    }

    #[test]
    fn test_from_str_unknown_name() {
        let err = "posterize".parse::<ColorOp>().unwrap_err();
        assert_eq!(err, UnknownColorOp("posterize".to_string()));
        assert_eq!(err.to_string(), "unknown color operation 'posterize'");
    }

    #[test]
    fn test_from_str_is_case_sensitive() {
        assert!("Grayscale".parse::<ColorOp>().is_err());
    }

    // ===== Grayscale Tests =====

    #[test]
    fn test_grayscale_red() {
        let mut buffer = RasterBuffer::filled(100, 100, [255, 0, 0, 255]);
        grayscale(&mut buffer);

        for px in buffer.pixels().chunks_exact(4) {
            assert_eq!(px, &[76, 76, 76, 255]);
        }
    }

    #[test]
    fn test_grayscale_keeps_alpha() {
        let mut buffer = single(10, 200, 30, 42);
        grayscale(&mut buffer);
        assert_eq!(first_pixel(&buffer)[3], 42);
    }

    // ===== Sepia Tests =====

    #[test]
    fn test_sepia_white_clamps() {
        let mut buffer = single(255, 255, 255, 255);
        sepia(&mut buffer);
        // Row sums: 1.351, 1.203, 0.937
        assert_eq!(first_pixel(&buffer), [255, 255, 239, 255]);
    }

    #[test]
    fn test_sepia_black_stays_black() {
        let mut buffer = single(0, 0, 0, 128);
        sepia(&mut buffer);
        assert_eq!(first_pixel(&buffer), [0, 0, 0, 128]);
    }

    #[test]
    fn test_sepia_mid_gray() {
        let mut buffer = single(100, 100, 100, 255);
        sepia(&mut buffer);
        // 135.1, 120.3, 93.7
        assert_eq!(first_pixel(&buffer), [135, 120, 94, 255]);
    }

    // ===== Invert Tests =====

    #[test]
    fn test_invert() {
        let mut buffer = single(0, 100, 255, 7);
        invert(&mut buffer);
        assert_eq!(first_pixel(&buffer), [255, 155, 0, 7]);
    }

    // ===== Brightness Tests =====

    #[test]
    fn test_brightness_adds_delta() {
        let mut buffer = single(10, 100, 200, 255);
        brightness(&mut buffer, 20);
        assert_eq!(first_pixel(&buffer), [30, 120, 220, 255]);
    }

    #[test]
    fn test_brightness_twice_adds_twice() {
        let mut buffer = single(10, 100, 200, 255);
        brightness(&mut buffer, 20);
        brightness(&mut buffer, 20);
        assert_eq!(first_pixel(&buffer), [50, 140, 240, 255]);
    }

    #[test]
    fn test_brightness_saturates() {
        let mut buffer = single(250, 5, 128, 255);
        brightness(&mut buffer, 20);
        assert_eq!(first_pixel(&buffer), [255, 25, 148, 255]);

        brightness(&mut buffer, -40);
        assert_eq!(first_pixel(&buffer), [215, 0, 108, 255]);
    }

    // ===== Contrast Tests =====

    #[test]
    fn test_contrast_midpoint_fixed() {
        let mut buffer = single(128, 128, 128, 255);
        contrast(&mut buffer, 1.2);
        assert_eq!(first_pixel(&buffer), [128, 128, 128, 255]);
    }

    #[test]
    fn test_contrast_spreads_values() {
        let mut buffer = single(28, 228, 0, 255);
        contrast(&mut buffer, 1.2);
        // (28-128)*1.2+128 = 8, (228-128)*1.2+128 = 248, (0-128)*1.2+128 = -25.6
        assert_eq!(first_pixel(&buffer), [8, 248, 0, 255]);
    }

    #[test]
    fn test_contrast_identity_factor() {
        let original = RasterBuffer::from_fn(16, 16, |x, y| [(x * 16) as u8, (y * 16) as u8, 77, 255]);
        let mut buffer = original.clone();
        contrast(&mut buffer, 1.0);
        assert_eq!(buffer, original);
    }

    // ===== Dispatch Tests =====

    #[test]
    fn test_apply_uses_config() {
        let config = EditorConfig {
            brightness_delta: 5,
            ..EditorConfig::default()
        };
        let mut buffer = single(10, 10, 10, 255);
        ColorOp::Brightness.apply(&mut buffer, &config);
        assert_eq!(first_pixel(&buffer), [15, 15, 15, 255]);
    }

    #[test]
    fn test_apply_is_deterministic() {
        let config = EditorConfig::default();
        let source = RasterBuffer::from_fn(8, 8, |x, y| [x as u8 * 30, y as u8 * 30, 90, 200]);
        for op in ColorOp::ALL {
            let mut a = source.clone();
            let mut b = source.clone();
            op.apply(&mut a, &config);
            op.apply(&mut b, &config);
            assert_eq!(a, b, "{op} should be deterministic");
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
