//! Luminance calculation using ITU-R BT.601 coefficients.
//!
//! The grayscale filter uses these weights, matching the values browsers
//! and most web editors use for 8-bit sRGB data.

/// ITU-R BT.601 coefficient for red channel in luminance calculation.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 coefficient for green channel in luminance calculation.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 coefficient for blue channel in luminance calculation.
pub const LUMINANCE_B: f32 = 0.114;

/// Luminance of an 8-bit pixel, rounded to the nearest level.
#[inline]
pub fn calculate_luminance_u8(r: u8, g: u8, b: u8) -> u8 {
    let lum = LUMINANCE_R * r as f32 + LUMINANCE_G * g as f32 + LUMINANCE_B * b as f32;
    lum.clamp(0.0, 255.0).round() as u8
}
