//! Pending tool parameters for resize and compression.
//!
//! These are UI state: they only touch the image when the matching tool is
//! applied through the session.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::encode::ImageFormat;

/// Percentages offered by the "scale by" buttons.
pub const SCALE_PERCENTAGES: [u32; 5] = [25, 50, 75, 100, 200];

/// Fixed-size resize presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizePreset {
    /// 1920x1080
    FullHd,
    /// 1080x1080
    Instagram,
    /// 3508x2480, A4 at 300 dpi in landscape
    A4At300Dpi,
}

impl ResizePreset {
    pub const ALL: [ResizePreset; 3] = [
        ResizePreset::FullHd,
        ResizePreset::Instagram,
        ResizePreset::A4At300Dpi,
    ];

    /// Target `(width, height)`.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            ResizePreset::FullHd => (1920, 1080),
            ResizePreset::Instagram => (1080, 1080),
            ResizePreset::A4At300Dpi => (3508, 2480),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResizePreset::FullHd => "Full HD",
            ResizePreset::Instagram => "Instagram",
            ResizePreset::A4At300Dpi => "A4 (300dpi)",
        }
    }
}

/// Target dimensions for the resize tool.
///
/// With the aspect lock on, editing one field re-derives the other from
/// `original_ratio` (width / height), which is fixed when the image loads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeParameters {
    pub width: u32,
    pub height: u32,
    pub lock_aspect_ratio: bool,
    pub original_ratio: f64,
}

impl Default for ResizeParameters {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            lock_aspect_ratio: true,
            original_ratio: 1.0,
        }
    }
}

impl ResizeParameters {
    /// Parameters for a freshly loaded `width x height` image.
    pub fn for_image(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            lock_aspect_ratio: true,
            original_ratio: width as f64 / height.max(1) as f64,
        }
    }

    /// Set the width; with the lock on, `height = round(width / ratio)`.
    pub fn set_width(&mut self, width: u32) {
        self.width = width;
        if self.lock_aspect_ratio && self.ratio_is_usable() {
            self.height = to_dimension(width as f64 / self.original_ratio);
        }
    }

    /// Set the height; with the lock on, `width = round(height * ratio)`.
    pub fn set_height(&mut self, height: u32) {
        self.height = height;
        if self.lock_aspect_ratio && self.ratio_is_usable() {
            self.width = to_dimension(height as f64 * self.original_ratio);
        }
    }

    /// Flip the aspect lock. Dimensions are left as they are.
    pub fn toggle_lock(&mut self) {
        self.lock_aspect_ratio = !self.lock_aspect_ratio;
    }

    /// Set both fields to `percent`% of the current buffer size.
    pub fn scale_by_percent(&mut self, percent: u32, current_width: u32, current_height: u32) {
        let factor = percent as f64 / 100.0;
        self.width = to_dimension(current_width as f64 * factor);
        self.height = to_dimension(current_height as f64 * factor);
    }

    /// Set both fields from a preset, ignoring the aspect lock.
    pub fn apply_preset(&mut self, preset: ResizePreset) {
        let (width, height) = preset.dimensions();
        self.width = width;
        self.height = height;
    }

    /// Whether the target can be handed to the resampler.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    fn ratio_is_usable(&self) -> bool {
        self.original_ratio.is_finite() && self.original_ratio > 0.0
    }
}

fn to_dimension(v: f64) -> u32 {
    v.round().clamp(0.0, u32::MAX as f64) as u32
}

/// Pending settings for the compress tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionParameters {
    quality: u8,
    pub format: ImageFormat,
    pub show_comparison: bool,
}

impl Default for CompressionParameters {
    fn default() -> Self {
        Self {
            quality: 80,
            format: ImageFormat::Jpeg,
            show_comparison: false,
        }
    }
}

impl CompressionParameters {
    /// Defaults taken from `config`.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            quality: config.default_quality.clamp(1, 100),
            format: config.default_format,
            show_comparison: false,
        }
    }

    /// Quality in 1-100.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Set the quality, clamped to 1-100.
    pub fn set_quality(&mut self, quality: u32) {
        self.quality = quality.clamp(1, 100) as u8;
    }
}

/// Tool panel currently open in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTool {
    Filters,
    Adjust,
    Crop,
    Resize,
    Rotate,
    Flip,
    Compress,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked(ratio: f64) -> ResizeParameters {
        ResizeParameters {
            width: 0,
            height: 0,
            lock_aspect_ratio: true,
            original_ratio: ratio,
        }
    }

    #[test]
    fn test_for_image() {
        let params = ResizeParameters::for_image(1600, 900);
        assert_eq!((params.width, params.height), (1600, 900));
        assert!(params.lock_aspect_ratio);
        assert!((params.original_ratio - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_locked_width_drives_height() {
        let mut params = locked(2.0);
        params.set_width(800);
        assert_eq!((params.width, params.height), (800, 400));
    }

    #[test]
    fn test_locked_height_drives_width() {
        let mut params = locked(2.0);
        params.set_height(300);
        assert_eq!((params.width, params.height), (600, 300));
    }

    #[test]
    fn test_locked_rounds() {
        let mut params = ResizeParameters::for_image(1000, 300);
        params.set_width(500);
        // 500 / 3.333.. = 150
        assert_eq!(params.height, 150);
        params.set_width(101);
        // 30.3 rounds to 30
        assert_eq!(params.height, 30);
    }

    #[test]
    fn test_unlocked_fields_are_independent() {
        let mut params = ResizeParameters::for_image(400, 200);
        params.toggle_lock();
        assert!(!params.lock_aspect_ratio);
        params.set_width(100);
        assert_eq!((params.width, params.height), (100, 200));
        params.set_height(50);
        assert_eq!((params.width, params.height), (100, 50));
    }

    #[test]
    fn test_toggle_lock_keeps_dimensions() {
        let mut params = ResizeParameters::for_image(400, 200);
        params.toggle_lock();
        params.toggle_lock();
        assert!(params.lock_aspect_ratio);
        assert_eq!((params.width, params.height), (400, 200));
    }

    #[test]
    fn test_scale_by_percent() {
        let mut params = ResizeParameters::for_image(1000, 750);
        params.scale_by_percent(25, 1000, 750);
        assert_eq!((params.width, params.height), (250, 188));
        params.scale_by_percent(200, 1000, 750);
        assert_eq!((params.width, params.height), (2000, 1500));
    }

    #[test]
    fn test_preset_ignores_lock() {
        let mut params = ResizeParameters::for_image(1000, 750);
        params.apply_preset(ResizePreset::FullHd);
        assert_eq!((params.width, params.height), (1920, 1080));
        params.apply_preset(ResizePreset::A4At300Dpi);
        assert_eq!((params.width, params.height), (3508, 2480));
    }

    #[test]
    fn test_zero_is_invalid() {
        let mut params = ResizeParameters::for_image(10, 10);
        assert!(params.is_valid());
        params.set_width(0);
        assert!(!params.is_valid());
    }

    #[test]
    fn test_compression_defaults() {
        let params = CompressionParameters::default();
        assert_eq!(params.quality(), 80);
        assert_eq!(params.format, ImageFormat::Jpeg);
        assert!(!params.show_comparison);
        assert_eq!(CompressionParameters::from_config(&EditorConfig::default()), params);
    }

    #[test]
    fn test_compression_quality_clamped() {
        let mut params = CompressionParameters::default();
        params.set_quality(0);
        assert_eq!(params.quality(), 1);
        params.set_quality(150);
        assert_eq!(params.quality(), 100);
        params.set_quality(55);
        assert_eq!(params.quality(), 55);
    }

    #[test]
    fn test_resize_params_json_shape() {
        let json = serde_json::to_value(ResizeParameters::for_image(4, 2)).unwrap();
        assert_eq!(json["lockAspectRatio"], true);
        assert_eq!(json["originalRatio"], 2.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
