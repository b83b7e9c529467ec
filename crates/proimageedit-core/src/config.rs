//! Editor tunables.
//!
//! Every field has a default, so a partial JSON object only overrides what it
//! names. Unknown keys are ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::ImageFormat;
use crate::transform::{FilterType, DEFAULT_MAX_PIXELS};

/// Error returned when configuration JSON cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid editor configuration: {0}")]
pub struct ConfigError(#[from] serde_json::Error);

/// Tunables for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Smallest crop extent on either axis, in buffer pixels.
    pub min_crop_size: u32,
    /// Fraction of the buffer covered by the default crop rectangle.
    pub crop_default_fraction: f64,
    /// Handle hit radius in display pixels.
    pub handle_tolerance: f64,
    /// Delay between the last compression-parameter change and the preview.
    pub preview_debounce_ms: u64,
    /// Delta added by the brightness filter.
    pub brightness_delta: i16,
    /// Factor used by the contrast filter.
    pub contrast_factor: f32,
    /// Resampling filter used by resize.
    pub resize_filter: FilterType,
    /// Largest resize target, in pixels.
    pub max_pixels: u64,
    /// Initial compression quality (1-100).
    pub default_quality: u8,
    /// Initial compression format.
    pub default_format: ImageFormat,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_crop_size: 20,
            crop_default_fraction: 0.8,
            handle_tolerance: 12.0,
            preview_debounce_ms: 50,
            brightness_delta: 20,
            contrast_factor: 1.2,
            resize_filter: FilterType::Bilinear,
            max_pixels: DEFAULT_MAX_PIXELS,
            default_quality: 80,
            default_format: ImageFormat::Jpeg,
        }
    }
}

impl EditorConfig {
    /// Parse configuration JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text is not valid JSON or a field has
    /// the wrong type.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Parse configuration JSON, falling back to defaults on error.
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|err| {
            tracing::warn!(?err, "failed to parse editor config; using defaults");
            Self::default()
        })
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The preview debounce delay.
    pub fn preview_delay(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }

    /// Clamp values that would break session invariants.
    fn normalized(mut self) -> Self {
        self.min_crop_size = self.min_crop_size.max(1);
        if !(self.crop_default_fraction > 0.0 && self.crop_default_fraction <= 1.0) {
            tracing::warn!(
                fraction = self.crop_default_fraction,
                "crop_default_fraction out of range; using 0.8"
            );
            self.crop_default_fraction = 0.8;
        }
        if !self.handle_tolerance.is_finite() || self.handle_tolerance < 0.0 {
            self.handle_tolerance = 12.0;
        }
        if !self.contrast_factor.is_finite() {
            self.contrast_factor = 1.2;
        }
        self.max_pixels = self.max_pixels.max(1);
        self.default_quality = self.default_quality.clamp(1, 100);
        self
    }
}
