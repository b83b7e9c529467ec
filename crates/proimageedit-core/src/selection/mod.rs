//! Pending crop selection.
//!
//! The crop rectangle is edited in three ways: direct numeric input, aspect
//! ratio presets, and interactive handle dragging (see [`CropDrag`]). All
//! three end in [`CropBounds::clamp`], which enforces:
//!
//! - the rectangle lies inside the buffer
//! - each extent is at least the minimum size, or the buffer extent when the
//!   buffer itself is smaller than the minimum
//!
//! Rectangles are only clamped when edited. After a crop or resize changes
//! the buffer, the stored rectangle may be stale until the next edit or
//! image load; [`crate::transform::crop`] rejects it in that case.

mod drag;
mod mapper;

use serde::{Deserialize, Serialize};

use crate::transform::CropRect;

pub use drag::{hit_test, CropDrag, DragHandle};
pub use mapper::{BufferPoint, DisplayMapping};

/// Limits a crop rectangle must satisfy for a given buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBounds {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl CropBounds {
    /// Bounds for a `width x height` buffer with the configured minimum.
    pub fn new(width: u32, height: u32, min_size: u32) -> Self {
        let min_size = min_size.max(1);
        Self {
            width,
            height,
            min_width: min_size.min(width),
            min_height: min_size.min(height),
        }
    }

    /// Force `rect` inside the bounds, shrinking or growing extents first and
    /// then shifting the origin.
    pub fn clamp(&self, rect: CropRect) -> CropRect {
        let width = rect.width.clamp(self.min_width, self.width);
        let height = rect.height.clamp(self.min_height, self.height);
        CropRect {
            x: rect.x.min(self.width - width),
            y: rect.y.min(self.height - height),
            width,
            height,
        }
    }

    /// Whether `rect` already satisfies every bound.
    pub fn contains(&self, rect: &CropRect) -> bool {
        rect.width >= self.min_width
            && rect.height >= self.min_height
            && rect.fits_within(self.width, self.height)
    }
}

/// Aspect ratio presets offered by the crop panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectPreset {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    FourThree,
    #[serde(rename = "16:9")]
    SixteenNine,
    #[serde(rename = "free")]
    Free,
}

impl AspectPreset {
    /// Width over height, or `None` for [`AspectPreset::Free`].
    pub fn ratio(self) -> Option<f64> {
        match self {
            AspectPreset::Square => Some(1.0),
            AspectPreset::FourThree => Some(4.0 / 3.0),
            AspectPreset::SixteenNine => Some(16.0 / 9.0),
            AspectPreset::Free => None,
        }
    }
}

/// A numeric field of the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropField {
    X,
    Y,
    Width,
    Height,
}

/// The crop rectangle plus whether an image backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropRectangle {
    pub rect: CropRect,
    pub image_set: bool,
}

impl CropRectangle {
    /// Centered default covering `fraction` of each axis.
    ///
    /// With the default fraction of 0.8, a 1000x500 buffer gets
    /// `{x: 100, y: 50, width: 800, height: 400}`.
    pub fn for_image(width: u32, height: u32, fraction: f64, min_size: u32) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        let rect = CropRect {
            x: (width as f64 * (1.0 - fraction) / 2.0).round() as u32,
            y: (height as f64 * (1.0 - fraction) / 2.0).round() as u32,
            width: (width as f64 * fraction).round() as u32,
            height: (height as f64 * fraction).round() as u32,
        };
        Self {
            rect: CropBounds::new(width, height, min_size).clamp(rect),
            image_set: true,
        }
    }

    /// Set one numeric field, then clamp.
    pub fn set_field(&mut self, field: CropField, value: u32, bounds: &CropBounds) {
        let mut rect = self.rect;
        match field {
            CropField::X => rect.x = value,
            CropField::Y => rect.y = value,
            CropField::Width => rect.width = value,
            CropField::Height => rect.height = value,
        }
        self.rect = bounds.clamp(rect);
    }

    /// Reshape the rectangle to an aspect preset, keeping its origin.
    ///
    /// Ratio presets derive the height from the width. When that runs past
    /// the bottom edge, the height is cut to fit and the width re-derived.
    /// `fraction` is the default-crop fraction used by `Free`.
    pub fn apply_preset(&mut self, preset: AspectPreset, bounds: &CropBounds, fraction: f64) {
        let mut width = self.rect.width as f64;
        let mut height = self.rect.height as f64;
        let y = self.rect.y as f64;

        match preset {
            AspectPreset::Square => {
                let size = width.min(height);
                width = size;
                height = size;
            }
            AspectPreset::FourThree | AspectPreset::SixteenNine => {
                let ratio = preset.ratio().unwrap_or(1.0);
                height = width / ratio;
                if y + height > bounds.height as f64 {
                    height = bounds.height as f64 - y;
                    width = height * ratio;
                }
            }
            AspectPreset::Free => {
                width = bounds.width as f64 * fraction;
                height = bounds.height as f64 * fraction;
            }
        }

        self.rect = bounds.clamp(CropRect {
            width: width.round().max(0.0) as u32,
            height: height.round().max(0.0) as u32,
            ..self.rect
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(w: u32, h: u32) -> CropBounds {
        CropBounds::new(w, h, 20)
    }

    #[test]
    fn test_default_is_centered_eighty_percent() {
        let crop = CropRectangle::for_image(1000, 500, 0.8, 20);
        assert!(crop.image_set);
        assert_eq!(crop.rect, CropRect::new(100, 50, 800, 400));
    }

    #[test]
    fn test_default_on_tiny_image_respects_minimum() {
        let crop = CropRectangle::for_image(22, 10, 0.8, 20);
        assert_eq!(crop.rect.width, 20);
        assert_eq!(crop.rect.height, 10);
        assert!(crop.rect.fits_within(22, 10));
    }

    #[test]
    fn test_bounds_effective_minimum() {
        let b = CropBounds::new(10, 100, 20);
        assert_eq!(b.min_width, 10);
        assert_eq!(b.min_height, 20);
    }

    #[test]
    fn test_clamp_shifts_origin_inside() {
        let clamped = bounds(100, 100).clamp(CropRect::new(90, 95, 50, 30));
        assert_eq!(clamped, CropRect::new(50, 70, 50, 30));
    }

    #[test]
    fn test_clamp_enforces_minimum_and_maximum() {
        let b = bounds(100, 100);
        assert_eq!(b.clamp(CropRect::new(0, 0, 5, 500)), CropRect::new(0, 0, 20, 100));
    }

    #[test]
    fn test_set_field() {
        let b = bounds(200, 100);
        let mut crop = CropRectangle::for_image(200, 100, 0.8, 20);

        crop.set_field(CropField::Width, 10, &b);
        assert_eq!(crop.rect.width, 20);

        crop.set_field(CropField::X, 500, &b);
        assert_eq!(crop.rect.x, 180);

        crop.set_field(CropField::Height, 60, &b);
        assert_eq!(crop.rect.height, 60);
        assert!(b.contains(&crop.rect));
    }

    #[test]
    fn test_preset_square() {
        let b = bounds(400, 300);
        let mut crop = CropRectangle {
            rect: CropRect::new(10, 10, 200, 120),
            image_set: true,
        };
        crop.apply_preset(AspectPreset::Square, &b, 0.8);
        assert_eq!(crop.rect, CropRect::new(10, 10, 120, 120));
    }

    #[test]
    fn test_preset_four_three() {
        let b = bounds(400, 300);
        let mut crop = CropRectangle {
            rect: CropRect::new(0, 0, 200, 50),
            image_set: true,
        };
        crop.apply_preset(AspectPreset::FourThree, &b, 0.8);
        assert_eq!(crop.rect, CropRect::new(0, 0, 200, 150));
    }

    #[test]
    fn test_preset_sixteen_nine_overflow_rederives_width() {
        let b = bounds(400, 300);
        let mut crop = CropRectangle {
            rect: CropRect::new(0, 210, 320, 50),
            image_set: true,
        };
        // 320 * 9/16 = 180 overflows 300 - 210 = 90, so height 90, width 160
        crop.apply_preset(AspectPreset::SixteenNine, &b, 0.8);
        assert_eq!(crop.rect, CropRect::new(0, 210, 160, 90));
    }

    #[test]
    fn test_preset_free_resets_extent() {
        let b = bounds(400, 300);
        let mut crop = CropRectangle {
            rect: CropRect::new(5, 5, 30, 30),
            image_set: true,
        };
        crop.apply_preset(AspectPreset::Free, &b, 0.8);
        // 320 wide from x=5 fits; 240 tall from y=5 fits
        assert_eq!(crop.rect, CropRect::new(5, 5, 320, 240));
    }

    #[test]
    fn test_preset_serde_names() {
        assert_eq!(serde_json::to_string(&AspectPreset::FourThree).unwrap(), "\"4:3\"");
        let parsed: AspectPreset = serde_json::from_str("\"16:9\"").unwrap();
        assert_eq!(parsed, AspectPreset::SixteenNine);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: clamping always yields a rectangle within bounds.
        #[test]
        fn prop_clamp_satisfies_bounds(
            bw in 1u32..=500,
            bh in 1u32..=500,
            min in 1u32..=40,
            x in 0u32..=1000,
            y in 0u32..=1000,
            w in 0u32..=1000,
            h in 0u32..=1000,
        ) {
            let b = CropBounds::new(bw, bh, min);
            let clamped = b.clamp(CropRect::new(x, y, w, h));
            prop_assert!(b.contains(&clamped), "{:?} vs {:?}", clamped, b);
        }

        /// Property: presets always leave the rectangle within bounds.
        #[test]
        fn prop_presets_stay_in_bounds(
            bw in 1u32..=400,
            bh in 1u32..=400,
            preset in prop::sample::select(vec![
                AspectPreset::Square,
                AspectPreset::FourThree,
                AspectPreset::SixteenNine,
                AspectPreset::Free,
            ]),
        ) {
            let b = CropBounds::new(bw, bh, 20);
            let mut crop = CropRectangle::for_image(bw, bh, 0.8, 20);
            crop.apply_preset(preset, &b, 0.8);
            prop_assert!(b.contains(&crop.rect));
        }
    }
}
