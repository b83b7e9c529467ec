//! Display-to-buffer coordinate mapping.
//!
//! The canvas is usually shown scaled (CSS `max-width` / `max-height`), so a
//! pointer position in display pixels has to be multiplied by
//! `buffer / display` on each axis before it can drive the crop rectangle.

use serde::{Deserialize, Serialize};

/// A point in buffer pixel space. Fractional values are allowed while
/// dragging; they are rounded when written into a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BufferPoint {
    pub x: f64,
    pub y: f64,
}

impl BufferPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How the buffer is laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMapping {
    /// Left edge of the displayed canvas, in display pixels.
    pub origin_x: f64,
    /// Top edge of the displayed canvas, in display pixels.
    pub origin_y: f64,
    pub display_width: f64,
    pub display_height: f64,
    pub buffer_width: u32,
    pub buffer_height: u32,
}

impl DisplayMapping {
    /// Mapping for a canvas whose top-left corner is at the origin.
    ///
    /// Returns `None` if a display extent is not a positive finite number.
    pub fn new(
        buffer_width: u32,
        buffer_height: u32,
        display_width: f64,
        display_height: f64,
    ) -> Option<Self> {
        Self::with_origin(buffer_width, buffer_height, 0.0, 0.0, display_width, display_height)
    }

    /// Mapping for a canvas whose bounding box starts at `(origin_x, origin_y)`.
    pub fn with_origin(
        buffer_width: u32,
        buffer_height: u32,
        origin_x: f64,
        origin_y: f64,
        display_width: f64,
        display_height: f64,
    ) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(display_width) || !valid(display_height) {
            return None;
        }
        if !origin_x.is_finite() || !origin_y.is_finite() {
            return None;
        }
        Some(Self {
            origin_x,
            origin_y,
            display_width,
            display_height,
            buffer_width,
            buffer_height,
        })
    }

    /// Mapping where one display pixel is one buffer pixel.
    pub fn identity(buffer_width: u32, buffer_height: u32) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            display_width: buffer_width.max(1) as f64,
            display_height: buffer_height.max(1) as f64,
            buffer_width,
            buffer_height,
        }
    }

    /// Buffer pixels per display pixel, horizontally.
    #[inline]
    pub fn scale_x(&self) -> f64 {
        self.buffer_width as f64 / self.display_width
    }

    /// Buffer pixels per display pixel, vertically.
    #[inline]
    pub fn scale_y(&self) -> f64 {
        self.buffer_height as f64 / self.display_height
    }

    /// Convert a pointer position in display space to buffer space.
    pub fn to_buffer(&self, display_x: f64, display_y: f64) -> BufferPoint {
        BufferPoint {
            x: (display_x - self.origin_x) * self.scale_x(),
            y: (display_y - self.origin_y) * self.scale_y(),
        }
    }

    /// A display-space distance expressed in buffer pixels on each axis.
    pub fn tolerance(&self, display_pixels: f64) -> (f64, f64) {
        (display_pixels * self.scale_x(), display_pixels * self.scale_y())
    }
}
