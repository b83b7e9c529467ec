//! Geometric operations: quarter-turn rotation, flips, crop and resample.
//!
//! Unlike the color filters in [`crate::pixel`], these may change buffer
//! dimensions, so each returns a new [`RasterBuffer`](crate::decode::RasterBuffer)
//! rather than mutating in place.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner
//! - Crop rectangles are in integer buffer pixels
//! - Rotation is clockwise, in 90 degree steps

mod crop;
mod orient;
mod scale;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::RasterBuffer;

pub use crop::{crop, CropRect};
pub use orient::{flip_horizontal, flip_vertical, rotate_clockwise_90};
pub use scale::{scale_to, FilterType, DEFAULT_MAX_PIXELS};

/// Errors from geometric operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The crop rectangle is empty or not fully inside the buffer.
    #[error("crop region {rect:?} is invalid for a {width}x{height} image")]
    InvalidRegion {
        rect: CropRect,
        width: u32,
        height: u32,
    },

    /// A resize target dimension is zero or the target is too large.
    #[error("invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Dimension-preserving or quarter-turn transforms addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    #[serde(rename = "rotate-clock")]
    RotateClockwise,
    #[serde(rename = "flip-h")]
    FlipHorizontal,
    #[serde(rename = "flip-v")]
    FlipVertical,
}

impl TransformKind {
    pub const ALL: [TransformKind; 3] = [
        TransformKind::RotateClockwise,
        TransformKind::FlipHorizontal,
        TransformKind::FlipVertical,
    ];

    /// Name used by the UI.
    pub fn name(self) -> &'static str {
        match self {
            TransformKind::RotateClockwise => "rotate-clock",
            TransformKind::FlipHorizontal => "flip-h",
            TransformKind::FlipVertical => "flip-v",
        }
    }

    /// Apply the transform, returning a new buffer.
    pub fn apply(self, buffer: &RasterBuffer) -> RasterBuffer {
        match self {
            TransformKind::RotateClockwise => rotate_clockwise_90(buffer),
            TransformKind::FlipHorizontal => flip_horizontal(buffer),
            TransformKind::FlipVertical => flip_vertical(buffer),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a transform name is not recognized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown transform '{0}'")]
pub struct UnknownTransform(pub String);

impl FromStr for TransformKind {
    type Err = UnknownTransform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownTransform(s.to_string()))
    }
}
