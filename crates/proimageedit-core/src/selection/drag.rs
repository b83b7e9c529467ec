//! Interactive crop-handle dragging.
//!
//! ```text
//!            begin (hit)              update
//!   Idle ─────────────────▶ Dragging ◀──────┐
//!    ▲                          │  └────────┘
//!    └──────────── end ─────────┘
//! ```
//!
//! All positions are buffer-space points; use
//! [`DisplayMapping::to_buffer`](super::DisplayMapping::to_buffer) to convert
//! pointer events first.

use serde::{Deserialize, Serialize};

use super::{BufferPoint, CropBounds};
use crate::transform::CropRect;

/// What part of the crop rectangle a drag grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    /// The interior; the whole rectangle moves.
    Move,
}

impl DragHandle {
    pub const CORNERS: [DragHandle; 4] = [
        DragHandle::TopLeft,
        DragHandle::TopRight,
        DragHandle::BottomLeft,
        DragHandle::BottomRight,
    ];

    fn corner_of(self, rect: &CropRect) -> Option<BufferPoint> {
        let left = rect.x as f64;
        let top = rect.y as f64;
        let right = rect.right() as f64;
        let bottom = rect.bottom() as f64;
        match self {
            DragHandle::TopLeft => Some(BufferPoint::new(left, top)),
            DragHandle::TopRight => Some(BufferPoint::new(right, top)),
            DragHandle::BottomLeft => Some(BufferPoint::new(left, bottom)),
            DragHandle::BottomRight => Some(BufferPoint::new(right, bottom)),
            DragHandle::Move => None,
        }
    }
}

/// Find the handle under `point`.
///
/// Corners win over the interior. `tolerance` is the hit radius on each axis
/// in buffer pixels (see [`DisplayMapping::tolerance`](super::DisplayMapping::tolerance)).
pub fn hit_test(rect: &CropRect, point: BufferPoint, tolerance: (f64, f64)) -> Option<DragHandle> {
    let (tol_x, tol_y) = tolerance;
    let corner = DragHandle::CORNERS.into_iter().find(|handle| {
        handle.corner_of(rect).is_some_and(|c| {
            (point.x - c.x).abs() <= tol_x && (point.y - c.y).abs() <= tol_y
        })
    });
    if corner.is_some() {
        return corner;
    }

    let inside = point.x >= rect.x as f64
        && point.x < rect.right() as f64
        && point.y >= rect.y as f64
        && point.y < rect.bottom() as f64;
    inside.then_some(DragHandle::Move)
}

/// Drag state machine for the crop overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CropDrag {
    #[default]
    Idle,
    Dragging {
        handle: DragHandle,
        anchor: BufferPoint,
        start_rect: CropRect,
    },
}

impl CropDrag {
    /// Start a drag if `point` hits a handle of `rect`.
    ///
    /// The start rectangle is clamped to `bounds` first, so a stale rectangle
    /// is repaired by the first drag. Returns the grabbed handle, or `None`
    /// (staying idle) on a miss.
    pub fn begin(
        &mut self,
        point: BufferPoint,
        rect: &CropRect,
        bounds: &CropBounds,
        tolerance: (f64, f64),
    ) -> Option<DragHandle> {
        let start_rect = bounds.clamp(*rect);
        let handle = hit_test(&start_rect, point, tolerance)?;
        *self = CropDrag::Dragging {
            handle,
            anchor: point,
            start_rect,
        };
        Some(handle)
    }

    /// Rectangle for the pointer now at `point`, or `None` when idle.
    pub fn update(&self, point: BufferPoint, bounds: &CropBounds) -> Option<CropRect> {
        let CropDrag::Dragging {
            handle,
            anchor,
            start_rect,
        } = *self
        else {
            return None;
        };

        let dx = point.x - anchor.x;
        let dy = point.y - anchor.y;
        if !dx.is_finite() || !dy.is_finite() {
            return Some(start_rect);
        }

        let bw = bounds.width as f64;
        let bh = bounds.height as f64;
        let min_w = bounds.min_width as f64;
        let min_h = bounds.min_height as f64;

        let mut left = start_rect.x as f64;
        let mut top = start_rect.y as f64;
        let mut right = start_rect.right() as f64;
        let mut bottom = start_rect.bottom() as f64;

        match handle {
            DragHandle::Move => {
                let w = right - left;
                let h = bottom - top;
                left = clamp_between(left + dx, 0.0, bw - w);
                top = clamp_between(top + dy, 0.0, bh - h);
                right = left + w;
                bottom = top + h;
            }
            DragHandle::TopLeft
            | DragHandle::TopRight
            | DragHandle::BottomLeft
            | DragHandle::BottomRight => {
                if matches!(handle, DragHandle::TopLeft | DragHandle::BottomLeft) {
                    left = clamp_between(left + dx, 0.0, right - min_w);
                } else {
                    right = clamp_between(right + dx, left + min_w, bw);
                }
                if matches!(handle, DragHandle::TopLeft | DragHandle::TopRight) {
                    top = clamp_between(top + dy, 0.0, bottom - min_h);
                } else {
                    bottom = clamp_between(bottom + dy, top + min_h, bh);
                }
            }
        }

        let x = left.round() as u32;
        let y = top.round() as u32;
        let rect = CropRect {
            x,
            y,
            width: (right.round() as u32).saturating_sub(x),
            height: (bottom.round() as u32).saturating_sub(y),
        };
        Some(bounds.clamp(rect))
    }

    /// Finish the drag, returning the handle that was held.
    pub fn end(&mut self) -> Option<DragHandle> {
        match std::mem::take(self) {
            CropDrag::Dragging { handle, .. } => Some(handle),
            CropDrag::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, CropDrag::Dragging { .. })
    }

    /// The handle currently held, if any.
    pub fn handle(&self) -> Option<DragHandle> {
        match self {
            CropDrag::Dragging { handle, .. } => Some(*handle),
            CropDrag::Idle => None,
        }
    }
}

/// `v.clamp(lo, hi)` that tolerates `lo > hi` by preferring `lo`.
#[inline]
fn clamp_between(v: f64, lo: f64, hi: f64) -> f64 {
    v.min(hi).max(lo)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::selection::CropRectangle;
    use proptest::prelude::*;

    proptest! {
        /// Property: any drag keeps the rectangle within bounds.
        #[test]
        fn prop_drag_stays_in_bounds(
            bw in 20u32..=400,
            bh in 20u32..=400,
            sx in 0.0f64..400.0,
            sy in 0.0f64..400.0,
            ex in -800.0f64..800.0,
            ey in -800.0f64..800.0,
        ) {
            let bounds = CropBounds::new(bw, bh, 20);
            let rect = CropRectangle::for_image(bw, bh, 0.8, 20).rect;
            let mut drag = CropDrag::Idle;
            if drag.begin(BufferPoint::new(sx, sy), &rect, &bounds, (12.0, 12.0)).is_some() {
                let out = drag.update(BufferPoint::new(ex, ey), &bounds).unwrap();
                prop_assert!(bounds.contains(&out), "{:?} in {:?}", out, bounds);
            }
        }
    }
}
