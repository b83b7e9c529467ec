//! Debounced compression-preview scheduling.
//!
//! Every parameter change calls [`PreviewScheduler::schedule`], which replaces
//! any pending request and pushes the deadline out by the debounce delay. The
//! caller polls from its own timer with the current time. Each request
//! carries a generation number; a result is only shown if its generation is
//! still current when it completes.
//!
//! Time is passed in explicitly as [`web_time::Instant`] so the scheduler is
//! deterministic in tests and works the same natively and in the browser.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::decode::RasterBuffer;
use crate::encode::ImageFormat;

/// What the preview should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub quality: u8,
    pub format: ImageFormat,
}

/// A request whose debounce delay has elapsed and should be rendered now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTicket {
    pub generation: u64,
    pub request: PreviewRequest,
}

/// A rendered comparison preview. Never written to the buffer or history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub generation: u64,
    pub request: PreviewRequest,
    /// The buffer after a round trip through the lossy encoder.
    pub buffer: RasterBuffer,
    /// Encoded size in bytes.
    pub encoded_size: usize,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    generation: u64,
    request: PreviewRequest,
}

/// At most one pending preview, replaced on every change.
#[derive(Debug, Clone)]
pub struct PreviewScheduler {
    delay: Duration,
    generation: u64,
    pending: Option<Pending>,
}

impl PreviewScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    /// Replace any pending request with `request`, due `delay` after `now`.
    ///
    /// Returns the new generation.
    pub fn schedule(&mut self, now: Instant, request: PreviewRequest) -> u64 {
        self.generation += 1;
        self.pending = Some(Pending {
            due: now + self.delay,
            generation: self.generation,
            request,
        });
        self.generation
    }

    /// Drop the pending request and invalidate any in-flight result.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    /// Take the pending request if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<PreviewTicket> {
        let pending = self.pending.filter(|p| now >= p.due)?;
        self.pending = None;
        Some(PreviewTicket {
            generation: pending.generation,
            request: pending.request,
        })
    }

    /// Whether a result for `generation` may still be displayed.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending request becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
