//! Injectable image codec.
//!
//! The session never calls the decoder or encoder directly; it goes through
//! an [`ImageCodec`] so tests and hosts can substitute their own.

use crate::decode::{decode_image, decode_image_no_orientation, DecodeError, RasterBuffer};
use crate::encode::{encode_image, EncodeError, ImageFormat};
use crate::history::Snapshot;

pub trait ImageCodec {
    /// Decode PNG or JPEG bytes into an RGBA buffer.
    fn decode(&self, bytes: &[u8]) -> Result<RasterBuffer, DecodeError>;

    /// Encode a buffer. `quality` (1-100) only applies to lossy formats.
    fn encode(
        &self,
        buffer: &RasterBuffer,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError>;

    /// Lossless history snapshot of `buffer`.
    fn snapshot(&self, buffer: &RasterBuffer) -> Result<Snapshot, EncodeError> {
        self.encode(buffer, ImageFormat::Png, 100).map(Snapshot::new)
    }

    /// Decode a snapshot produced by [`ImageCodec::snapshot`].
    fn restore_snapshot(&self, snapshot: &Snapshot) -> Result<RasterBuffer, DecodeError> {
        self.decode(snapshot.bytes())
    }
}

/// The `image`-crate backed codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl ImageCodec for StandardCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RasterBuffer, DecodeError> {
        decode_image(bytes)
    }

    fn encode(
        &self,
        buffer: &RasterBuffer,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError> {
        encode_image(buffer, format, quality)
    }

    fn restore_snapshot(&self, snapshot: &Snapshot) -> Result<RasterBuffer, DecodeError> {
        decode_image_no_orientation(snapshot.bytes())
    }
}
