//! ProImageEdit Core - Image editing engine
//!
//! This crate provides the editing core behind ProImageEdit: decoding uploads
//! into RGBA buffers, color filters, geometric transforms, crop selection,
//! the snapshot-based undo/redo history and export encoding. The WASM crate
//! wraps [`EditSession`] for the browser.

pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod history;
pub mod luminance;
pub mod params;
pub mod pixel;
pub mod preview;
pub mod selection;
pub mod session;
pub mod store;
pub mod transform;

pub use codec::{ImageCodec, StandardCodec};
pub use config::{ConfigError, EditorConfig};
pub use decode::{decode_image, DecodeError, RasterBuffer};
pub use encode::{encode_image, EncodeError, ExportOutcome, ExportedFile, ImageFormat};
pub use history::{EditHistory, HistoryPosition, Snapshot};
pub use params::{ActiveTool, CompressionParameters, ResizeParameters, ResizePreset};
pub use pixel::ColorOp;
pub use preview::{PreviewImage, PreviewRequest, PreviewScheduler};
pub use selection::{AspectPreset, CropDrag, CropField, CropRectangle, DisplayMapping, DragHandle};
pub use session::{EditError, EditResult, EditSession, SessionEvent, SessionObserver};
pub use store::{MemorySnapshotStore, SnapshotStore, StoreError};
pub use transform::{CropRect, FilterType, TransformKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names_are_distinct() {
        let mut names: Vec<&str> = ColorOp::ALL
            .iter()
            .map(|op| op.name())
            .chain(TransformKind::ALL.iter().map(|t| t.name()))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_edit_pipeline_through_public_api() {
        let source = RasterBuffer::from_fn(40, 20, |x, _| [x as u8 * 6, 100, 200, 255]);
        let png = encode_image(&source, ImageFormat::Png, 100).unwrap();

        let mut session = EditSession::default();
        session.load_image(&png).unwrap();
        session.apply_transform_kind(TransformKind::RotateClockwise).unwrap();
        session.apply_color(ColorOp::Invert).unwrap();
        assert_eq!(session.dimensions(), Some((20, 40)));

        let exported = session.export().unwrap();
        let decoded = decode_image(&exported.bytes).unwrap();
        assert_eq!(&decoded, session.buffer().unwrap());
    }
}
