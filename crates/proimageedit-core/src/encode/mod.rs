//! Image encoding for ProImageEdit.
//!
//! This module provides functionality for:
//! - Encoding buffers to PNG (lossless snapshots) and JPEG (lossy, quality 1-100)
//! - Producing the final downloadable export
//! - Building upload payloads for the remote store
//!
//! # Examples
//!
//! ```ignore
//! use proimageedit_core::decode::RasterBuffer;
//! use proimageedit_core::encode::{encode_image, ImageFormat};
//!
//! let buffer = RasterBuffer::filled(100, 100, [128, 128, 128, 255]);
//! let jpeg_bytes = encode_image(&buffer, ImageFormat::Jpeg, 90).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod codec;
mod export;

pub use codec::{encode_image, encode_jpeg, encode_png, EncodeError, ImageFormat};
pub use export::{
    export_buffer, export_filename, ExportOutcome, ExportedFile, RemoteUploader, UploadError,
    UploadRequest, EXPORT_BASENAME,
};
