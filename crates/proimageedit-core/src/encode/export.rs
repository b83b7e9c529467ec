//! Final-file export and the remote upload seam.
//!
//! Exports are named `edited-image.<ext>`. Uploads use a timestamped name
//! (`edited-image-<millis>.<ext>`) so repeated saves do not collide in the
//! remote store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{encode_image, EncodeError, ImageFormat};
use crate::decode::RasterBuffer;

/// Base name for exported files.
pub const EXPORT_BASENAME: &str = "edited-image";

/// A finished export ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub filename: String,
    pub format: ImageFormat,
    pub quality: u8,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// MIME type of the encoded bytes.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Download filename for a format, e.g. `edited-image.jpeg`.
pub fn export_filename(format: ImageFormat) -> String {
    format!("{EXPORT_BASENAME}.{}", format.extension())
}

/// Encode the final buffer for download.
pub fn export_buffer(
    buffer: &RasterBuffer,
    format: ImageFormat,
    quality: u8,
) -> Result<ExportedFile, EncodeError> {
    let quality = quality.clamp(1, 100);
    let bytes = encode_image(buffer, format, quality)?;
    Ok(ExportedFile {
        filename: export_filename(format),
        format,
        quality,
        bytes,
    })
}

/// Payload for the authenticated upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    /// Build the upload payload for an export taken at `timestamp_ms`.
    pub fn from_export(file: &ExportedFile, timestamp_ms: u64) -> Self {
        Self {
            filename: format!(
                "{EXPORT_BASENAME}-{timestamp_ms}.{}",
                file.format.extension()
            ),
            content_type: file.mime_type().to_string(),
            bytes: file.bytes.clone(),
        }
    }
}

/// Failures reported by a remote uploader.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("upload transport failed: {0}")]
    Transport(String),
}

/// Remote persistence collaborator. Returns the stored object URL.
pub trait RemoteUploader {
    fn upload(&mut self, request: &UploadRequest) -> Result<String, UploadError>;
}

impl<F> RemoteUploader for F
where
    F: FnMut(&UploadRequest) -> Result<String, UploadError>,
{
    fn upload(&mut self, request: &UploadRequest) -> Result<String, UploadError> {
        self(request)
    }
}

/// Result of exporting and uploading in one step.
///
/// The export itself succeeded; the upload outcome is carried separately so
/// a failed upload never hides the downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub file: ExportedFile,
    pub upload: Result<String, UploadError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename(ImageFormat::Png), "edited-image.png");
        assert_eq!(export_filename(ImageFormat::Jpeg), "edited-image.jpeg");
    }

    #[test]
    fn test_export_buffer_png() {
        let buffer = RasterBuffer::filled(4, 4, [10, 20, 30, 255]);
        let file = export_buffer(&buffer, ImageFormat::Png, 100).unwrap();

        assert_eq!(file.filename, "edited-image.png");
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(&file.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_export_buffer_clamps_quality() {
        let buffer = RasterBuffer::filled(4, 4, [10, 20, 30, 255]);
        let file = export_buffer(&buffer, ImageFormat::Jpeg, 0).unwrap();
        assert_eq!(file.quality, 1);
    }

    #[test]
    fn test_upload_request_from_export() {
        let file = ExportedFile {
            filename: export_filename(ImageFormat::Jpeg),
            format: ImageFormat::Jpeg,
            quality: 80,
            bytes: vec![1, 2, 3],
        };

        let request = UploadRequest::from_export(&file, 1_700_000_000_000);

        assert_eq!(request.filename, "edited-image-1700000000000.jpeg");
        assert_eq!(request.content_type, "image/jpeg");
        assert_eq!(request.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_closure_uploader() {
        let mut calls = 0;
        let mut uploader = |req: &UploadRequest| {
            calls += 1;
            Ok(format!("https://blob.example/{}", req.filename))
        };
        let request = UploadRequest {
            filename: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![],
        };

        let url = RemoteUploader::upload(&mut uploader, &request).unwrap();
        assert_eq!(url, "https://blob.example/a.png");
        assert_eq!(calls, 1);
    }
}
