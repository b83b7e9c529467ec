//! PNG/JPEG decoding into RGBA buffers with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{DecodeError, Orientation, RasterBuffer};

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// The format is sniffed from the content, so any format enabled on the
/// `image` crate (PNG and JPEG in this workspace) is accepted.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are empty or not a
/// recognized image format.
/// Returns `DecodeError::CorruptedFile` if the image data is corrupted.
pub fn decode_image(bytes: &[u8]) -> Result<RasterBuffer, DecodeError> {
    let img = decode_dynamic(bytes)?;
    let oriented = apply_orientation(img, extract_orientation(bytes));
    into_buffer(oriented)
}

/// Decode an image from bytes without applying EXIF orientation.
///
/// Used for history snapshots, which are written by this crate and never
/// carry an orientation tag.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<RasterBuffer, DecodeError> {
    into_buffer(decode_dynamic(bytes)?)
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

fn into_buffer(img: DynamicImage) -> Result<RasterBuffer, DecodeError> {
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    RasterBuffer::from_rgba_image(rgba).ok_or(DecodeError::EmptyImage { width, height })
}

/// Extract EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
