//! WASM-compatible wrapper types and value conversions.
//!
//! This module provides the JavaScript-facing image type, plus the helpers
//! that move bytes in and out of `data:` URLs. Browser storage and the
//! upload payload both carry images as base64 data URLs, encoded with the
//! window's `btoa`/`atob` over Latin-1 strings.

use proimageedit_core::decode::RasterBuffer;
use wasm_bindgen::prelude::*;

/// An RGBA image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`, ready for `new ImageData(...)`.
#[wasm_bindgen]
pub struct JsRasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRasterBuffer {
    /// Create a buffer from dimensions and RGBA pixel data.
    ///
    /// # Errors
    ///
    /// Returns an error if `pixels` is not `width * height * 4` bytes or a
    /// dimension is zero.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsRasterBuffer, JsValue> {
        RasterBuffer::from_raw(width, height, pixels)
            .map(Self::from_buffer)
            .ok_or_else(|| JsValue::from_str("pixel data does not match dimensions"))
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsRasterBuffer {
    pub(crate) fn from_buffer(buffer: RasterBuffer) -> Self {
        let (width, height) = buffer.dimensions();
        Self {
            width,
            height,
            pixels: buffer.into_pixels(),
        }
    }
}

/// Render any displayable error as a JS string value.
pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Map each byte to the char with the same code point.
pub(crate) fn bytes_to_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Inverse of [`bytes_to_latin1`]. `None` if any char is above U+00FF.
pub(crate) fn latin1_to_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(c).ok()).collect()
}

/// Split `data:<mime>;base64,<payload>` into `(mime, payload)`.
pub(crate) fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    Some((mime, payload))
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))
}

/// Encode bytes as a base64 `data:` URL.
pub(crate) fn to_data_url(bytes: &[u8], mime: &str) -> Result<String, JsValue> {
    let encoded = window()?.btoa(&bytes_to_latin1(bytes))?;
    Ok(format!("data:{mime};base64,{encoded}"))
}

/// Decode a base64 `data:` URL back to bytes.
pub(crate) fn from_data_url(url: &str) -> Result<Vec<u8>, JsValue> {
    let (_, payload) =
        split_data_url(url).ok_or_else(|| JsValue::from_str("not a base64 data URL"))?;
    let decoded = window()?.atob(payload)?;
    latin1_to_bytes(&decoded).ok_or_else(|| JsValue::from_str("data URL is not binary"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_buffer() {
        let buffer = RasterBuffer::filled(20, 10, [1, 2, 3, 4]);
        let js = JsRasterBuffer::from_buffer(buffer);
        assert_eq!(js.width(), 20);
        assert_eq!(js.height(), 10);
        assert_eq!(js.byte_length(), 800);
        assert_eq!(&js.pixels()[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_latin1_round_trip() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = bytes_to_latin1(&bytes);
        assert_eq!(text.chars().count(), 256);
        assert_eq!(latin1_to_bytes(&text), Some(bytes));
    }

    #[test]
    fn test_latin1_rejects_wide_chars() {
        assert_eq!(latin1_to_bytes("caf\u{e9}"), Some(vec![b'c', b'a', b'f', 0xE9]));
        assert_eq!(latin1_to_bytes("\u{20ac}"), None);
    }

    #[test]
    fn test_split_data_url() {
        assert_eq!(
            split_data_url("data:image/png;base64,iVBORw0K"),
            Some(("image/png", "iVBORw0K"))
        );
        assert_eq!(split_data_url("data:image/png,raw"), None);
        assert_eq!(split_data_url("https://example.com/a.png"), None);
    }
}
