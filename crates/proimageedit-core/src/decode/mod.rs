//! Image decoding for ProImageEdit.
//!
//! This module provides functionality for:
//! - Decoding PNG and JPEG uploads into RGBA [`RasterBuffer`]s
//! - Applying EXIF orientation so the buffer matches what the browser shows
//! - Decoding history snapshots back into the live buffer
//!
//! # Architecture
//!
//! All operations are synchronous and single-threaded. The browser hands the
//! raw file bytes to the WASM bindings, which call into this module.
//!
//! # Examples
//!
//! ```ignore
//! use proimageedit_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let buffer = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", buffer.width(), buffer.height());
//! ```

mod reader;
mod types;

pub use reader::{decode_image, decode_image_no_orientation};
pub use types::{byte_len, DecodeError, Orientation, RasterBuffer, CHANNELS};
