//! ProImageEdit WASM - WebAssembly bindings for ProImageEdit
//!
//! This crate exposes the proimageedit-core editing session to the browser
//! front end.
//!
//! # Module Structure
//!
//! - `session` - `JsEditSession`, the editing session and its tool parameters
//! - `storage` - `localStorage`-backed snapshot store for reload recovery
//! - `export` - download files and the upload adapter
//! - `logging` - `tracing` subscriber writing to the browser console
//! - `types` - WASM-compatible wrapper types and data URL helpers
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditSession } from '@proimageedit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const session = new JsEditSession(null, true);
//! session.load_image(new Uint8Array(await file.arrayBuffer()));
//! session.apply_color_op('grayscale');
//! const image = session.buffer();
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(image.pixels()), image.width), 0, 0);
//! ```

use wasm_bindgen::prelude::*;

mod export;
mod logging;
mod session;
mod storage;
mod types;

// Re-export public types
pub use export::JsExportedFile;
pub use session::JsEditSession;
pub use storage::LocalStorageStore;
pub use types::JsRasterBuffer;

/// Initialize the WASM module (called automatically on load)
///
/// Installs the panic hook and the console `tracing` subscriber.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::install();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Names accepted by `JsEditSession.apply_color_op`.
#[wasm_bindgen]
pub fn color_operations() -> Vec<String> {
    proimageedit_core::ColorOp::ALL
        .iter()
        .map(|op| op.name().to_string())
        .collect()
}

/// Names accepted by `JsEditSession.apply_transform`.
#[wasm_bindgen]
pub fn transform_operations() -> Vec<String> {
    proimageedit_core::TransformKind::ALL
        .iter()
        .map(|kind| kind.name().to_string())
        .collect()
}
