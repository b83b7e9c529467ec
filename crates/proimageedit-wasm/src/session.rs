//! `EditSession` bindings.
//!
//! One `JsEditSession` per open image. Structured values (history position,
//! crop rectangle, resize parameters, events) cross the boundary as plain JS
//! objects via `serde-wasm-bindgen`; enum arguments are passed as their
//! serialized strings (`"grayscale"`, `"flip-h"`, `"16:9"`, `"FullHd"`,
//! `"compress"`, `"image/jpeg"`).
//!
//! # Example
//!
//! ```typescript
//! const session = new JsEditSession(null, true);
//! session.on_event((event) => render(event));
//! if (!session.restore()) {
//!   session.load_image(new Uint8Array(await file.arrayBuffer()));
//! }
//! session.apply_color_op('sepia');
//! session.undo();
//! ```

use proimageedit_core::encode::{ImageFormat, UploadRequest};
use proimageedit_core::selection::DisplayMapping;
use proimageedit_core::{
    ActiveTool, AspectPreset, CropField, EditSession, EditorConfig, ResizePreset, SessionEvent,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_time::Instant;

use crate::export::{JsExportedFile, JsUploader, UploadSummary};
use crate::storage::LocalStorageStore;
use crate::types::{to_js_error, JsRasterBuffer};

/// A browser-side editing session.
#[wasm_bindgen]
pub struct JsEditSession {
    inner: EditSession,
}

#[wasm_bindgen]
impl JsEditSession {
    /// Create a session.
    ///
    /// # Arguments
    ///
    /// * `config_json` - Optional editor configuration JSON. Invalid JSON is
    ///   logged and the defaults are used.
    /// * `persist` - Mirror the session into `localStorage`
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, persist: bool) -> JsEditSession {
        let config = config_json
            .as_deref()
            .map(EditorConfig::from_json_or_default)
            .unwrap_or_default();
        let mut inner = EditSession::new(config);
        if persist {
            match LocalStorageStore::new() {
                Ok(store) => inner = inner.with_store(store),
                Err(err) => web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "Session persistence disabled: {err}"
                ))),
            }
        }
        JsEditSession { inner }
    }

    /// Register a callback receiving every session event as a JS object.
    pub fn on_event(&mut self, callback: js_sys::Function) {
        self.inner.add_observer(move |event: &SessionEvent| {
            let Ok(value) = serde_wasm_bindgen::to_value(event) else {
                return;
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                web_sys::console::error_2(&JsValue::from_str("Session event handler threw"), &err);
            }
        });
    }

    // --- Lifecycle -------------------------------------------------------

    /// Decode and load an image, starting a fresh history.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load_image(bytes).map(|_| ()).map_err(to_js_error)
    }

    /// Reload the stored session. Returns `false` when nothing was stored.
    pub fn restore(&mut self) -> Result<bool, JsValue> {
        self.inner.restore().map_err(to_js_error)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.has_image()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.dimensions().map_or(0, |(w, _)| w)
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.dimensions().map_or(0, |(_, h)| h)
    }

    /// Copy of the current buffer for drawing, or `undefined` without an image.
    pub fn buffer(&self) -> Option<JsRasterBuffer> {
        self.inner.buffer().cloned().map(JsRasterBuffer::from_buffer)
    }

    // --- Tools -----------------------------------------------------------

    pub fn apply_color_op(&mut self, name: &str) -> Result<(), JsValue> {
        self.inner.apply_color_op(name).map_err(to_js_error)
    }

    pub fn apply_transform(&mut self, name: &str) -> Result<(), JsValue> {
        self.inner.apply_transform(name).map_err(to_js_error)
    }

    pub fn apply_crop(&mut self) -> Result<(), JsValue> {
        self.inner.apply_crop().map_err(to_js_error)
    }

    pub fn apply_resize(&mut self) -> Result<(), JsValue> {
        self.inner.apply_resize().map_err(to_js_error)
    }

    pub fn apply_compression(&mut self) -> Result<(), JsValue> {
        self.inner.apply_compression().map_err(to_js_error)
    }

    /// Open a tool panel (`"crop"`, `"compress"`, ...) or close it with `null`.
    pub fn set_active_tool(&mut self, tool: JsValue) -> Result<(), JsValue> {
        let tool: Option<ActiveTool> = from_js(tool)?;
        self.inner.set_active_tool(tool, Instant::now());
        Ok(())
    }

    // --- History ---------------------------------------------------------

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.inner.undo().map_err(to_js_error)
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.inner.redo().map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    /// `{ index, len, canUndo, canRedo }`.
    pub fn history_position(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.history_position())
    }

    // --- Crop ------------------------------------------------------------

    /// `{ x, y, width, height }` of the pending crop.
    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop().rect)
    }

    /// Numeric crop input; `field` is `"x"`, `"y"`, `"width"` or `"height"`.
    pub fn set_crop_field(&mut self, field: JsValue, value: u32) -> Result<JsValue, JsValue> {
        let field: CropField = from_js(field)?;
        let rect = self.inner.set_crop_field(field, value).map_err(to_js_error)?;
        to_js(&rect)
    }

    /// Aspect preset: `"1:1"`, `"4:3"`, `"16:9"` or `"free"`.
    pub fn apply_crop_preset(&mut self, preset: JsValue) -> Result<JsValue, JsValue> {
        let preset: AspectPreset = from_js(preset)?;
        let rect = self.inner.apply_crop_preset(preset).map_err(to_js_error)?;
        to_js(&rect)
    }

    /// Pointer down on the crop overlay.
    ///
    /// `rect_*` is the canvas bounding box (`getBoundingClientRect()`), and
    /// `x`/`y` the pointer's client coordinates. Returns the grabbed handle
    /// name, or `undefined` on a miss.
    pub fn begin_crop_drag(
        &mut self,
        rect_left: f64,
        rect_top: f64,
        rect_width: f64,
        rect_height: f64,
        x: f64,
        y: f64,
    ) -> Result<JsValue, JsValue> {
        let mapping = self.mapping(rect_left, rect_top, rect_width, rect_height)?;
        let handle = self
            .inner
            .begin_crop_drag(&mapping, x, y)
            .map_err(to_js_error)?;
        to_js(&handle)
    }

    /// Pointer move. Returns the updated rectangle, or `undefined` when no
    /// drag is active.
    pub fn update_crop_drag(
        &mut self,
        rect_left: f64,
        rect_top: f64,
        rect_width: f64,
        rect_height: f64,
        x: f64,
        y: f64,
    ) -> Result<JsValue, JsValue> {
        let mapping = self.mapping(rect_left, rect_top, rect_width, rect_height)?;
        let rect = self
            .inner
            .update_crop_drag(&mapping, x, y)
            .map_err(to_js_error)?;
        to_js(&rect)
    }

    pub fn end_crop_drag(&mut self) {
        self.inner.end_crop_drag();
    }

    // --- Resize ----------------------------------------------------------

    /// `{ width, height, lockAspectRatio, originalRatio }`.
    pub fn resize_params(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.resize_params())
    }

    pub fn set_resize_width(&mut self, width: u32) -> Result<JsValue, JsValue> {
        to_js(&self.inner.set_resize_width(width))
    }

    pub fn set_resize_height(&mut self, height: u32) -> Result<JsValue, JsValue> {
        to_js(&self.inner.set_resize_height(height))
    }

    pub fn toggle_resize_lock(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.toggle_resize_lock())
    }

    pub fn scale_resize_by_percent(&mut self, percent: u32) -> Result<JsValue, JsValue> {
        let params = self
            .inner
            .scale_resize_by_percent(percent)
            .map_err(to_js_error)?;
        to_js(&params)
    }

    /// Preset: `"FullHd"`, `"Instagram"` or `"A4At300Dpi"`.
    pub fn apply_resize_preset(&mut self, preset: JsValue) -> Result<JsValue, JsValue> {
        let preset: ResizePreset = from_js(preset)?;
        to_js(&self.inner.apply_resize_preset(preset))
    }

    // --- Compression and preview ----------------------------------------

    /// `{ quality, format, showComparison }`.
    pub fn compression_params(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.compression_params())
    }

    pub fn set_compression_quality(&mut self, quality: u32) {
        self.inner.set_compression_quality(quality, Instant::now());
    }

    /// Output format as a MIME type (`"image/png"`, `"image/jpeg"`).
    pub fn set_compression_format(&mut self, mime: &str) -> Result<(), JsValue> {
        let format: ImageFormat = mime.parse().map_err(to_js_error)?;
        self.inner.set_compression_format(format, Instant::now());
        Ok(())
    }

    pub fn set_show_comparison(&mut self, show: bool) {
        self.inner.set_show_comparison(show, Instant::now());
    }

    /// Debounce delay in milliseconds; poll after this long.
    #[wasm_bindgen(getter)]
    pub fn preview_delay_ms(&self) -> f64 {
        self.inner.preview_scheduler().delay().as_secs_f64() * 1000.0
    }

    #[wasm_bindgen(getter)]
    pub fn preview_pending(&self) -> bool {
        self.inner.preview_scheduler().is_pending()
    }

    /// Render the pending preview if due. Returns the preview buffer when
    /// one was rendered by this call.
    pub fn poll_preview(&mut self) -> Result<Option<JsRasterBuffer>, JsValue> {
        let preview = self.inner.poll_preview(Instant::now()).map_err(to_js_error)?;
        Ok(preview.map(|p| JsRasterBuffer::from_buffer(p.buffer.clone())))
    }

    /// Encoded size of the showing preview, in bytes.
    pub fn preview_size(&self) -> Option<usize> {
        self.inner.preview().map(|p| p.encoded_size)
    }

    // --- Export ----------------------------------------------------------

    pub fn export(&self) -> Result<JsExportedFile, JsValue> {
        self.inner
            .export()
            .map(JsExportedFile::from)
            .map_err(to_js_error)
    }

    /// Export, then pass `{ filename, contentType, dataUrl }` to `upload`.
    ///
    /// `upload` may return the URL directly or a Promise of it. The returned
    /// Promise resolves to `{ filename, url, error }`. A failed upload is
    /// reported in `error` and logged; it never rejects. Only a failed export
    /// throws.
    pub fn export_and_upload(
        &self,
        upload: js_sys::Function,
    ) -> Result<js_sys::Promise, JsValue> {
        let file = self.inner.export().map_err(to_js_error)?;
        let request = UploadRequest::from_export(&file, js_sys::Date::now() as u64);
        let uploader = JsUploader::new(upload);
        let filename = file.filename;

        Ok(wasm_bindgen_futures::future_to_promise(async move {
            let upload = uploader.upload(&request).await;
            match &upload {
                Ok(url) => tracing::debug!(%url, "export uploaded"),
                Err(err) => tracing::warn!(?err, filename = %request.filename, "upload failed"),
            }
            to_js(&UploadSummary::new(filename, &upload))
        }))
    }
}

impl JsEditSession {
    fn mapping(
        &self,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<DisplayMapping, JsValue> {
        let (buffer_width, buffer_height) = self
            .inner
            .dimensions()
            .ok_or_else(|| JsValue::from_str("no image loaded"))?;
        DisplayMapping::with_origin(buffer_width, buffer_height, left, top, width, height)
            .ok_or_else(|| JsValue::from_str("canvas has no visible size"))
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}
