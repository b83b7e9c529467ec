//! Export and upload bindings.
//!
//! An export is handed to JavaScript as a [`JsExportedFile`], ready to be
//! wrapped in a `Blob` for download. Uploads go through a caller-supplied JS
//! function that receives `{ filename, contentType, dataUrl }` and returns the
//! stored object URL, either directly or as a Promise.
//!
//! # Example
//!
//! ```typescript
//! const result = await session.export_and_upload(async (payload) => {
//!   if (!auth.currentUser) return null;          // not signed in
//!   const res = await fetch(uploadUrl(payload.filename), { method: 'PUT', body: payload.dataUrl });
//!   if (!res.ok) throw res.statusText;
//!   return res.url;
//! });
//! if (result.error) console.warn(result.error);
//! ```

use proimageedit_core::encode::{ExportedFile, UploadError, UploadRequest};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::types::to_data_url;

/// An encoded image ready for download.
#[wasm_bindgen]
pub struct JsExportedFile {
    filename: String,
    mime_type: String,
    quality: u8,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl JsExportedFile {
    /// Download filename, e.g. `edited-image.png`.
    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.filename.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> u8 {
        self.quality
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    /// Encoded bytes as Uint8Array (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// The file as a base64 `data:` URL.
    pub fn data_url(&self) -> Result<String, JsValue> {
        to_data_url(&self.bytes, &self.mime_type)
    }
}

impl From<ExportedFile> for JsExportedFile {
    fn from(file: ExportedFile) -> Self {
        Self {
            mime_type: file.mime_type().to_string(),
            filename: file.filename,
            quality: file.quality,
            bytes: file.bytes,
        }
    }
}

/// Shape of the object passed to the JS upload function.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadPayload {
    pub filename: String,
    pub content_type: String,
    pub data_url: String,
}

/// Summary of an export-and-upload call returned to JS.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadSummary {
    pub filename: String,
    pub url: Option<String>,
    pub error: Option<String>,
}

impl UploadSummary {
    pub(crate) fn new(filename: String, upload: &Result<String, UploadError>) -> Self {
        match upload {
            Ok(url) => Self {
                filename,
                url: Some(url.clone()),
                error: None,
            },
            Err(err) => Self {
                filename,
                url: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Uploads by calling a JavaScript function.
///
/// The function's return value is awaited if it is a Promise. A `null` or
/// `undefined` result means the user is not signed in, a string is the stored
/// URL, anything else is a rejection. A throw or a rejected Promise is a
/// transport failure.
pub(crate) struct JsUploader {
    callback: js_sys::Function,
}

impl JsUploader {
    pub(crate) fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }

    #[allow(clippy::future_not_send)] // WASM is single-threaded; JsValue is !Send
    pub(crate) async fn upload(&self, request: &UploadRequest) -> Result<String, UploadError> {
        let payload = Self::payload(request)?;
        let returned = self
            .callback
            .call1(&JsValue::NULL, &payload)
            .map_err(|err| UploadError::Transport(describe(&err)))?;

        // Plain values resolve immediately.
        let result = JsFuture::from(js_sys::Promise::resolve(&returned))
            .await
            .map_err(|err| UploadError::Transport(describe(&err)))?;

        if result.is_null() || result.is_undefined() {
            return Err(UploadError::Unauthenticated);
        }
        result
            .as_string()
            .ok_or_else(|| UploadError::Rejected(format!("unexpected upload result {result:?}")))
    }

    fn payload(request: &UploadRequest) -> Result<JsValue, UploadError> {
        let data_url = to_data_url(&request.bytes, &request.content_type)
            .map_err(|err| UploadError::Transport(describe(&err)))?;
        let payload = UploadPayload {
            filename: request.filename.clone(),
            content_type: request.content_type.clone(),
            data_url,
        };
        serde_wasm_bindgen::to_value(&payload).map_err(|err| UploadError::Transport(err.to_string()))
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn request() -> UploadRequest {
        UploadRequest {
            filename: "edited-image-5.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        }
    }

    async fn upload_with(body: &str) -> Result<String, UploadError> {
        let callback = js_sys::Function::new_with_args("p", body);
        JsUploader::new(callback).upload(&request()).await
    }

    #[wasm_bindgen_test]
    async fn test_js_uploader_plain_string() {
        assert_eq!(
            upload_with("return 'https://cdn/' + p.filename;").await,
            Ok("https://cdn/edited-image-5.png".to_string())
        );
    }

    #[wasm_bindgen_test]
    async fn test_js_uploader_awaits_promise() {
        let body = "return new Promise((resolve) => \
                    setTimeout(() => resolve('https://cdn/' + p.filename), 0));";
        assert_eq!(
            upload_with(body).await,
            Ok("https://cdn/edited-image-5.png".to_string())
        );
    }

    #[wasm_bindgen_test]
    async fn test_js_uploader_unauthenticated() {
        assert_eq!(upload_with("return null;").await, Err(UploadError::Unauthenticated));
        assert_eq!(
            upload_with("return Promise.resolve(undefined);").await,
            Err(UploadError::Unauthenticated)
        );
    }

    #[wasm_bindgen_test]
    async fn test_js_uploader_transport_failures() {
        assert_eq!(
            upload_with("throw 'offline';").await,
            Err(UploadError::Transport("offline".into()))
        );
        assert_eq!(
            upload_with("return Promise.reject('503');").await,
            Err(UploadError::Transport("503".into()))
        );
    }

    #[wasm_bindgen_test]
    async fn test_js_uploader_unexpected_result() {
        assert!(matches!(
            upload_with("return Promise.resolve(42);").await,
            Err(UploadError::Rejected(_))
        ));
    }
}
