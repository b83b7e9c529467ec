//! `localStorage`-backed snapshot store.
//!
//! Layout:
//!
//! | key                     | value                                  |
//! |-------------------------|----------------------------------------|
//! | `proimageedit_image`    | data URL of the current image          |
//! | `proimageedit_history`  | JSON array of data URLs                |
//! | `proimageedit_index`    | history index as a decimal string      |
//!
//! Browsers throw a `QuotaExceededError` DOMException when a write does not
//! fit; that is reported as [`StoreError::QuotaExceeded`] so the session's
//! persist policy can drop the history and keep going.

use proimageedit_core::history::Snapshot;
use proimageedit_core::store::{
    SnapshotStore, StoreError, StoreResult, StoredHistory, StoredSession,
};
use wasm_bindgen::prelude::*;

use crate::types::{from_data_url, to_data_url};

pub(crate) const IMAGE_KEY: &str = "proimageedit_image";
pub(crate) const HISTORY_KEY: &str = "proimageedit_history";
pub(crate) const INDEX_KEY: &str = "proimageedit_index";

/// Snapshots are always lossless PNG.
const SNAPSHOT_MIME: &str = "image/png";

const QUOTA_ERROR_NAMES: [&str; 2] = ["QuotaExceededError", "NS_ERROR_DOM_QUOTA_REACHED"];

pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    /// The window's `localStorage`.
    pub fn new() -> StoreResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window available".into()))?;
        let storage = window
            .local_storage()
            .map_err(|err| StoreError::Unavailable(describe(&err)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".into()))?;
        Ok(Self { storage })
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|err| write_error(&err, value.len()))
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|err| StoreError::Unavailable(describe(&err)))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|err| StoreError::Unavailable(describe(&err)))
    }
}

impl SnapshotStore for LocalStorageStore {
    fn save_image(&mut self, image: &Snapshot) -> StoreResult<()> {
        let url = encode_snapshot(image)?;
        self.set(IMAGE_KEY, &url)
    }

    fn save_history(&mut self, entries: &[Snapshot], index: usize) -> StoreResult<()> {
        let urls = entries
            .iter()
            .map(encode_snapshot)
            .collect::<StoreResult<Vec<_>>>()?;
        let json =
            serde_json::to_string(&urls).map_err(|err| StoreError::Corrupted(err.to_string()))?;
        self.set(HISTORY_KEY, &json)?;
        self.set(INDEX_KEY, &index.to_string())
    }

    fn clear_history(&mut self) -> StoreResult<()> {
        self.remove(HISTORY_KEY)?;
        self.remove(INDEX_KEY)
    }

    fn load(&self) -> StoreResult<StoredSession> {
        let image_url = self.get(IMAGE_KEY)?.ok_or(StoreError::NotFound)?;
        let image = decode_snapshot(&image_url)?;

        let history = match (self.get(HISTORY_KEY)?, self.get(INDEX_KEY)?) {
            (Some(json), Some(index)) => Some(parse_history(&json, &index)?),
            _ => None,
        };
        Ok(StoredSession { image, history })
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.remove(IMAGE_KEY)?;
        self.clear_history()
    }
}

fn encode_snapshot(snapshot: &Snapshot) -> StoreResult<String> {
    to_data_url(snapshot.bytes(), SNAPSHOT_MIME)
        .map_err(|err| StoreError::Unavailable(describe(&err)))
}

fn decode_snapshot(url: &str) -> StoreResult<Snapshot> {
    from_data_url(url)
        .map(Snapshot::new)
        .map_err(|err| StoreError::Corrupted(describe(&err)))
}

fn parse_history(json: &str, index: &str) -> StoreResult<StoredHistory> {
    let (urls, index) = parse_history_fields(json, index)?;
    let entries = urls
        .iter()
        .map(|url| decode_snapshot(url))
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(StoredHistory { entries, index })
}

/// Parse the raw history values without touching browser APIs.
fn parse_history_fields(json: &str, index: &str) -> StoreResult<(Vec<String>, usize)> {
    let urls: Vec<String> =
        serde_json::from_str(json).map_err(|err| StoreError::Corrupted(err.to_string()))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|err| StoreError::Corrupted(format!("history index: {err}")))?;
    Ok((urls, index))
}

fn is_quota_error_name(name: &str) -> bool {
    QUOTA_ERROR_NAMES.contains(&name)
}

fn write_error(err: &JsValue, needed: usize) -> StoreError {
    let name = js_sys::Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|v| v.as_string());
    match name {
        Some(name) if is_quota_error_name(&name) => StoreError::QuotaExceeded {
            needed,
            available: 0,
        },
        _ => StoreError::Unavailable(describe(err)),
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
