//! Snapshot persistence.
//!
//! Storage is a cache for surviving a page reload, not a system of record.
//! The session saves the latest image first and the history log second; if
//! the log does not fit, the stored log is dropped so a later reload never
//! restores a history that disagrees with the image.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::Snapshot;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    #[error("no stored session")]
    NotFound,

    #[error("stored session is corrupted: {0}")]
    Corrupted(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persisted history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredHistory {
    pub entries: Vec<Snapshot>,
    pub index: usize,
}

/// Everything a store can hand back on reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub image: Snapshot,
    pub history: Option<StoredHistory>,
}

/// Pluggable snapshot storage.
pub trait SnapshotStore {
    /// Store the latest image, replacing any previous one.
    fn save_image(&mut self, image: &Snapshot) -> StoreResult<()>;

    /// Store the history log, replacing any previous one.
    fn save_history(&mut self, entries: &[Snapshot], index: usize) -> StoreResult<()>;

    /// Remove the stored history log, keeping the image.
    fn clear_history(&mut self) -> StoreResult<()>;

    /// Read back the stored session.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no image is stored.
    fn load(&self) -> StoreResult<StoredSession>;

    /// Remove everything.
    fn clear(&mut self) -> StoreResult<()>;
}

/// How much of the session a persist call managed to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Image and history stored.
    Complete,
    /// Image stored; the history did not fit and was removed.
    ImageOnly,
    /// A write failed for a reason other than the history exceeding quota.
    Failed {
        error: StoreError,
        /// Whether the image write succeeded before the failure.
        image_stored: bool,
    },
}

/// Save image then history, following the quota fallback policy.
///
/// Never fails: storage problems are logged and reported in the outcome.
pub fn persist(
    store: &mut dyn SnapshotStore,
    image: &Snapshot,
    entries: &[Snapshot],
    index: usize,
) -> PersistOutcome {
    if let Err(err) = store.save_image(image) {
        tracing::warn!(?err, "failed to store current image; continuing in memory");
        return PersistOutcome::Failed {
            error: err,
            image_stored: false,
        };
    }

    match store.save_history(entries, index) {
        Ok(()) => PersistOutcome::Complete,
        Err(err @ StoreError::QuotaExceeded { .. }) => {
            tracing::warn!(
                ?err,
                entries = entries.len(),
                "history does not fit in storage; dropping stored history"
            );
            drop_stale_history(store);
            PersistOutcome::ImageOnly
        }
        Err(err) => {
            tracing::warn!(?err, "failed to store history");
            // The stored image is newer than whatever history is left.
            drop_stale_history(store);
            PersistOutcome::Failed {
                error: err,
                image_stored: true,
            }
        }
    }
}

fn drop_stale_history(store: &mut dyn SnapshotStore) {
    if let Err(clear_err) = store.clear_history() {
        tracing::warn!(?clear_err, "failed to remove stale stored history");
    }
}

/// In-memory store with an optional byte quota shared by image and history.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    image: Option<Snapshot>,
    history: Option<StoredHistory>,
    quota: Option<usize>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses writes pushing its total size above `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.image_bytes() + self.history_bytes()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn has_history(&self) -> bool {
        self.history.is_some()
    }

    fn image_bytes(&self) -> usize {
        self.image.as_ref().map_or(0, Snapshot::len)
    }

    fn history_bytes(&self) -> usize {
        self.history
            .as_ref()
            .map_or(0, |h| h.entries.iter().map(Snapshot::len).sum())
    }

    fn check_quota(&self, needed: usize, other_bytes: usize) -> StoreResult<()> {
        match self.quota {
            Some(quota) if other_bytes + needed > quota => Err(StoreError::QuotaExceeded {
                needed,
                available: quota.saturating_sub(other_bytes),
            }),
            _ => Ok(()),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save_image(&mut self, image: &Snapshot) -> StoreResult<()> {
        self.check_quota(image.len(), self.history_bytes())?;
        self.image = Some(image.clone());
        Ok(())
    }

    fn save_history(&mut self, entries: &[Snapshot], index: usize) -> StoreResult<()> {
        let needed = entries.iter().map(Snapshot::len).sum();
        self.check_quota(needed, self.image_bytes())?;
        self.history = Some(StoredHistory {
            entries: entries.to_vec(),
            index,
        });
        Ok(())
    }

    fn clear_history(&mut self) -> StoreResult<()> {
        self.history = None;
        Ok(())
    }

    fn load(&self) -> StoreResult<StoredSession> {
        let image = self.image.clone().ok_or(StoreError::NotFound)?;
        Ok(StoredSession {
            image,
            history: self.history.clone(),
        })
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.image = None;
        self.history = None;
        Ok(())
    }
}
