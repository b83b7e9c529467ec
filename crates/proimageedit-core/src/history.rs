//! Linear undo/redo history.
//!
//! ## States
//!
//! - `Empty`: no entries, no index (no image loaded)
//! - `NonEmpty`: `len >= 1` and `0 <= index < len`
//!
//! Committing after an undo discards everything after the current index, so
//! there is only ever one timeline. Undo at the first entry and redo at the
//! last are silent no-ops.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An encoded, immutable copy of the buffer (PNG bytes).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot(Vec<u8>);

impl Snapshot {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Snapshot({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for Snapshot {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Rejected persisted history.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history has no entries")]
    Empty,

    #[error("history index {index} is out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Where the history cursor is, for enabling undo/redo controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPosition {
    /// Current index, `None` when empty.
    pub index: Option<usize>,
    pub len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Ordered entries plus a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditHistory<T = Snapshot> {
    entries: Vec<T>,
    index: Option<usize>,
}

impl<T> Default for EditHistory<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: None,
        }
    }
}

impl<T> EditHistory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a single entry.
    pub fn reset(&mut self, entry: T) {
        self.entries.clear();
        self.entries.push(entry);
        self.index = Some(0);
    }

    /// Drop entries after the cursor, append, and move to the new entry.
    pub fn commit(&mut self, entry: T) {
        match self.index {
            Some(i) => {
                self.entries.truncate(i + 1);
                self.entries.push(entry);
                self.index = Some(self.entries.len() - 1);
            }
            None => self.reset(entry),
        }
    }

    /// Step back, returning the entry now current.
    pub fn undo(&mut self) -> Option<&T> {
        let i = self.index.filter(|&i| i > 0)?;
        self.index = Some(i - 1);
        self.entries.get(i - 1)
    }

    /// Step forward, returning the entry now current.
    pub fn redo(&mut self) -> Option<&T> {
        let i = self.index.filter(|&i| i + 1 < self.entries.len())?;
        self.index = Some(i + 1);
        self.entries.get(i + 1)
    }

    /// The entry [`undo`](Self::undo) would make current.
    pub fn peek_undo(&self) -> Option<&T> {
        let i = self.index.filter(|&i| i > 0)?;
        self.entries.get(i - 1)
    }

    /// The entry [`redo`](Self::redo) would make current.
    pub fn peek_redo(&self) -> Option<&T> {
        let i = self.index?;
        self.entries.get(i + 1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }

    /// Replace the whole state from persisted data.
    ///
    /// # Errors
    ///
    /// Fails without touching the current state when `entries` is empty or
    /// `index` is out of range.
    pub fn restore(&mut self, entries: Vec<T>, index: usize) -> Result<(), HistoryError> {
        if entries.is_empty() {
            return Err(HistoryError::Empty);
        }
        if index >= entries.len() {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: entries.len(),
            });
        }
        self.entries = entries;
        self.index = Some(index);
        Ok(())
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.index?)
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn position(&self) -> HistoryPosition {
        HistoryPosition {
            index: self.index,
            len: self.entries.len(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
