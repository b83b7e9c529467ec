use serde::{Deserialize, Serialize};

use crate::history::HistoryPosition;
use crate::store::PersistOutcome;

/// Notifications published by a session after its state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionEvent {
    /// The live buffer was replaced (load, edit, undo, redo, restore).
    #[serde(rename_all = "camelCase")]
    BufferChanged {
        width: u32,
        height: u32,
        history: HistoryPosition,
    },
    /// The image was discarded.
    Cleared,
    /// A comparison preview finished rendering.
    #[serde(rename_all = "camelCase")]
    PreviewReady { generation: u64, encoded_size: usize },
    /// The preview was dropped (tool closed or comparison turned off).
    PreviewCleared,
    /// Persisting to the snapshot store only partly succeeded.
    #[serde(rename_all = "camelCase")]
    PersistDegraded { image_stored: bool },
}

impl SessionEvent {
    pub(crate) fn from_persist(outcome: &PersistOutcome) -> Option<Self> {
        match outcome {
            PersistOutcome::Complete => None,
            PersistOutcome::ImageOnly => Some(SessionEvent::PersistDegraded { image_stored: true }),
            PersistOutcome::Failed { image_stored, .. } => Some(SessionEvent::PersistDegraded {
                image_stored: *image_stored,
            }),
        }
    }
}

/// Receives [`SessionEvent`]s. Closures taking `&SessionEvent` implement it.
pub trait SessionObserver {
    fn on_event(&mut self, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionEvent),
{
    fn on_event(&mut self, event: &SessionEvent) {
        self(event)
    }
}
