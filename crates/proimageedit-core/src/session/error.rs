use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::history::HistoryError;
use crate::pixel::UnknownColorOp;
use crate::store::StoreError;
use crate::transform::{TransformError, UnknownTransform};

/// Errors surfaced by [`EditSession`](super::EditSession) operations.
///
/// A failed operation never changes the buffer, history or pending
/// parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("no image loaded")]
    NoImage,

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UnknownColorOp> for EditError {
    fn from(err: UnknownColorOp) -> Self {
        EditError::UnknownOperation(err.0)
    }
}

impl From<UnknownTransform> for EditError {
    fn from(err: UnknownTransform) -> Self {
        EditError::UnknownOperation(err.0)
    }
}

pub type EditResult<T> = std::result::Result<T, EditError>;
