//! Error types.
//!
//! Absence of a match (no previous delimiter, no matching brace, ...) is never an error: query
//! operations return `Option<usize>` for that. The enums below cover invalid state (bugs in a
//! caller or in the engine), malformed locations, and cancellation of a ranged indent.

use thiserror::Error;

/// Invalid-state errors raised by the reduced model.
///
/// These indicate a bug in a caller or in the engine itself. The incremental structure cannot be
/// repaired by retrying; the only recovery is a full rescan (see
/// [`JavaDocument::rebuild_reduced_model`](crate::JavaDocument::rebuild_reduced_model)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("cannot move walker by {distance} from {position}: target outside 0..={len}")]
    /// A relative move would leave the document.
    MoveOutOfBounds {
        /// Absolute walker position before the move.
        position: usize,
        /// Requested relative distance.
        distance: isize,
        /// Length of the modelled text.
        len: usize,
    },

    #[error("cannot delete {count} characters at {position}: only {len} characters modelled")]
    /// A delete would run past the end of the modelled text.
    DeleteOutOfBounds {
        /// Absolute walker position.
        position: usize,
        /// Number of characters requested.
        count: usize,
        /// Length of the modelled text.
        len: usize,
    },

    #[error("reduced model diverged from a full rescan at token {index}")]
    /// The incremental token sequence differs from a fresh scan of the same text.
    Inconsistent {
        /// Index of the first differing token.
        index: usize,
    },

    #[error("reduced model length {model} does not match text length {text}")]
    /// The modelled length differs from the character buffer's length.
    LengthMismatch {
        /// Length according to the reduced model.
        model: usize,
        /// Length of the character buffer.
        text: usize,
    },
}

/// Errors raised by the memoization cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("query cache holds {len} entries, capacity is {capacity}")]
    /// The FIFO bound was exceeded.
    SizeInvariant {
        /// Number of entries held.
        len: usize,
        /// Configured capacity.
        capacity: usize,
    },
}

/// Errors raised by document-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("invalid location: offset {offset}, length {length} (document length {len})")]
    /// A position or range outside the document.
    Location {
        /// Requested offset.
        offset: usize,
        /// Requested length.
        length: usize,
        /// Document length.
        len: usize,
    },

    #[error("reduced model failure: {0}")]
    /// An invalid-state error from the reduced model.
    Model(#[from] ModelError),

    #[error("query cache failure: {0}")]
    /// An invalid-state error from the query cache.
    Cache(#[from] CacheError),
}

/// Errors raised by the indent engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndentError {
    #[error("indentation cancelled after {completed} lines")]
    /// A ranged indent was cancelled by its progress callback. Lines already indented stay
    /// indented.
    Cancelled {
        /// Number of lines indented before cancellation.
        completed: usize,
    },

    #[error(transparent)]
    /// A document-level failure while indenting.
    Document(#[from] DocumentError),
}

impl From<ModelError> for IndentError {
    fn from(err: ModelError) -> Self {
        Self::Document(DocumentError::Model(err))
    }
}
