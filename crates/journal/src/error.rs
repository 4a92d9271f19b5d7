use thiserror::Error;

use crate::{AggregateId, Sequence};

/// Errors raised by journal implementations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// The stream moved past the sequence the writer expected.
    #[error("Version conflict on stream {stream_id}: expected {expected}, found {actual}")]
    VersionConflict {
        stream_id: AggregateId,
        expected: Sequence,
        actual: Sequence,
    },

    /// The batch handed to `append` is not a contiguous run on one stream.
    #[error("Invalid append batch: {0}")]
    InvalidBatch(String),

    /// A record is missing a required field.
    #[error("Incomplete record: missing {0}")]
    IncompleteRecord(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, JournalError>;
