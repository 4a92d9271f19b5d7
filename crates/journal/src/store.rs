use async_trait::async_trait;

use crate::{AggregateId, JournalError, JournalRecord, RecordQuery, Result, Sequence};

/// Concurrency expectation for an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedSequence {
    /// The stream must not exist yet.
    NoStream,
    /// The stream must currently end at this sequence.
    Exactly(Sequence),
}

impl ExpectedSequence {
    /// The expectation for a writer that last saw the stream at `current`.
    pub fn after(current: Sequence) -> Self {
        if current == Sequence::empty() {
            ExpectedSequence::NoStream
        } else {
            ExpectedSequence::Exactly(current)
        }
    }

    fn as_sequence(&self) -> Sequence {
        match self {
            ExpectedSequence::NoStream => Sequence::empty(),
            ExpectedSequence::Exactly(seq) => *seq,
        }
    }

    /// Checks the expectation against the stream's current sequence.
    pub fn check(&self, stream_id: AggregateId, actual: Sequence) -> Result<()> {
        let expected = self.as_sequence();
        if expected != actual {
            return Err(JournalError::VersionConflict {
                stream_id,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

/// Storage for journal records.
///
/// A stream is named by its stream type and id together, so aggregates of
/// different types may share an id without sharing records. Appends are
/// atomic per call: either every record in the batch is stored or none is.
#[async_trait]
pub trait Journal: Send + Sync {
    /// Appends a contiguous batch of records to one stream.
    ///
    /// Returns the stream's sequence after the append.
    async fn append(
        &self,
        records: Vec<JournalRecord>,
        expected: ExpectedSequence,
    ) -> Result<Sequence>;

    /// All records of one stream in sequence order.
    async fn read_stream(
        &self,
        stream_type: &str,
        stream_id: AggregateId,
    ) -> Result<Vec<JournalRecord>>;

    /// Records matching `query`, in append order.
    async fn query(&self, query: RecordQuery) -> Result<Vec<JournalRecord>>;
}

/// Verifies that a batch targets a single stream with consecutive sequences.
pub fn validate_batch(records: &[JournalRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        return Err(JournalError::InvalidBatch("empty batch".to_string()));
    };

    let mut expected = first.sequence;
    for record in records.iter().skip(1) {
        if record.stream_id != first.stream_id || record.stream_type != first.stream_type {
            return Err(JournalError::InvalidBatch(
                "records span more than one stream".to_string(),
            ));
        }
        expected = expected.next();
        if record.sequence != expected {
            return Err(JournalError::InvalidBatch(format!(
                "expected sequence {expected}, got {}",
                record.sequence
            )));
        }
    }

    Ok(())
}
