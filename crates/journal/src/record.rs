use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AggregateId, JournalError, Result};

/// Unique identifier of a single journal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of a record inside its stream.
///
/// An empty stream sits at [`Sequence::empty`] (0); the first record is 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sequence(u64);

impl Sequence {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Sequence of a stream with no records.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Sequence of the first record in a stream.
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One immutable entry in the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRecord {
    pub record_id: RecordId,
    /// Record kind, e.g. `"OrderPlaced"` or `"SagaFaulted"`.
    pub kind: String,
    pub stream_id: AggregateId,
    /// Stream family, e.g. `"Order"` or `"OrderSaga"`.
    pub stream_type: String,
    pub sequence: Sequence,
    pub recorded_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl JournalRecord {
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// Decodes the payload into a typed value.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// Builder for [`JournalRecord`]; `build` fails instead of panicking when a
/// required field is absent.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    kind: Option<String>,
    stream_id: Option<AggregateId>,
    stream_type: Option<String>,
    sequence: Option<Sequence>,
    recorded_at: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
}

impl RecordBuilder {
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn stream(mut self, stream_type: impl Into<String>, stream_id: AggregateId) -> Self {
        self.stream_type = Some(stream_type.into());
        self.stream_id = Some(stream_id);
        self
    }

    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Overrides the record time; defaults to now.
    pub fn recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(at);
        self
    }

    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn build(self) -> Result<JournalRecord> {
        Ok(JournalRecord {
            record_id: RecordId::new(),
            kind: self.kind.ok_or(JournalError::IncompleteRecord("kind"))?,
            stream_id: self
                .stream_id
                .ok_or(JournalError::IncompleteRecord("stream_id"))?,
            stream_type: self
                .stream_type
                .ok_or(JournalError::IncompleteRecord("stream_type"))?,
            sequence: self
                .sequence
                .ok_or(JournalError::IncompleteRecord("sequence"))?,
            recorded_at: self.recorded_at.unwrap_or_else(Utc::now),
            payload: self
                .payload
                .ok_or(JournalError::IncompleteRecord("payload"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_starts_empty() {
        assert_eq!(Sequence::empty().next(), Sequence::first());
        assert!(Sequence::new(1) < Sequence::new(2));
    }

    #[test]
    fn builder_requires_every_field() {
        let missing = JournalRecord::builder().kind("Thing").build();
        assert!(matches!(
            missing,
            Err(JournalError::IncompleteRecord("stream_id"))
        ));

        let record = JournalRecord::builder()
            .kind("Thing")
            .stream("Widget", AggregateId::new())
            .sequence(Sequence::first())
            .payload(&serde_json::json!({"n": 1}))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(record.kind, "Thing");
        assert_eq!(record.decode::<serde_json::Value>().unwrap()["n"], 1);
    }
}
