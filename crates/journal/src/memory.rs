use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{ExpectedSequence, Journal, validate_batch};
use crate::{AggregateId, JournalError, JournalRecord, RecordQuery, Result, Sequence};

type StreamKey = (String, AggregateId);

#[derive(Default)]
struct JournalState {
    records: Vec<JournalRecord>,
    heads: HashMap<StreamKey, Sequence>,
}

/// Process-local journal. Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryJournal {
    state: Arc<RwLock<JournalState>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored records.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }
}

#[async_trait]
impl Journal for InMemoryJournal {
    async fn append(
        &self,
        records: Vec<JournalRecord>,
        expected: ExpectedSequence,
    ) -> Result<Sequence> {
        validate_batch(&records)?;
        let stream_id = records[0].stream_id;
        let key = (records[0].stream_type.clone(), stream_id);
        let first_sequence = records[0].sequence;

        let mut state = self.state.write().await;
        let head = state.heads.get(&key).copied().unwrap_or(Sequence::empty());

        expected.check(stream_id, head)?;

        if first_sequence != head.next() {
            return Err(JournalError::VersionConflict {
                stream_id,
                expected: first_sequence,
                actual: head,
            });
        }

        let last = records
            .last()
            .map(|r| r.sequence)
            .unwrap_or(first_sequence);
        tracing::trace!(stream_type = %key.0, %stream_id, sequence = %last, "journal append");
        state.heads.insert(key, last);
        state.records.extend(records);
        Ok(last)
    }

    async fn read_stream(
        &self,
        stream_type: &str,
        stream_id: AggregateId,
    ) -> Result<Vec<JournalRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<_> = state
            .records
            .iter()
            .filter(|r| r.stream_id == stream_id && r.stream_type == stream_type)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.sequence);
        Ok(records)
    }

    async fn query(&self, query: RecordQuery) -> Result<Vec<JournalRecord>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_in(stream_type: &str, stream_id: AggregateId, sequence: u64, kind: &str) -> JournalRecord {
        JournalRecord::builder()
            .kind(kind)
            .stream(stream_type, stream_id)
            .sequence(Sequence::new(sequence))
            .payload(&serde_json::json!({ "kind": kind }))
            .unwrap()
            .build()
            .unwrap()
    }

    fn record(stream_id: AggregateId, sequence: u64, kind: &str) -> JournalRecord {
        record_in("Widget", stream_id, sequence, kind)
    }

    #[tokio::test]
    async fn append_and_read_back() {
        let journal = InMemoryJournal::new();
        let id = AggregateId::new();

        let head = journal
            .append(
                vec![record(id, 1, "Opened"), record(id, 2, "Closed")],
                ExpectedSequence::NoStream,
            )
            .await
            .unwrap();
        assert_eq!(head, Sequence::new(2));

        let stream = journal.read_stream("Widget", id).await.unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream[0].kind, "Opened");
        assert_eq!(journal.len().await, 2);
    }

    #[tokio::test]
    async fn no_stream_expectation_rejects_second_creation() {
        let journal = InMemoryJournal::new();
        let id = AggregateId::new();

        journal
            .append(vec![record(id, 1, "Opened")], ExpectedSequence::NoStream)
            .await
            .unwrap();
        let again = journal
            .append(vec![record(id, 1, "Opened")], ExpectedSequence::NoStream)
            .await;

        assert!(matches!(again, Err(JournalError::VersionConflict { .. })));
        assert_eq!(journal.read_stream("Widget", id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn exact_expectation_detects_lost_update() {
        let journal = InMemoryJournal::new();
        let id = AggregateId::new();
        journal
            .append(
                vec![record(id, 1, "Opened")],
                ExpectedSequence::after(Sequence::empty()),
            )
            .await
            .unwrap();

        let stale = journal
            .append(
                vec![record(id, 2, "Closed")],
                ExpectedSequence::Exactly(Sequence::empty()),
            )
            .await;
        assert!(matches!(stale, Err(JournalError::VersionConflict { .. })));

        journal
            .append(
                vec![record(id, 2, "Closed")],
                ExpectedSequence::after(Sequence::first()),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn streams_of_different_types_share_ids_independently() {
        let journal = InMemoryJournal::new();
        let id = AggregateId::new();

        journal
            .append(
                vec![record_in("Gadget", id, 1, "Assembled"), record_in("Gadget", id, 2, "Boxed")],
                ExpectedSequence::NoStream,
            )
            .await
            .unwrap();
        journal
            .append(vec![record(id, 1, "Opened")], ExpectedSequence::NoStream)
            .await
            .unwrap();

        let widget = journal.read_stream("Widget", id).await.unwrap();
        assert_eq!(widget.len(), 1);
        assert_eq!(widget[0].kind, "Opened");
        assert_eq!(journal.read_stream("Gadget", id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn gaps_and_mixed_streams_are_refused() {
        let journal = InMemoryJournal::new();
        let id = AggregateId::new();

        let gap = journal
            .append(
                vec![record(id, 1, "A"), record(id, 3, "B")],
                ExpectedSequence::NoStream,
            )
            .await;
        assert!(matches!(gap, Err(JournalError::InvalidBatch(_))));

        let mixed = journal
            .append(
                vec![record(id, 1, "A"), record(AggregateId::new(), 2, "B")],
                ExpectedSequence::NoStream,
            )
            .await;
        assert!(matches!(mixed, Err(JournalError::InvalidBatch(_))));

        let mixed_types = journal
            .append(
                vec![record(id, 1, "A"), record_in("Gadget", id, 2, "B")],
                ExpectedSequence::NoStream,
            )
            .await;
        assert!(matches!(mixed_types, Err(JournalError::InvalidBatch(_))));

        let empty = journal.append(vec![], ExpectedSequence::NoStream).await;
        assert!(matches!(empty, Err(JournalError::InvalidBatch(_))));
        assert!(journal.is_empty().await);
    }

    #[tokio::test]
    async fn query_filters_by_type_and_kind() {
        let journal = InMemoryJournal::new();
        for _ in 0..3 {
            let id = AggregateId::new();
            journal
                .append(
                    vec![record(id, 1, "Opened"), record(id, 2, "Closed")],
                    ExpectedSequence::NoStream,
                )
                .await
                .unwrap();
        }

        let closed = journal
            .query(RecordQuery::new().kind("Closed"))
            .await
            .unwrap();
        assert_eq!(closed.len(), 3);

        let widgets = journal
            .query(RecordQuery::new().stream_type("Widget"))
            .await
            .unwrap();
        assert_eq!(widgets.len(), 6);

        let none = journal
            .query(RecordQuery::new().stream_type("Gadget"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
