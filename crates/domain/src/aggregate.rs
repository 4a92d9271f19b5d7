//! Event-sourced aggregate traits.

use common::AggregateId;
use journal::Sequence;
use serde::{Serialize, de::DeserializeOwned};

/// A fact recorded against an aggregate, named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Record kind stored in the journal and used for queries.
    fn kind(&self) -> &'static str;
}

/// An aggregate rebuilt by replaying its journal stream.
///
/// `apply` must be pure: replaying the same records always yields the same
/// state, and it never fails because the records are facts.
pub trait Aggregate: Default + Send + Sync + Sized {
    type Event: DomainEvent;
    type Error: std::error::Error + Send + Sync;

    /// Stream type under which the aggregate's records are stored.
    fn stream_type() -> &'static str;

    /// `None` until the first record has been applied.
    fn id(&self) -> Option<AggregateId>;

    fn sequence(&self) -> Sequence;

    fn set_sequence(&mut self, sequence: Sequence);

    fn apply(&mut self, event: Self::Event);

    fn apply_all(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}
