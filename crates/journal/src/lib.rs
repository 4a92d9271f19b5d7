//! Append-only journal of versioned record streams.
//!
//! A stream holds the records of one aggregate instance (an order, a saga
//! attempt) and is named by the aggregate's stream type plus its id. Appends carry the sequence the writer last saw, so two writers
//! racing on the same stream cannot both succeed.

pub mod error;
pub mod memory;
pub mod query;
pub mod record;
pub mod store;

pub use common::AggregateId;
pub use error::{JournalError, Result};
pub use memory::InMemoryJournal;
pub use query::RecordQuery;
pub use record::{JournalRecord, RecordBuilder, RecordId, Sequence};
pub use store::{ExpectedSequence, Journal};
