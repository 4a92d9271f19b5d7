//! Loading and saving aggregates through the journal.

use std::marker::PhantomData;

use common::AggregateId;
use journal::{ExpectedSequence, Journal, JournalRecord, Sequence};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Aggregate state after a command together with the records it produced.
#[derive(Debug)]
pub struct Committed<A: Aggregate> {
    pub aggregate: A,
    pub events: Vec<A::Event>,
    pub sequence: Sequence,
}

/// Replays and appends the journal stream of one aggregate type.
pub struct Repository<J, A>
where
    J: Journal,
    A: Aggregate,
{
    journal: J,
    _aggregate: PhantomData<A>,
}

impl<J, A> Repository<J, A>
where
    J: Journal,
    A: Aggregate,
{
    pub fn new(journal: J) -> Self {
        Self {
            journal,
            _aggregate: PhantomData,
        }
    }

    pub fn journal(&self) -> &J {
        &self.journal
    }

    /// Rebuilds the aggregate; a missing stream yields the default state.
    pub async fn load(&self, id: AggregateId) -> Result<A, DomainError> {
        let records = self.journal.read_stream(A::stream_type(), id).await?;
        let mut aggregate = A::default();
        for record in records {
            aggregate.apply(record.decode::<A::Event>()?);
            aggregate.set_sequence(record.sequence);
        }
        Ok(aggregate)
    }

    pub async fn load_existing(&self, id: AggregateId) -> Result<Option<A>, DomainError> {
        let aggregate = self.load(id).await?;
        Ok(aggregate.id().is_some().then_some(aggregate))
    }

    /// Runs `command` against the current state and appends what it emits.
    ///
    /// The append expects the stream to still end where it was loaded, so a
    /// concurrent writer makes this call fail instead of being overwritten.
    pub async fn execute<F>(&self, id: AggregateId, command: F) -> Result<Committed<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(id).await?;
        let current = aggregate.sequence();
        let events = command(&aggregate)?;

        if events.is_empty() {
            return Ok(Committed {
                aggregate,
                events,
                sequence: current,
            });
        }

        let records = self.records_for(id, current, &events)?;
        let sequence = self
            .journal
            .append(records, ExpectedSequence::after(current))
            .await?;

        aggregate.apply_all(events.iter().cloned());
        aggregate.set_sequence(sequence);

        Ok(Committed {
            aggregate,
            events,
            sequence,
        })
    }

    fn records_for(
        &self,
        id: AggregateId,
        current: Sequence,
        events: &[A::Event],
    ) -> Result<Vec<JournalRecord>, DomainError> {
        let mut sequence = current;
        events
            .iter()
            .map(|event| {
                sequence = sequence.next();
                Ok(JournalRecord::builder()
                    .kind(event.kind())
                    .stream(A::stream_type(), id)
                    .sequence(sequence)
                    .payload(event)?
                    .build()?)
            })
            .collect()
    }
}
