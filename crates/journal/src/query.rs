use crate::JournalRecord;

/// Filter over journal records; every unset field matches everything.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    pub stream_type: Option<String>,
    /// Any of these kinds.
    pub kinds: Option<Vec<String>>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream_type(mut self, stream_type: impl Into<String>) -> Self {
        self.stream_type = Some(stream_type.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kinds.get_or_insert_with(Vec::new).push(kind.into());
        self
    }

    pub fn matches(&self, record: &JournalRecord) -> bool {
        if let Some(ref stream_type) = self.stream_type
            && &record.stream_type != stream_type
        {
            return false;
        }
        if let Some(ref kinds) = self.kinds
            && !kinds.contains(&record.kind)
        {
            return false;
        }
        true
    }
}
