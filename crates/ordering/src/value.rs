use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A totally ordered value extracted from a record for comparison.
///
/// A given field always yields the same variant (or [`SortValue::Missing`] for
/// an absent optional value), so cross-variant comparisons only ever place
/// missing values first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Missing,
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Time(DateTime<Utc>),
    Id(Uuid),
}

impl SortValue {
    /// Text value, or `Missing` for `None`.
    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(SortValue::Missing, |s| SortValue::Text(s.to_string()))
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Int(value)
    }
}

impl From<u32> for SortValue {
    fn from(value: u32) -> Self {
        SortValue::Int(i64::from(value))
    }
}

impl From<Decimal> for SortValue {
    fn from(value: Decimal) -> Self {
        SortValue::Decimal(value)
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(value: DateTime<Utc>) -> Self {
        SortValue::Time(value)
    }
}

impl From<Uuid> for SortValue {
    fn from(value: Uuid) -> Self {
        SortValue::Id(value)
    }
}
