use thiserror::Error;

/// Problems found when validating a field table at startup.
///
/// Sorting itself never fails; an unusable ordering degrades to the default.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderingError {
    #[error("{entity} field table declares '{field}' more than once")]
    DuplicateField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity} field table entry '{field}' must be lower-case")]
    FieldNameNotLowercase {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity} field table has an empty or dotted field name")]
    InvalidFieldName { entity: &'static str },
}
