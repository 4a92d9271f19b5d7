use std::cmp::Ordering;
use std::collections::HashSet;

use crate::{OrderingError, SortValue};

/// Pulls one comparable value out of a record.
pub type Extractor<T> = fn(&T) -> SortValue;

/// A named, sortable field of an entity.
pub struct Field<T: 'static> {
    name: &'static str,
    extract: Extractor<T>,
}

impl<T> Field<T> {
    /// Declares a field; `name` is matched case-insensitively and should be
    /// written in lower case.
    pub const fn new(name: &'static str, extract: Extractor<T>) -> Self {
        Self { name, extract }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Static mapping from field names to extractors for one entity, plus the
/// order used when a request names no usable field.
pub struct FieldTable<T: 'static> {
    entity: &'static str,
    fields: &'static [Field<T>],
    default_order: fn(&T, &T) -> Ordering,
}

impl<T> FieldTable<T> {
    pub const fn new(
        entity: &'static str,
        fields: &'static [Field<T>],
        default_order: fn(&T, &T) -> Ordering,
    ) -> Self {
        Self {
            entity,
            fields,
            default_order,
        }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Case-insensitive lookup of a field.
    pub fn lookup(&self, name: &str) -> Option<(&'static str, Extractor<T>)> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| (f.name, f.extract))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn default_order(&self) -> fn(&T, &T) -> Ordering {
        self.default_order
    }

    /// Checks that names are non-empty, lower-case, dot-free and unique.
    ///
    /// Run once at startup for every table the process serves.
    pub fn validate(&self) -> Result<(), OrderingError> {
        let mut seen = HashSet::new();
        for field in self.fields {
            if field.name.is_empty() || field.name.contains('.') {
                return Err(OrderingError::InvalidFieldName {
                    entity: self.entity,
                });
            }
            if field.name.chars().any(char::is_uppercase) {
                return Err(OrderingError::FieldNameNotLowercase {
                    entity: self.entity,
                    field: field.name,
                });
            }
            if !seen.insert(field.name) {
                return Err(OrderingError::DuplicateField {
                    entity: self.entity,
                    field: field.name,
                });
            }
        }
        Ok(())
    }
}
