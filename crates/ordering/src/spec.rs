use crate::{Extractor, FieldTable};

/// Sort direction of a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Parses `asc` / `desc` in any letter case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}

/// A well-formed `field.direction` token, not yet checked against any table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortToken {
    pub field: String,
    pub direction: Direction,
}

/// The well-formed tokens of an ordering string, in the order given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    tokens: Vec<SortToken>,
}

impl SortSpec {
    /// Splits on whitespace and keeps tokens of the exact form
    /// `<field>.<asc|desc>`. Everything else is dropped.
    pub fn parse(spec: &str) -> Self {
        let tokens = spec
            .split_whitespace()
            .filter_map(|raw| {
                let parts: Vec<&str> = raw.split('.').collect();
                let token = match parts.as_slice() {
                    [field, direction] => Direction::parse(direction).map(|direction| SortToken {
                        field: (*field).to_string(),
                        direction,
                    }),
                    _ => None,
                };
                if token.is_none() {
                    tracing::debug!(token = raw, "dropping malformed ordering token");
                }
                token
            })
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[SortToken] {
        &self.tokens
    }

    /// Resolves tokens against `table`, dropping unknown fields.
    pub fn resolve<T>(&self, table: &FieldTable<T>) -> Vec<SortKey<T>> {
        self.tokens
            .iter()
            .filter_map(|token| match table.lookup(&token.field) {
                Some((field, extract)) => Some(SortKey {
                    field,
                    extract,
                    direction: token.direction,
                }),
                None => {
                    tracing::debug!(
                        entity = table.entity(),
                        field = %token.field,
                        "dropping ordering token for unknown field"
                    );
                    None
                }
            })
            .collect()
    }
}

/// A usable key: a known field plus its direction.
pub struct SortKey<T: 'static> {
    pub field: &'static str,
    pub extract: Extractor<T>,
    pub direction: Direction,
}

impl<T> std::fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortKey")
            .field("field", &self.field)
            .field("direction", &self.direction)
            .finish()
    }
}
