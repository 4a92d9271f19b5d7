//! Ordering engine for listings.
//!
//! A listing request carries a free-text ordering such as
//! `"price.desc name.asc"`. The first usable token is the primary key and every
//! later one breaks ties among records the earlier keys left equal. Tokens that
//! are malformed or name an unknown field are dropped without error; when none
//! survive, the entity's default order applies.
//!
//! Fields are resolved through a static [`FieldTable`] per entity rather than by
//! runtime reflection.

pub mod engine;
pub mod error;
pub mod spec;
pub mod table;
pub mod value;

pub use engine::sort;
pub use error::OrderingError;
pub use spec::{Direction, SortKey, SortSpec, SortToken};
pub use table::{Extractor, Field, FieldTable};
pub use value::SortValue;
