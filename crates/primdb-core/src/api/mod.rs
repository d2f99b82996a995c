//! Public API: the query engine, equality clauses, validation and the read cache.

pub mod cache;
pub mod engine;
pub mod filter;
pub mod validate;

pub use cache::{CacheStats, QueryCache};
pub use engine::{QueryEngine, TableInfo, join_ids};
pub use filter::Clause;
pub use validate::{validate, validate_value};
