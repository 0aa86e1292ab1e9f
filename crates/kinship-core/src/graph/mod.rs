//! The relationship-consistency and ordering engine.
//!
//! - [`RelationGuard`] validates a proposed parent→child edge (read-only)
//! - [`RelationMutator`] writes or retracts an edge on both endpoints
//! - [`OrderingEngine`] recomputes every record's generation order
//! - [`TreeCollector`] materializes a person's genealogical subtree
//!
//! Every component holds its own handle to the record store and re-reads the
//! graph on each call; none of them keeps state between calls. Serializing
//! mutations is the caller's job (see [`crate::PersonRegistry`]).

mod guard;
mod mutator;
mod ordering;
mod tree;

pub use guard::{RelationGuard, ValidatedEdge};
pub use mutator::RelationMutator;
pub use ordering::{OrderingEngine, RecomputeReport};
pub use tree::TreeCollector;
