pub mod config;
pub mod error;
pub mod graph;
pub mod id;
pub mod person;
pub mod registry;
pub mod set;
pub mod storage;

pub use config::{Config, GuardConfig, ServerConfig, StorageBackend, StorageConfig};
pub use error::{Error, ErrorKind, Result};
pub use graph::{OrderingEngine, RecomputeReport, RelationGuard, RelationMutator, TreeCollector};
pub use id::PersonId;
pub use person::{Person, PersonDraft, PersonPatch};
pub use registry::PersonRegistry;
pub use set::{IdSet, PersonSet};
pub use storage::{open_store, MemoryStore, PersonStore, StoreError, SurrealStore};
