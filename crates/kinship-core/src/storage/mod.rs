mod error;
mod memory;
mod surreal;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use surreal::SurrealStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageConfig};
use crate::id::PersonId;
use crate::person::Person;

/// Array fields holding edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeField {
    Parents,
    Children,
}

impl EdgeField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeField::Parents => "parents",
            EdgeField::Children => "children",
        }
    }
}

/// A field predicate understood by every store.
///
/// Slices of predicates are conjunctions; an empty slice matches everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// The record has a `name`.
    NameExists,
    /// The edge array contains the identifier.
    Contains(EdgeField, PersonId),
    /// `order` is greater than or equal to the value.
    OrderAtLeast(u32),
    /// The `children` array is empty.
    NoChildren,
}

impl Predicate {
    /// Evaluates the predicate against a record in memory.
    pub fn matches(&self, person: &Person) -> bool {
        match self {
            Predicate::NameExists => person.name.is_some(),
            Predicate::Contains(EdgeField::Parents, id) => person.parents.contains(id),
            Predicate::Contains(EdgeField::Children, id) => person.children.contains(id),
            Predicate::OrderAtLeast(min) => person.order >= *min,
            Predicate::NoChildren => person.children.is_empty(),
        }
    }
}

/// Removal of one identifier from one edge array of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullOp {
    pub id: PersonId,
    pub field: EdgeField,
    pub value: PersonId,
}

impl PullOp {
    pub fn new(id: PersonId, field: EdgeField, value: PersonId) -> Self {
        Self { id, field, value }
    }
}

/// Record store for person documents.
///
/// Implementations are shared between concurrent readers and the single
/// writer, so every method takes `&self`.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Loads a record by identifier.
    async fn find_by_id(&self, id: &PersonId) -> Result<Option<Person>, StoreError>;

    /// Loads every record matching all predicates.
    async fn find_where(&self, predicates: &[Predicate]) -> Result<Vec<Person>, StoreError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Inserts a new record; fails with `Conflict` if the identifier is taken.
    async fn insert(&self, person: &Person) -> Result<(), StoreError>;

    /// Replaces an existing record; fails with `NotFound` if it is missing.
    async fn update_by_id(&self, id: &PersonId, person: &Person) -> Result<(), StoreError>;

    /// Deletes a record; fails with `NotFound` if it is missing.
    async fn delete_by_id(&self, id: &PersonId) -> Result<(), StoreError>;

    /// Deletes every record.
    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Applies both pulls as one unit: either both take effect or neither.
    ///
    /// Pulling a value that is not present, or from a record that does not
    /// exist, is not an error.
    async fn atomic_pull_pair(&self, first: PullOp, second: PullOp) -> Result<(), StoreError>;
}

/// Opens the store selected by the configuration.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn PersonStore>, StoreError> {
    let store: Arc<dyn PersonStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Surreal => Arc::new(SurrealStore::open(config).await?),
    };
    Ok(store)
}
