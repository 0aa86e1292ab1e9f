//! SurrealDB embedded store.
//!
//! Each person is one document in the `person` table, keyed by the hex form
//! of its identifier:
//!
//! ```text
//! person:⟨5a1b2c3d4e5f60718293a4b5⟩ {
//!     name: "Ada",                 // absent for placeholders
//!     depth: 2,                    // Person::order ("order" is a SurrealQL keyword)
//!     parents: ["..."],
//!     children: ["..."],
//! }
//! ```

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

use crate::config::StorageConfig;
use crate::id::PersonId;
use crate::person::Person;
use crate::set::IdSet;

use super::error::StoreError;
use super::{PersonStore, Predicate, PullOp};

const TABLE: &str = "person";

/// Projection shared by every read; flattens the record id to its key.
const PROJECTION: &str = "record::id(id) AS key, name, depth, parents, children";

/// Document body written to SurrealDB.
#[derive(Debug, Serialize)]
struct PersonDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    depth: u32,
    parents: Vec<String>,
    children: Vec<String>,
}

impl From<&Person> for PersonDoc {
    fn from(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            depth: person.order,
            parents: person.parents.iter().map(PersonId::to_hex).collect(),
            children: person.children.iter().map(PersonId::to_hex).collect(),
        }
    }
}

/// Acknowledgement of a write; the returned document itself is not needed.
#[derive(Debug, Deserialize)]
struct Written {}

/// Row of a `count()` aggregate.
#[derive(Debug, Deserialize)]
struct CountRow {
    count: usize,
}

/// Document as read back through [`PROJECTION`].
#[derive(Debug, Deserialize)]
struct PersonRow {
    key: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    depth: u32,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    children: Vec<String>,
}

impl TryFrom<PersonRow> for Person {
    type Error = StoreError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        Ok(Person {
            id: parse_stored(&row.key)?,
            name: row.name,
            order: row.depth,
            parents: parse_stored_set(&row.parents)?,
            children: parse_stored_set(&row.children)?,
        })
    }
}

fn parse_stored(raw: &str) -> Result<PersonId, StoreError> {
    PersonId::parse(raw).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn parse_stored_set(raw: &[String]) -> Result<IdSet, StoreError> {
    raw.iter().map(|id| parse_stored(id)).collect()
}

/// Renders a predicate conjunction as a SurrealQL condition plus bindings.
fn where_clause(predicates: &[Predicate]) -> (String, Vec<(String, Value)>) {
    let mut conditions = Vec::with_capacity(predicates.len());
    let mut bindings = Vec::new();

    for (i, predicate) in predicates.iter().enumerate() {
        let param = format!("p{}", i);
        match predicate {
            Predicate::NameExists => conditions.push("name != NONE".to_string()),
            Predicate::Contains(field, id) => {
                conditions.push(format!("{} CONTAINS ${}", field.as_str(), param));
                bindings.push((param, Value::from(id.to_hex())));
            }
            Predicate::OrderAtLeast(min) => {
                conditions.push(format!("depth >= ${}", param));
                bindings.push((param, Value::from(*min)));
            }
            Predicate::NoChildren => conditions.push("array::len(children) = 0".to_string()),
        }
    }

    let sql = if conditions.is_empty() {
        format!("SELECT {} FROM {}", PROJECTION, TABLE)
    } else {
        format!(
            "SELECT {} FROM {} WHERE {}",
            PROJECTION,
            TABLE,
            conditions.join(" AND ")
        )
    };
    (sql, bindings)
}

/// Person store on an embedded SurrealDB instance.
pub struct SurrealStore {
    db: Surreal<Db>,
}

impl SurrealStore {
    /// Opens (or creates) a RocksDB-backed store at the configured path.
    pub async fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        let db = Surreal::new::<RocksDb>(config.database_path()).await?;
        Self::prepare(db, &config.namespace, &config.database).await
    }

    /// Opens a RocksDB-backed store at an explicit path.
    pub async fn open_path(path: &Path) -> Result<Self, StoreError> {
        let db = Surreal::new::<RocksDb>(path).await?;
        Self::prepare(db, crate::config::DEFAULT_NAMESPACE, crate::config::DEFAULT_DATABASE).await
    }

    /// Opens a non-persistent store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let db = Surreal::new::<Mem>(()).await?;
        Self::prepare(db, crate::config::DEFAULT_NAMESPACE, crate::config::DEFAULT_DATABASE).await
    }

    async fn prepare(db: Surreal<Db>, namespace: &str, database: &str) -> Result<Self, StoreError> {
        db.use_ns(namespace).use_db(database).await?;

        db.query(
            r#"
            DEFINE TABLE IF NOT EXISTS person SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS person_parents ON person FIELDS parents;
            DEFINE INDEX IF NOT EXISTS person_children ON person FIELDS children;
            DEFINE INDEX IF NOT EXISTS person_depth ON person FIELDS depth;
            "#,
        )
        .await?
        .check()?;

        Ok(Self { db })
    }
}

#[async_trait]
impl PersonStore for SurrealStore {
    async fn find_by_id(&self, id: &PersonId) -> Result<Option<Person>, StoreError> {
        let row: Option<PersonRow> = self
            .db
            .query(format!("SELECT {} FROM type::thing($table, $id)", PROJECTION))
            .bind(("table", TABLE))
            .bind(("id", id.to_hex()))
            .await?
            .take(0)?;
        row.map(Person::try_from).transpose()
    }

    async fn find_where(&self, predicates: &[Predicate]) -> Result<Vec<Person>, StoreError> {
        let (sql, bindings) = where_clause(predicates);

        let mut query = self.db.query(sql);
        for binding in bindings {
            query = query.bind(binding);
        }

        let rows: Vec<PersonRow> = query.await?.take(0)?;
        rows.into_iter().map(Person::try_from).collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row: Option<CountRow> = self
            .db
            .query(format!("SELECT count() FROM {} GROUP ALL", TABLE))
            .await?
            .take(0)?;
        // an empty table yields no row at all
        Ok(row.map_or(0, |r| r.count))
    }

    async fn insert(&self, person: &Person) -> Result<(), StoreError> {
        if self.find_by_id(&person.id).await?.is_some() {
            return Err(StoreError::Conflict(person.id));
        }

        let _: Option<Written> = self
            .db
            .create((TABLE, person.id.to_hex()))
            .content(PersonDoc::from(person))
            .await?;
        Ok(())
    }

    async fn update_by_id(&self, id: &PersonId, person: &Person) -> Result<(), StoreError> {
        let updated: Option<Written> = self
            .db
            .update((TABLE, id.to_hex()))
            .content(PersonDoc::from(person))
            .await?;
        updated.map(|_| ()).ok_or(StoreError::NotFound(*id))
    }

    async fn delete_by_id(&self, id: &PersonId) -> Result<(), StoreError> {
        let deleted: Option<Written> = self.db.delete((TABLE, id.to_hex())).await?;
        deleted.map(|_| ()).ok_or(StoreError::NotFound(*id))
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let _: Vec<Written> = self.db.delete(TABLE).await?;
        Ok(())
    }

    async fn atomic_pull_pair(&self, first: PullOp, second: PullOp) -> Result<(), StoreError> {
        // Field names come from EdgeField, never from user input.
        let sql = format!(
            r#"
            BEGIN TRANSACTION;
            UPDATE type::thing($table, $first_id) SET {} -= $first_value;
            UPDATE type::thing($table, $second_id) SET {} -= $second_value;
            COMMIT TRANSACTION;
            "#,
            first.field.as_str(),
            second.field.as_str(),
        );

        self.db
            .query(sql)
            .bind(("table", TABLE))
            .bind(("first_id", first.id.to_hex()))
            .bind(("first_value", first.value.to_hex()))
            .bind(("second_id", second.id.to_hex()))
            .bind(("second_value", second.value.to_hex()))
            .await?
            .check()?;
        Ok(())
    }
}
