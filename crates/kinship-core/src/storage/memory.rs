use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::id::PersonId;
use crate::person::Person;
use crate::set::IdSet;

use super::error::StoreError;
use super::{EdgeField, PersonStore, Predicate, PullOp};

/// In-process store backed by an ordered map.
///
/// Used for tests and for `backend = "memory"`. Records are cloned in and
/// out, so callers never hold references into the map. The store can be
/// switched offline, or made to reject updates of chosen records, to
/// exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<PersonId, Person>>,
    offline: AtomicBool,
    rejected_updates: RwLock<IdSet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `Unavailable` until reset.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes `update_by_id` of one record fail with `Unavailable` until reset.
    /// Reads and pulls on that record keep working.
    pub async fn reject_updates_of(&self, id: PersonId, reject: bool) {
        let mut rejected = self.rejected_updates.write().await;
        if reject {
            rejected.insert(id);
        } else {
            rejected.remove(&id);
        }
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

fn pull(record: &mut Person, field: EdgeField, value: &PersonId) {
    match field {
        EdgeField::Parents => record.parents.remove(value),
        EdgeField::Children => record.children.remove(value),
    };
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn find_by_id(&self, id: &PersonId) -> Result<Option<Person>, StoreError> {
        self.check_online()?;
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_where(&self, predicates: &[Predicate]) -> Result<Vec<Person>, StoreError> {
        self.check_online()?;
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|person| predicates.iter().all(|p| p.matches(person)))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.check_online()?;
        Ok(self.records.read().await.len())
    }

    async fn insert(&self, person: &Person) -> Result<(), StoreError> {
        self.check_online()?;
        let mut records = self.records.write().await;
        if records.contains_key(&person.id) {
            return Err(StoreError::Conflict(person.id));
        }
        records.insert(person.id, person.clone());
        Ok(())
    }

    async fn update_by_id(&self, id: &PersonId, person: &Person) -> Result<(), StoreError> {
        self.check_online()?;
        if self.rejected_updates.read().await.contains(id) {
            return Err(StoreError::Unavailable(format!("update of {} rejected", id)));
        }
        let mut records = self.records.write().await;
        let slot = records.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        *slot = Person {
            id: *id,
            ..person.clone()
        };
        Ok(())
    }

    async fn delete_by_id(&self, id: &PersonId) -> Result<(), StoreError> {
        self.check_online()?;
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(*id))
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.check_online()?;
        self.records.write().await.clear();
        Ok(())
    }

    async fn atomic_pull_pair(&self, first: PullOp, second: PullOp) -> Result<(), StoreError> {
        self.check_online()?;
        // One write guard spans both pulls, so readers never see half of the pair.
        let mut records = self.records.write().await;
        for op in [first, second] {
            if let Some(record) = records.get_mut(&op.id) {
                pull(record, op.field, &op.value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = MemoryStore::new();
        let person = Person::new(Some("Ada".to_string()));
        store.insert(&person).await.unwrap();

        store.set_offline(true);
        assert!(matches!(
            store.find_by_id(&person.id).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.find_where(&[]).await.is_err());

        store.set_offline(false);
        assert!(store.find_by_id(&person.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_pull_pair_skips_missing_record() {
        let store = MemoryStore::new();
        let mut parent = Person::new(None);
        let ghost = PersonId::generate();
        parent.children.insert(ghost);
        store.insert(&parent).await.unwrap();

        store
            .atomic_pull_pair(
                PullOp::new(parent.id, EdgeField::Children, ghost),
                PullOp::new(ghost, EdgeField::Parents, parent.id),
            )
            .await
            .unwrap();

        let stored = store.find_by_id(&parent.id).await.unwrap().unwrap();
        assert!(stored.children.is_empty());
        assert!(store.find_by_id(&ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_updates_hit_one_record() {
        let store = MemoryStore::new();
        let a = Person::new(Some("A".to_string()));
        let b = Person::new(Some("B".to_string()));
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();

        store.reject_updates_of(b.id, true).await;
        assert!(matches!(
            store.update_by_id(&b.id, &b).await,
            Err(StoreError::Unavailable(_))
        ));
        store.update_by_id(&a.id, &a).await.unwrap();
        assert!(store.find_by_id(&b.id).await.unwrap().is_some());

        store.reject_updates_of(b.id, false).await;
        store.update_by_id(&b.id, &b).await.unwrap();
    }
}
