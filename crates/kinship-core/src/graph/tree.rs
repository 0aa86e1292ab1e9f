use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use crate::error::{Error, Result};
use crate::id::PersonId;
use crate::person::Person;
use crate::set::PersonSet;
use crate::storage::{EdgeField, PersonStore, Predicate};

/// Collects a person's genealogical subtree.
pub struct TreeCollector {
    store: Arc<dyn PersonStore>,
}

impl TreeCollector {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    /// Returns the person plus every relative reachable through parent or
    /// child edges whose order is at least the person's own.
    ///
    /// The order floor is applied at every expansion step, so the search
    /// never passes through a relative below the floor.
    pub async fn collect(&self, id: &PersonId) -> Result<PersonSet> {
        let target = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(Error::NotFound(*id))?;
        let floor = target.order;

        let mut needed = PersonSet::new();
        needed.insert(target);
        let mut have = PersonSet::new();
        let mut pass = 0usize;

        while have.len() < needed.len() {
            let delta = needed.missing_from(&have);
            have = needed.clone();
            pass += 1;

            let found = try_join_all(delta.iter().map(|person| self.relatives(person.id, floor))).await?;
            let added: usize = found
                .into_iter()
                .map(|relatives| needed.extend_unique(relatives))
                .sum();

            debug!(%id, pass, expanded = delta.len(), added, "subtree expansion pass");
        }

        Ok(needed)
    }

    /// Immediate parents and children of `id` at or above `floor`.
    async fn relatives(&self, id: PersonId, floor: u32) -> Result<Vec<Person>> {
        let parent_filter = [
            Predicate::Contains(EdgeField::Children, id),
            Predicate::OrderAtLeast(floor),
        ];
        let child_filter = [
            Predicate::Contains(EdgeField::Parents, id),
            Predicate::OrderAtLeast(floor),
        ];

        let (mut parents, children) = tokio::try_join!(
            self.store.find_where(&parent_filter),
            self.store.find_where(&child_filter),
        )?;

        parents.extend(children);
        Ok(parents)
    }
}
