use std::sync::Arc;

use crate::config::GuardConfig;
use crate::error::{Error, Result};
use crate::id::PersonId;
use crate::person::Person;
use crate::set::IdSet;
use crate::storage::PersonStore;

/// A parent→child edge that passed validation, with both records as read.
///
/// Only [`RelationGuard::validate`] builds one, so the mutator cannot be
/// handed an unchecked edge.
#[derive(Debug, Clone)]
pub struct ValidatedEdge {
    pub(super) parent: Person,
    pub(super) child: Person,
}

impl ValidatedEdge {
    pub fn parent(&self) -> &Person {
        &self.parent
    }

    pub fn child(&self) -> &Person {
        &self.child
    }
}

/// Validates proposed edges against the current graph.
pub struct RelationGuard {
    store: Arc<dyn PersonStore>,
    config: GuardConfig,
}

impl RelationGuard {
    pub fn new(store: Arc<dyn PersonStore>, config: GuardConfig) -> Self {
        Self { store, config }
    }

    /// Checks, in order: distinct ids, both records exist, edge not present,
    /// order consistency, and (if enabled) that the child is not already an
    /// ancestor of the parent.
    ///
    /// The order check only applies to a parent that already has edges: an
    /// unconnected record may become anyone's parent.
    pub async fn validate(&self, parent_id: &PersonId, child_id: &PersonId) -> Result<ValidatedEdge> {
        if parent_id == child_id {
            return Err(Error::SameIdentifier(*parent_id));
        }

        let parent = self.load(parent_id).await?;
        let child = self.load(child_id).await?;

        if parent.children.contains(child_id) || child.parents.contains(parent_id) {
            return Err(Error::DuplicateEdge {
                parent: *parent_id,
                child: *child_id,
            });
        }

        if parent.order < child.order && parent.has_edges() {
            return Err(Error::OrderViolation {
                parent: *parent_id,
                child: *child_id,
                parent_order: parent.order,
                child_order: child.order,
            });
        }

        if self.config.detect_cycles && self.is_ancestor(child_id, &parent).await? {
            return Err(Error::CycleDetected {
                parent: *parent_id,
                child: *child_id,
            });
        }

        Ok(ValidatedEdge { parent, child })
    }

    async fn load(&self, id: &PersonId) -> Result<Person> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(Error::NotFound(*id))
    }

    /// Walks `parents` upward from `start` looking for `candidate`.
    async fn is_ancestor(&self, candidate: &PersonId, start: &Person) -> Result<bool> {
        let mut seen = IdSet::new();
        let mut pending: Vec<PersonId> = start.parents.iter().copied().collect();

        while let Some(id) = pending.pop() {
            if id == *candidate {
                return Ok(true);
            }
            if !seen.insert(id) {
                continue;
            }
            // Dangling references are skipped, not reported.
            if let Some(ancestor) = self.store.find_by_id(&id).await? {
                pending.extend(ancestor.parents.iter().copied());
            }
        }

        Ok(false)
    }
}
