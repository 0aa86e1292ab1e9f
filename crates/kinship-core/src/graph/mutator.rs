use std::sync::Arc;

use tracing::warn;

use crate::error::Result;
use crate::id::PersonId;
use crate::storage::{EdgeField, PersonStore, PullOp};

use super::guard::ValidatedEdge;

/// Applies and retracts edges on both endpoint records.
pub struct RelationMutator {
    store: Arc<dyn PersonStore>,
}

impl RelationMutator {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    /// Appends the child to the parent's `children` and the parent to the
    /// child's `parents`, then persists both records.
    ///
    /// If the child write fails, the child is pulled back out of the parent
    /// so that neither side holds the edge and the call can be retried.
    pub async fn add_edge(&self, edge: ValidatedEdge) -> Result<()> {
        let ValidatedEdge {
            mut parent,
            mut child,
        } = edge;

        parent.children.insert(child.id);
        child.parents.insert(parent.id);

        self.store.update_by_id(&parent.id, &parent).await?;
        if let Err(e) = self.store.update_by_id(&child.id, &child).await {
            if let Err(rollback) = self.remove_edge(&parent.id, &child.id).await {
                warn!(
                    parent = %parent.id,
                    child = %child.id,
                    "edge left on the parent only: {}",
                    rollback
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Pulls the edge from both records in one atomic store operation.
    pub async fn remove_edge(&self, parent_id: &PersonId, child_id: &PersonId) -> Result<()> {
        self.store
            .atomic_pull_pair(
                PullOp::new(*parent_id, EdgeField::Children, *child_id),
                PullOp::new(*child_id, EdgeField::Parents, *parent_id),
            )
            .await?;
        Ok(())
    }
}
