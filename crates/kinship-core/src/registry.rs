use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::GuardConfig;
use crate::error::{Error, Result};
use crate::graph::{OrderingEngine, RecomputeReport, RelationGuard, RelationMutator, TreeCollector};
use crate::id::PersonId;
use crate::person::{Person, PersonDraft, PersonPatch};
use crate::storage::{EdgeField, PersonStore, Predicate};

/// Manages person records and the edges between them.
///
/// This is the interface the request layer talks to. Every operation that
/// writes to an existing record runs under one writer lock, held across the
/// edge change and the ordering pass that follows it. Reads never take the
/// lock and may observe a graph whose ordering is still being recomputed.
pub struct PersonRegistry {
    store: Arc<dyn PersonStore>,
    guard: RelationGuard,
    mutator: RelationMutator,
    ordering: OrderingEngine,
    tree: TreeCollector,
    writer: Mutex<()>,
}

impl PersonRegistry {
    /// Creates a registry over the given store.
    pub fn new(store: Arc<dyn PersonStore>, guard: GuardConfig) -> Self {
        Self {
            guard: RelationGuard::new(Arc::clone(&store), guard),
            mutator: RelationMutator::new(Arc::clone(&store)),
            ordering: OrderingEngine::new(Arc::clone(&store)),
            tree: TreeCollector::new(Arc::clone(&store)),
            store,
            writer: Mutex::new(()),
        }
    }

    /// Lists every named person.
    pub async fn list_all(&self) -> Result<Vec<Person>> {
        Ok(self.store.find_where(&[Predicate::NameExists]).await?)
    }

    /// Gets a person by ID.
    pub async fn get(&self, id: &PersonId) -> Result<Person> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(Error::NotFound(*id))
    }

    /// Creates an unconnected person with a fresh identifier.
    pub async fn create(&self, draft: PersonDraft) -> Result<Person> {
        let person = Person::new(draft.name);
        self.store.insert(&person).await?;
        info!(id = %person.id, "person created");
        Ok(person)
    }

    /// Replaces the client-owned fields of a person.
    ///
    /// Edges and order belong to the engine and are kept as stored.
    pub async fn replace(&self, id: &PersonId, draft: PersonDraft) -> Result<Person> {
        let _writer = self.writer.lock().await;

        let mut person = self.get(id).await?;
        person.name = draft.name;
        self.store.update_by_id(id, &person).await?;
        Ok(person)
    }

    /// Applies a partial update. Changing `order` is rejected.
    pub async fn patch(&self, id: &PersonId, patch: PersonPatch) -> Result<Person> {
        let _writer = self.writer.lock().await;

        let mut person = self.get(id).await?;
        if let Some(requested) = patch.order {
            if requested != person.order {
                return Err(Error::ImmutableField {
                    id: *id,
                    stored: person.order,
                    requested,
                });
            }
        }
        if let Some(name) = patch.name {
            person.name = Some(name);
        }
        self.store.update_by_id(id, &person).await?;
        Ok(person)
    }

    /// Deletes a person, first retracting every edge that touches it.
    pub async fn delete(&self, id: &PersonId) -> Result<()> {
        let _writer = self.writer.lock().await;

        let person = self.get(id).await?;
        for parent in &person.parents {
            self.mutator.remove_edge(parent, id).await?;
        }
        for child in &person.children {
            self.mutator.remove_edge(id, child).await?;
        }
        self.store.delete_by_id(id).await?;

        let report = self.ordering.recompute().await?;
        info!(
            %id,
            retracted = person.parents.len() + person.children.len(),
            layers = report.layers,
            "person deleted"
        );
        Ok(())
    }

    /// Deletes every person.
    pub async fn delete_all(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        self.store.delete_all().await?;
        info!("all persons deleted");
        Ok(())
    }

    /// Persons listing `id` among their children.
    pub async fn parents(&self, id: &PersonId) -> Result<Vec<Person>> {
        self.get(id).await?;
        Ok(self
            .store
            .find_where(&[Predicate::Contains(EdgeField::Children, *id)])
            .await?)
    }

    /// Persons listing `id` among their parents.
    pub async fn children(&self, id: &PersonId) -> Result<Vec<Person>> {
        self.get(id).await?;
        Ok(self
            .store
            .find_where(&[Predicate::Contains(EdgeField::Parents, *id)])
            .await?)
    }

    /// Makes `parent` a parent of `child` and recomputes ordering.
    ///
    /// Validation happens before any write. If the ordering pass fails after
    /// the edge was written, the edge stays and [`reorder`](Self::reorder)
    /// can be run again.
    pub async fn add_edge(&self, parent: &PersonId, child: &PersonId) -> Result<RecomputeReport> {
        let _writer = self.writer.lock().await;

        let edge = match self.guard.validate(parent, child).await {
            Ok(edge) => edge,
            Err(e) => {
                warn!(%parent, %child, kind = e.kind().as_str(), "edge rejected: {}", e);
                return Err(e);
            }
        };
        self.mutator.add_edge(edge).await?;

        let report = self.ordering.recompute().await?;
        info!(%parent, %child, layers = report.layers, "edge added");
        Ok(report)
    }

    /// Retracts the edge `parent`→`child` and recomputes ordering.
    ///
    /// Removing an edge that does not exist between two existing persons
    /// succeeds without writing anything.
    pub async fn remove_edge(&self, parent: &PersonId, child: &PersonId) -> Result<()> {
        if parent == child {
            return Err(Error::SameIdentifier(*parent));
        }

        let _writer = self.writer.lock().await;

        let parent_record = self.get(parent).await?;
        let child_record = self.get(child).await?;
        if !parent_record.children.contains(child) && !child_record.parents.contains(parent) {
            debug!(%parent, %child, "edge absent, nothing to remove");
            return Ok(());
        }

        self.mutator.remove_edge(parent, child).await?;

        let report = self.ordering.recompute().await?;
        info!(%parent, %child, layers = report.layers, "edge removed");
        Ok(())
    }

    /// The genealogical subtree of `id`: the person plus every relative
    /// reachable without dropping below the person's order.
    pub async fn subtree(&self, id: &PersonId) -> Result<Vec<Person>> {
        Ok(self.tree.collect(id).await?.into_vec())
    }

    /// Recomputes ordering over the whole graph.
    pub async fn reorder(&self) -> Result<RecomputeReport> {
        let _writer = self.writer.lock().await;
        let report = self.ordering.recompute().await?;
        info!(layers = report.layers, writes = report.writes, "ordering recomputed");
        Ok(report)
    }
}
