use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::set::PersonSet;
use crate::storage::{EdgeField, PersonStore, Predicate};

/// Outcome of one ordering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeReport {
    /// Number of layers assigned; the highest order written.
    pub layers: u32,
    /// Number of record writes performed.
    pub writes: usize,
}

/// Recomputes the generation order of every record.
///
/// Orders are assigned layer by layer, starting from the leaves (order 1)
/// and moving to the parents of the previous layer. A record reached through
/// chains of different lengths is written once per layer that reaches it, so
/// the last layer to reach it wins.
pub struct OrderingEngine {
    store: Arc<dyn PersonStore>,
}

impl OrderingEngine {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    /// Runs a full pass over the current edge set.
    ///
    /// The result depends only on the edges, so running it twice without an
    /// edge change in between writes the same orders. A graph containing a
    /// cycle cannot settle; the pass stops with an error once the layer count
    /// exceeds the number of records.
    pub async fn recompute(&self) -> Result<RecomputeReport> {
        let total = self.store.count().await?;
        let mut frontier: PersonSet = self
            .store
            .find_where(&[Predicate::NoChildren])
            .await?
            .into_iter()
            .collect();

        let mut report = RecomputeReport::default();
        let mut layer: u32 = 1;

        while !frontier.is_empty() {
            if layer as usize > total {
                return Err(Error::UnsettledOrdering { layers: layer });
            }

            debug!(layer, size = frontier.len(), "assigning order layer");
            let mut next = PersonSet::new();

            for mut person in frontier {
                person.order = layer;
                self.store.update_by_id(&person.id, &person).await?;
                report.writes += 1;

                if person.parents.is_empty() {
                    continue;
                }
                let parents = self
                    .store
                    .find_where(&[Predicate::Contains(EdgeField::Children, person.id)])
                    .await?;
                next.extend_unique(parents);
            }

            report.layers = layer;
            frontier = next;
            layer += 1;
        }

        Ok(report)
    }
}
