use serde::{Deserialize, Serialize};

use crate::id::PersonId;
use crate::set::IdSet;

/// A person record in the genealogical graph.
///
/// `parents` and `children` are owned by the graph engine: they only change
/// through edge operations, which keep both endpoints symmetric. `order` is
/// the generation depth computed by the ordering engine (`0` until computed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier
    pub id: PersonId,
    /// Display label; placeholders may have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Generation depth, larger values are older generations
    #[serde(default)]
    pub order: u32,
    /// Identifiers of this person's parents
    #[serde(default)]
    pub parents: IdSet,
    /// Identifiers of this person's children
    #[serde(default)]
    pub children: IdSet,
}

impl Person {
    /// Creates a new unconnected person with a fresh identifier.
    pub fn new(name: Option<String>) -> Self {
        Self::with_id(PersonId::generate(), name)
    }

    /// Creates a new unconnected person with the given identifier.
    pub fn with_id(id: PersonId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            order: 0,
            parents: IdSet::new(),
            children: IdSet::new(),
        }
    }

    /// True when the person takes part in at least one edge.
    pub fn has_edges(&self) -> bool {
        !self.parents.is_empty() || !self.children.is_empty()
    }

    /// True when the person has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Client-supplied fields for creating or replacing a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDraft {
    #[serde(default)]
    pub name: Option<String>,
}

impl PersonDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Partial update of a person.
///
/// `order` is accepted only so that a client echoing a full record back does
/// not fail; any value other than the stored one is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}
