//! Engine error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::PersonId;
use crate::storage::StoreError;

/// Machine-checkable category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidIdentifier,
    NotFound,
    SameIdentifier,
    DuplicateEdge,
    OrderViolation,
    StoreUnavailable,
    ImmutableFieldViolation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidIdentifier => "InvalidIdentifier",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::SameIdentifier => "SameIdentifier",
            ErrorKind::DuplicateEdge => "DuplicateEdge",
            ErrorKind::OrderViolation => "OrderViolation",
            ErrorKind::StoreUnavailable => "StoreUnavailable",
            ErrorKind::ImmutableFieldViolation => "ImmutableFieldViolation",
        }
    }
}

/// Errors returned by the genealogy engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid identifier: {0:?} is not 24 hexadecimal characters")]
    InvalidIdentifier(String),

    #[error("Person not found: {0}")]
    NotFound(PersonId),

    #[error("A person cannot be their own parent: {0}")]
    SameIdentifier(PersonId),

    #[error("Relation already exists: {parent} is already a parent of {child}")]
    DuplicateEdge { parent: PersonId, child: PersonId },

    #[error("Order violation: {parent} (order {parent_order}) cannot become a parent of {child} (order {child_order})")]
    OrderViolation {
        parent: PersonId,
        child: PersonId,
        parent_order: u32,
        child_order: u32,
    },

    #[error("Cycle detected: {child} is already an ancestor of {parent}")]
    CycleDetected { parent: PersonId, child: PersonId },

    #[error("Graph contains a cycle: ordering did not settle after {layers} layers")]
    UnsettledOrdering { layers: u32 },

    #[error("The order of {id} is computed and cannot be changed (stored {stored}, requested {requested})")]
    ImmutableField {
        id: PersonId,
        stored: u32,
        requested: u32,
    },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::SameIdentifier(_) => ErrorKind::SameIdentifier,
            Error::DuplicateEdge { .. } => ErrorKind::DuplicateEdge,
            Error::OrderViolation { .. }
            | Error::CycleDetected { .. }
            | Error::UnsettledOrdering { .. } => ErrorKind::OrderViolation,
            Error::ImmutableField { .. } => ErrorKind::ImmutableFieldViolation,
            Error::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Error::NotFound(id),
            other => Error::StoreUnavailable(other.to_string()),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
