//! Errors raised by model validation.

use thiserror::Error;

use crate::LocationId;

/// Errors produced when a change would break a model invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Setting the parent would make the location its own ancestor.
    #[error("location {location} cannot be placed under {parent}: the hierarchy would contain a cycle")]
    LocationCycle {
        location: LocationId,
        parent: LocationId,
    },

    /// An identifier was empty.
    #[error("{0} identifier must not be empty")]
    EmptyId(&'static str),
}

pub type ModelResult<T> = Result<T, ModelError>;
