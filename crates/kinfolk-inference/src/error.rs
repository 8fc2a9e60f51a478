//! Error types for inference and relationship operations

use kinfolk_domain::{EdgeId, PersonId, RelationError};
use thiserror::Error;

/// Errors that can occur while confirming or propagating relationships
///
/// Per-candidate conditions met during propagation (unknown code, unknown
/// gender, self-loop, duplicate) are recorded as skips in a
/// [`crate::PropagationReport`]; these variants surface only when they apply
/// to the operation itself.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Relation code not present in the catalog
    #[error("Unknown relation type: {0}")]
    UnknownRelationType(String),

    /// A gender-specific code was needed but gender is unknown
    #[error("Gender could not be resolved: {0}")]
    UnresolvedGender(String),

    /// Subject and object are the same person
    #[error("Person {0} cannot be related to themself")]
    SelfRelationship(PersonId),

    /// An accepted edge already exists for the ordered pair
    #[error("Accepted edge already exists from {subject} to {object}")]
    DuplicateEdge {
        /// Subject of the existing edge
        subject: PersonId,
        /// Object of the existing edge
        object: PersonId,
    },

    /// Storage failed while committing a pass; nothing from it was kept
    #[error("Transaction failed: {0}")]
    TransactionFailure(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Person does not exist in the directory
    #[error("Person not found: {0}")]
    PersonNotFound(PersonId),

    /// Edge does not exist
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// Request is no longer pending
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<RelationError> for InferenceError {
    fn from(err: RelationError) -> Self {
        match err {
            RelationError::UnknownRelationType(code) => InferenceError::UnknownRelationType(code),
            RelationError::UnresolvedGender(what) => InferenceError::UnresolvedGender(what),
        }
    }
}

impl InferenceError {
    /// Whether retrying the same operation later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, InferenceError::TransactionFailure(_) | InferenceError::Store(_))
    }
}
