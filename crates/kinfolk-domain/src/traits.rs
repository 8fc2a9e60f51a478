//! Trait definitions for external interactions
//!
//! These traits are the boundary between the relationship rules and the
//! profile store, the edge store and optional hint providers. Implementations
//! live in other crates.

use crate::{EdgeId, EdgePair, EdgeStatus, NewEdge, Person, PersonId, RelationCode, RelationshipEdge};
use std::time::Duration;

/// Read access to person profiles
pub trait PersonDirectory {
    /// Error type for directory operations
    type Error;

    /// Get a person by ID
    fn get_person(&self, id: PersonId) -> Result<Option<Person>, Self::Error>;
}

/// Storage for relationship edges
///
/// Implementations must enforce at most one accepted edge per ordered
/// `(subject, object)` pair and reject self-loops.
pub trait EdgeStore {
    /// Error type for store operations
    type Error;

    /// Every accepted edge touching `person`, in either direction
    fn find_accepted(&self, person: PersonId) -> Result<Vec<RelationshipEdge>, Self::Error>;

    /// Whether an accepted edge `(subject, object, *)` exists
    fn exists(&self, subject: PersonId, object: PersonId) -> Result<bool, Self::Error>;

    /// Get an edge by ID
    fn get_edge(&self, id: EdgeId) -> Result<Option<RelationshipEdge>, Self::Error>;

    /// Insert a single edge
    fn insert(&mut self, edge: NewEdge) -> Result<EdgeId, Self::Error>;

    /// Commit a batch of forward/inverse pairs in one transaction
    ///
    /// Existence is checked inside the transaction: a pair whose forward
    /// edge already exists is skipped, and an inverse that already exists is
    /// left untouched. Any storage failure rolls back the whole batch.
    /// Returns the edges actually created.
    fn commit_pairs(&mut self, pairs: &[EdgePair]) -> Result<Vec<RelationshipEdge>, Self::Error>;

    /// Change the status of an edge (accepting enforces pair uniqueness)
    fn set_status(&mut self, id: EdgeId, status: EdgeStatus) -> Result<RelationshipEdge, Self::Error>;

    /// Accept a pending edge and write its inverse in one transaction
    ///
    /// The inverse is skipped if the reverse pair already has an accepted
    /// edge. On failure neither change is kept. Returns the accepted edge
    /// followed by the inverse, if one was written.
    fn accept_pending(
        &mut self,
        id: EdgeId,
        inverse: Option<RelationCode>,
    ) -> Result<Vec<RelationshipEdge>, Self::Error>;

    /// Delete both directions between two persons; returns edges removed
    fn delete_pair(&mut self, a: PersonId, b: PersonId) -> Result<usize, Self::Error>;
}

/// Optional, non-authoritative source of relationship guesses
///
/// Hints may only refine a low-confidence suggestion. Implementations must
/// return within `budget`; a late or failed hint is treated as no hint.
pub trait RelationshipHintSource: Send + Sync {
    /// Guess how `other` relates to `subject`
    fn hint(&self, subject: &Person, other: &Person, budget: Duration) -> Option<RelationCode>;
}
