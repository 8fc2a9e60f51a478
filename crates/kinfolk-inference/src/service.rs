//! Relationship confirmation with best-effort inference
//!
//! Confirming or accepting a relationship is the triggering action: its
//! errors are returned to the caller. Propagation runs afterwards and can
//! only ever produce a soft failure in the outcome.

use crate::graph::{self, store_error};
use crate::{
    InferenceConfig, InferenceEngine, InferenceError, PropagationReport, Suggestion,
    SuggestionEngine,
};
use kinfolk_domain::traits::{EdgeStore, PersonDirectory};
use kinfolk_domain::{
    EdgeId, EdgePair, EdgeStatus, NewEdge, Person, PersonId, RelationCode, RelationshipCatalog,
    RelationshipEdge,
};
use std::fmt::Display;
use std::sync::Arc;

/// What happened to inference after a confirmed relationship
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceOutcome {
    /// Every propagation pass ran; one report per direction
    Completed(Vec<PropagationReport>),
    /// A pass failed and was rolled back; earlier passes are kept
    Failed {
        /// Passes that finished before the failure
        completed: Vec<PropagationReport>,
        /// Why the failing pass was rolled back
        error: String,
    },
}

impl InferenceOutcome {
    /// Every edge created by inference
    pub fn created(&self) -> Vec<&RelationshipEdge> {
        self.reports().iter().flat_map(|r| r.created.iter()).collect()
    }

    /// Reports of the passes that completed
    pub fn reports(&self) -> &[PropagationReport] {
        match self {
            InferenceOutcome::Completed(reports) => reports,
            InferenceOutcome::Failed { completed, .. } => completed,
        }
    }

    /// Whether some pass failed
    pub fn is_failed(&self) -> bool {
        matches!(self, InferenceOutcome::Failed { .. })
    }
}

/// Result of confirming or accepting a relationship
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmOutcome {
    /// The user-confirmed edge and, when resolvable, its inverse
    pub confirmed: Vec<RelationshipEdge>,
    /// Outcome of the inference that followed
    pub inference: InferenceOutcome,
}

/// Entry point for relationship changes made by users
///
/// # Examples
///
/// ```
/// use kinfolk_domain::{Gender, Person, RelationCode};
/// use kinfolk_inference::RelationshipService;
/// use kinfolk_store::MemoryStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut service = RelationshipService::with_defaults(MemoryStore::new());
/// let me = service.store_mut().add_person(Person::new("Ana", Gender::Female));
/// let mum = service.store_mut().add_person(Person::new("Rosa", Gender::Female));
///
/// let outcome = service.confirm(me, mum, RelationCode::Mother)?;
/// assert_eq!(outcome.confirmed.len(), 2);
/// assert!(!outcome.inference.is_failed());
/// # Ok(())
/// # }
/// ```
pub struct RelationshipService<S> {
    store: S,
    engine: InferenceEngine,
    suggestions: SuggestionEngine,
}

impl<S, E> RelationshipService<S>
where
    S: EdgeStore<Error = E> + PersonDirectory<Error = E>,
    E: Display,
{
    /// Create a service from its parts
    pub fn new(store: S, engine: InferenceEngine, suggestions: SuggestionEngine) -> Self {
        Self {
            store,
            engine,
            suggestions,
        }
    }

    /// Service over the builtin catalog with default settings
    pub fn with_defaults(store: S) -> Self {
        Self::new(store, InferenceEngine::with_defaults(), SuggestionEngine::with_defaults())
    }

    /// Build a service from configuration
    pub fn from_config(
        store: S,
        catalog: Arc<RelationshipCatalog>,
        config: &InferenceConfig,
    ) -> Result<Self, InferenceError> {
        config.validate()?;
        let gender = Arc::new(config.gender.resolver()?);
        let engine = InferenceEngine::new(Arc::clone(&catalog), Arc::clone(&gender));
        let suggestions = SuggestionEngine::new(config.suggestions.clone(), catalog, gender);
        Ok(Self::new(store, engine, suggestions))
    }

    /// Replace the suggestion engine (e.g. to install a hint source)
    pub fn with_suggestions(mut self, suggestions: SuggestionEngine) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the service and return the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// The propagation engine
    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Record that `connector` is `subject`'s `code`, then infer from it
    pub fn confirm(
        &mut self,
        subject: PersonId,
        connector: PersonId,
        code: RelationCode,
    ) -> Result<ConfirmOutcome, InferenceError> {
        let subject_person = self.validate(subject, connector, code)?;
        if self.store.exists(subject, connector).map_err(store_error)? {
            return Err(InferenceError::DuplicateEdge {
                subject,
                object: connector,
            });
        }

        let inverse = self.engine.inverse_for(code, &subject_person);
        let confirmed = self
            .store
            .commit_pairs(&[EdgePair::confirmed(subject, connector, code, inverse)])
            .map_err(store_error)?;
        if !confirmed.iter().any(|e| e.subject == subject && e.object == connector) {
            // Lost a race with another writer for the same pair
            return Err(InferenceError::DuplicateEdge {
                subject,
                object: connector,
            });
        }

        tracing::info!("Confirmed {} -[{}]-> {}", subject, code, connector);
        let inference = self.infer(subject, connector, code, inverse);
        Ok(ConfirmOutcome {
            confirmed,
            inference,
        })
    }

    /// File a pending request that `object` is `subject`'s `code`
    pub fn request(
        &mut self,
        subject: PersonId,
        object: PersonId,
        code: RelationCode,
    ) -> Result<EdgeId, InferenceError> {
        self.validate(subject, object, code)?;
        let id = self
            .store
            .insert(NewEdge::request(subject, object, code))
            .map_err(store_error)?;
        tracing::debug!("Requested {} -[{}]-> {} as {}", subject, code, object, id);
        Ok(id)
    }

    /// Accept a pending request, write its inverse and infer from it
    pub fn accept_request(&mut self, id: EdgeId) -> Result<ConfirmOutcome, InferenceError> {
        let edge = self.pending(id)?;
        if self.store.exists(edge.subject, edge.object).map_err(store_error)? {
            return Err(InferenceError::DuplicateEdge {
                subject: edge.subject,
                object: edge.object,
            });
        }
        let subject_person = graph::require_person(&self.store, edge.subject)?;

        let inverse = self.engine.inverse_for(edge.code, &subject_person);
        let confirmed = self
            .store
            .accept_pending(id, inverse)
            .map_err(store_error)?;

        tracing::info!("Accepted {} -[{}]-> {}", edge.subject, edge.code, edge.object);
        let inference = self.infer(edge.subject, edge.object, edge.code, inverse);
        Ok(ConfirmOutcome {
            confirmed,
            inference,
        })
    }

    /// Reject a pending request
    pub fn reject_request(&mut self, id: EdgeId) -> Result<RelationshipEdge, InferenceError> {
        self.pending(id)?;
        let edge = self
            .store
            .set_status(id, EdgeStatus::Rejected)
            .map_err(store_error)?;
        tracing::info!("Rejected request {}", id);
        Ok(edge)
    }

    /// Delete the accepted relationship between two people, both directions
    pub fn remove(&mut self, a: PersonId, b: PersonId) -> Result<usize, InferenceError> {
        if a == b {
            return Err(InferenceError::SelfRelationship(a));
        }
        let removed = self.store.delete_pair(a, b).map_err(store_error)?;
        tracing::info!("Removed {} edges between {} and {}", removed, a, b);
        Ok(removed)
    }

    /// Ranked suggestions for `person`
    pub fn suggest(&self, person: PersonId) -> Result<Vec<Suggestion>, InferenceError> {
        self.suggestions.suggest(&self.store, person)
    }

    fn validate(
        &self,
        subject: PersonId,
        other: PersonId,
        code: RelationCode,
    ) -> Result<Person, InferenceError> {
        if subject == other {
            return Err(InferenceError::SelfRelationship(subject));
        }
        self.engine.catalog().get(code)?;
        graph::require_person(&self.store, other)?;
        graph::require_person(&self.store, subject)
    }

    fn pending(&self, id: EdgeId) -> Result<RelationshipEdge, InferenceError> {
        let edge = self
            .store
            .get_edge(id)
            .map_err(store_error)?
            .ok_or(InferenceError::EdgeNotFound(id))?;
        if edge.status != EdgeStatus::Pending {
            return Err(InferenceError::InvalidTransition(format!(
                "request {} is already {}",
                id,
                edge.status.as_str()
            )));
        }
        Ok(edge)
    }

    /// Propagate from both members of a confirmed pair
    fn infer(
        &mut self,
        subject: PersonId,
        connector: PersonId,
        code: RelationCode,
        inverse: Option<RelationCode>,
    ) -> InferenceOutcome {
        let mut triggers = vec![(subject, connector, code)];
        if let Some(inverse) = inverse {
            triggers.push((connector, subject, inverse));
        }

        let mut completed = Vec::with_capacity(triggers.len());
        for (from, via, code) in triggers {
            match self.engine.propagate_with_report(&mut self.store, from, via, code) {
                Ok(report) => completed.push(report),
                Err(e) => {
                    tracing::warn!(
                        "Inference after {} -[{}]-> {} failed (retryable: {}): {}",
                        from,
                        code,
                        via,
                        e.is_retryable(),
                        e
                    );
                    return InferenceOutcome::Failed {
                        completed,
                        error: e.to_string(),
                    };
                }
            }
        }
        InferenceOutcome::Completed(completed)
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for RelationshipService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipService")
            .field("store", &self.store)
            .field("engine", &self.engine)
            .field("suggestions", &self.suggestions)
            .finish()
    }
}
