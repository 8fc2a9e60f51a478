//! In-memory graph store
//!
//! Edges live in an arena (`Vec`) with an index keyed by ordered pair for
//! accepted edges. Batches are validated against a staged copy of that index
//! before anything is written, so a batch lands whole or not at all.

use crate::{current_timestamp, StoreError};
use kinfolk_domain::traits::{EdgeStore, PersonDirectory};
use kinfolk_domain::{
    EdgeId, EdgePair, EdgeStatus, NewEdge, Person, PersonId, RelationCode, RelationshipEdge,
};
use std::collections::{HashMap, HashSet};

/// Arena-backed implementation of the person and edge stores
#[derive(Debug, Default)]
pub struct MemoryStore {
    persons: HashMap<PersonId, Person>,
    edges: Vec<Option<RelationshipEdge>>,
    by_id: HashMap<EdgeId, usize>,
    accepted: HashMap<(PersonId, PersonId), usize>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a person profile
    pub fn add_person(&mut self, person: Person) -> PersonId {
        let id = person.id;
        self.persons.insert(id, person);
        id
    }

    /// Every live edge, in insertion order
    pub fn all_edges(&self) -> Vec<RelationshipEdge> {
        self.edges.iter().flatten().cloned().collect()
    }

    /// Number of accepted edges
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    fn push(&mut self, edge: RelationshipEdge) {
        let slot = self.edges.len();
        self.by_id.insert(edge.id, slot);
        if edge.is_accepted() {
            self.accepted.insert((edge.subject, edge.object), slot);
        }
        self.edges.push(Some(edge));
    }

    fn accepted_edge(
        subject: PersonId,
        object: PersonId,
        code: RelationCode,
        created_automatically: bool,
        now: u64,
    ) -> RelationshipEdge {
        RelationshipEdge {
            id: EdgeId::new(),
            subject,
            object,
            code,
            status: EdgeStatus::Accepted,
            created_automatically,
            created_at: now,
            accepted_at: Some(now),
        }
    }
}

impl PersonDirectory for MemoryStore {
    type Error = StoreError;

    fn get_person(&self, id: PersonId) -> Result<Option<Person>, Self::Error> {
        Ok(self.persons.get(&id).cloned())
    }
}

impl EdgeStore for MemoryStore {
    type Error = StoreError;

    fn find_accepted(&self, person: PersonId) -> Result<Vec<RelationshipEdge>, Self::Error> {
        Ok(self
            .edges
            .iter()
            .flatten()
            .filter(|e| e.is_accepted() && (e.subject == person || e.object == person))
            .cloned()
            .collect())
    }

    fn exists(&self, subject: PersonId, object: PersonId) -> Result<bool, Self::Error> {
        Ok(self.accepted.contains_key(&(subject, object)))
    }

    fn get_edge(&self, id: EdgeId) -> Result<Option<RelationshipEdge>, Self::Error> {
        Ok(self
            .by_id
            .get(&id)
            .and_then(|&slot| self.edges[slot].clone()))
    }

    fn insert(&mut self, edge: NewEdge) -> Result<EdgeId, Self::Error> {
        if edge.subject == edge.object {
            return Err(StoreError::SelfRelationship(edge.subject));
        }
        if edge.status == EdgeStatus::Accepted && self.accepted.contains_key(&(edge.subject, edge.object)) {
            return Err(StoreError::Duplicate {
                subject: edge.subject,
                object: edge.object,
            });
        }

        let now = current_timestamp();
        let record = RelationshipEdge {
            id: EdgeId::new(),
            subject: edge.subject,
            object: edge.object,
            code: edge.code,
            status: edge.status,
            created_automatically: edge.created_automatically,
            created_at: now,
            accepted_at: (edge.status == EdgeStatus::Accepted).then_some(now),
        };
        let id = record.id;
        self.push(record);
        Ok(id)
    }

    fn commit_pairs(&mut self, pairs: &[EdgePair]) -> Result<Vec<RelationshipEdge>, Self::Error> {
        let now = current_timestamp();
        let mut taken: HashSet<(PersonId, PersonId)> = HashSet::new();
        let mut staged = Vec::new();
        let is_taken = |taken: &HashSet<(PersonId, PersonId)>, key: (PersonId, PersonId)| {
            taken.contains(&key) || self.accepted.contains_key(&key)
        };

        for pair in pairs {
            if pair.is_self_loop() || is_taken(&taken, (pair.subject, pair.object)) {
                continue;
            }
            taken.insert((pair.subject, pair.object));
            staged.push(Self::accepted_edge(
                pair.subject,
                pair.object,
                pair.code,
                pair.created_automatically,
                now,
            ));

            if let Some(inverse) = pair.inverse {
                if !is_taken(&taken, (pair.object, pair.subject)) {
                    taken.insert((pair.object, pair.subject));
                    staged.push(Self::accepted_edge(
                        pair.object,
                        pair.subject,
                        inverse,
                        pair.created_automatically,
                        now,
                    ));
                }
            }
        }

        for edge in &staged {
            self.push(edge.clone());
        }
        Ok(staged)
    }

    fn set_status(&mut self, id: EdgeId, status: EdgeStatus) -> Result<RelationshipEdge, Self::Error> {
        let slot = *self
            .by_id
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(format!("edge {}", id)))?;
        let edge = self.edges[slot]
            .clone()
            .ok_or_else(|| StoreError::NotFound(format!("edge {}", id)))?;

        if edge.status == status {
            return Ok(edge);
        }
        if edge.status != EdgeStatus::Pending {
            return Err(StoreError::InvalidTransition(format!(
                "{} -> {}",
                edge.status.as_str(),
                status.as_str()
            )));
        }
        if status == EdgeStatus::Accepted && self.accepted.contains_key(&(edge.subject, edge.object)) {
            return Err(StoreError::Duplicate {
                subject: edge.subject,
                object: edge.object,
            });
        }

        let mut updated = edge;
        updated.status = status;
        if status == EdgeStatus::Accepted {
            updated.accepted_at = Some(current_timestamp());
            self.accepted.insert((updated.subject, updated.object), slot);
        }
        self.edges[slot] = Some(updated.clone());
        Ok(updated)
    }

    fn accept_pending(
        &mut self,
        id: EdgeId,
        inverse: Option<RelationCode>,
    ) -> Result<Vec<RelationshipEdge>, Self::Error> {
        // set_status validates before it writes, so nothing is left behind on error
        let accepted = self.set_status(id, EdgeStatus::Accepted)?;
        let (subject, object) = (accepted.object, accepted.subject);
        let mut written = vec![accepted];

        if let Some(code) = inverse {
            if !self.accepted.contains_key(&(subject, object)) {
                let edge = Self::accepted_edge(subject, object, code, false, current_timestamp());
                self.push(edge.clone());
                written.push(edge);
            }
        }
        Ok(written)
    }

    fn delete_pair(&mut self, a: PersonId, b: PersonId) -> Result<usize, Self::Error> {
        let mut removed = 0;
        for key in [(a, b), (b, a)] {
            if let Some(slot) = self.accepted.remove(&key) {
                if let Some(edge) = self.edges[slot].take() {
                    self.by_id.remove(&edge.id);
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}
