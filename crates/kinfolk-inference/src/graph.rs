//! Read helpers over the edge store

use crate::InferenceError;
use kinfolk_domain::traits::{EdgeStore, PersonDirectory};
use kinfolk_domain::{Gender, GenderResolver, InverseResolver, Kinship, Person, PersonId, RelationCode};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;

/// A person one accepted edge away, seen from the centre
#[derive(Debug, Clone)]
pub(crate) struct Neighbour {
    pub id: PersonId,
    /// How the centre describes this person; `None` when only the reverse
    /// edge exists and it could not be inverted
    pub code: Option<RelationCode>,
    pub person: Option<Person>,
}

impl Neighbour {
    pub fn gender(&self, resolver: &GenderResolver) -> Gender {
        self.person
            .as_ref()
            .map(|p| resolver.resolve(p))
            .unwrap_or(Gender::Unknown)
    }

    pub fn name(&self) -> String {
        self.person
            .as_ref()
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

pub(crate) fn store_error(err: impl Display) -> InferenceError {
    InferenceError::Store(err.to_string())
}

pub(crate) fn require_person<S, E>(store: &S, id: PersonId) -> Result<Person, InferenceError>
where
    S: PersonDirectory<Error = E>,
    E: Display,
{
    store
        .get_person(id)
        .map_err(store_error)?
        .ok_or(InferenceError::PersonNotFound(id))
}

/// Every person directly related to `centre`, in the form `centre -> other`
///
/// Outgoing edges are taken as recorded. A person reachable only through an
/// incoming edge gets the inverse of that edge, computed from their own
/// gender. Each person appears once.
pub(crate) fn neighbours<S, E>(
    store: &S,
    resolver: &GenderResolver,
    inverse: &InverseResolver,
    centre: PersonId,
) -> Result<Vec<Neighbour>, InferenceError>
where
    S: EdgeStore<Error = E> + PersonDirectory<Error = E>,
    E: Display,
{
    let edges = store.find_accepted(centre).map_err(store_error)?;
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for edge in edges.iter().filter(|e| e.subject == centre) {
        if seen.insert(edge.object) {
            found.push((edge.object, Some(edge.code), None));
        }
    }
    for edge in edges.iter().filter(|e| e.object == centre && e.subject != centre) {
        if seen.insert(edge.subject) {
            found.push((edge.subject, None, Some(edge.code)));
        }
    }

    found
        .into_iter()
        .map(|(id, outgoing, incoming)| {
            let person = store.get_person(id).map_err(store_error)?;
            let mut neighbour = Neighbour { id, code: outgoing, person };
            if let Some(code) = incoming {
                neighbour.code = inverse.inverse_of(code, neighbour.gender(resolver));
            }
            Ok(neighbour)
        })
        .collect()
}

/// People `centre` has recorded an accepted edge to, with the recorded code
pub(crate) fn recorded<S, E>(store: &S, centre: PersonId) -> Result<Vec<Neighbour>, InferenceError>
where
    S: EdgeStore<Error = E> + PersonDirectory<Error = E>,
    E: Display,
{
    store
        .find_accepted(centre)
        .map_err(store_error)?
        .into_iter()
        .filter(|e| e.subject == centre)
        .map(|e| {
            Ok(Neighbour {
                id: e.object,
                code: Some(e.code),
                person: store.get_person(e.object).map_err(store_error)?,
            })
        })
        .collect()
}

/// Parents of `person` according to either direction of its edges
pub(crate) fn parents_of<S, E>(store: &S, person: PersonId) -> Result<BTreeSet<PersonId>, InferenceError>
where
    S: EdgeStore<Error = E>,
    E: Display,
{
    let edges = store.find_accepted(person).map_err(store_error)?;
    Ok(edges
        .iter()
        .filter_map(|e| match e.code.kinship() {
            Kinship::Parent if e.subject == person => Some(e.object),
            Kinship::Child if e.object == person => Some(e.subject),
            _ => None,
        })
        .collect())
}
