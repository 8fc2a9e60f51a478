//! Propagation of a newly accepted edge
//!
//! Given `subject -> connector` with code R1, every accepted relationship of
//! the connector (`connector -> other`, code R2) is composed into a candidate
//! `subject -> other`. Surviving candidates are committed together with their
//! inverses in a single store transaction.

use crate::graph::{self, Neighbour};
use crate::{InferenceError, PropagationReport, SkipReason};
use kinfolk_domain::traits::{EdgeStore, PersonDirectory};
use kinfolk_domain::{
    CompositionRuleTable, EdgePair, Gender, GenderResolver, InverseResolver, Person, PersonId,
    RelationCode, RelationshipCatalog, RelationshipEdge,
};
use std::fmt::Display;
use std::sync::Arc;

/// Stateless propagation engine; all state lives in the store
///
/// # Examples
///
/// ```
/// use kinfolk_domain::traits::EdgeStore;
/// use kinfolk_domain::{EdgePair, Gender, Person, RelationCode};
/// use kinfolk_inference::InferenceEngine;
/// use kinfolk_store::MemoryStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = MemoryStore::new();
/// let me = store.add_person(Person::new("Ana", Gender::Female));
/// let dad = store.add_person(Person::new("Luis", Gender::Male));
/// let uncle = store.add_person(Person::new("Jorge", Gender::Male));
///
/// store.commit_pairs(&[
///     EdgePair::confirmed(dad, uncle, RelationCode::Brother, Some(RelationCode::Brother)),
///     EdgePair::confirmed(me, dad, RelationCode::Father, Some(RelationCode::Daughter)),
/// ])?;
///
/// let engine = InferenceEngine::with_defaults();
/// let created = engine.propagate(&mut store, me, dad, RelationCode::Father)?;
/// assert_eq!(created.len(), 2);
/// assert!(created.iter().any(|e| e.code == RelationCode::UnclePaternal));
/// assert!(created.iter().any(|e| e.code == RelationCode::Niece));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    catalog: Arc<RelationshipCatalog>,
    gender: Arc<GenderResolver>,
    rules: CompositionRuleTable,
    inverse: InverseResolver,
}

impl InferenceEngine {
    /// Create an engine over a catalog and gender resolver
    pub fn new(catalog: Arc<RelationshipCatalog>, gender: Arc<GenderResolver>) -> Self {
        Self {
            catalog,
            gender,
            rules: CompositionRuleTable::new(),
            inverse: InverseResolver::new(),
        }
    }

    /// Engine over the process-wide builtin catalog, attribute-only gender
    pub fn with_defaults() -> Self {
        Self::new(
            RelationshipCatalog::global(),
            Arc::new(GenderResolver::attribute_only()),
        )
    }

    /// The catalog deductions are checked against
    pub fn catalog(&self) -> &Arc<RelationshipCatalog> {
        &self.catalog
    }

    /// The gender resolver in use
    pub fn gender_resolver(&self) -> &Arc<GenderResolver> {
        &self.gender
    }

    /// Inverse of `code` for an edge whose subject is `holder`
    ///
    /// Returns `None` when the holder's gender is needed and unknown, or when
    /// the inverse code is not in the catalog.
    pub fn inverse_for(&self, code: RelationCode, holder: &Person) -> Option<RelationCode> {
        let inverse = self.inverse.inverse_of(code, self.gender.resolve(holder))?;
        match self.catalog.get(inverse) {
            Ok(_) => Some(inverse),
            Err(e) => {
                tracing::warn!("Inverse {} of {} unavailable: {}", inverse, code, e);
                None
            }
        }
    }

    /// Propagate an accepted edge and return the edges created
    pub fn propagate<S, E>(
        &self,
        store: &mut S,
        subject: PersonId,
        connector: PersonId,
        code: RelationCode,
    ) -> Result<Vec<RelationshipEdge>, InferenceError>
    where
        S: EdgeStore<Error = E> + PersonDirectory<Error = E>,
        E: Display,
    {
        Ok(self.propagate_with_report(store, subject, connector, code)?.created)
    }

    /// Propagate an accepted edge and report every decision made
    ///
    /// Skipped candidates never fail the pass. A storage error while
    /// committing fails it with [`InferenceError::TransactionFailure`] and
    /// leaves no edge from the pass behind.
    pub fn propagate_with_report<S, E>(
        &self,
        store: &mut S,
        subject: PersonId,
        connector: PersonId,
        code: RelationCode,
    ) -> Result<PropagationReport, InferenceError>
    where
        S: EdgeStore<Error = E> + PersonDirectory<Error = E>,
        E: Display,
    {
        let (pairs, mut report) = self.plan(store, subject, connector, code)?;
        if pairs.is_empty() {
            tracing::debug!("No deductions from {} via {}", subject, connector);
            return Ok(report);
        }

        report.created = store.commit_pairs(&pairs).map_err(|e| {
            tracing::warn!(
                "Propagation {} -[{}]-> {} rolled back: {}",
                subject,
                code,
                connector,
                e
            );
            InferenceError::TransactionFailure(e.to_string())
        })?;

        // A racing writer may have taken some pairs between plan and commit
        let lost = pairs
            .iter()
            .filter(|p| !report.created.iter().any(|e| e.subject == p.subject && e.object == p.object))
            .map(|p| (p.object, p.code))
            .collect::<Vec<_>>();
        for (other, deduced) in lost {
            report.skip(other, Some(deduced), SkipReason::DuplicateEdge);
        }

        // An inverse can also be missing because the reverse pair already had an edge
        report.forward_only = report
            .created
            .iter()
            .filter(|e| e.subject == subject)
            .filter(|e| !report.created.iter().any(|r| r.subject == e.object && r.object == subject))
            .map(|e| e.object)
            .collect();

        tracing::info!(
            "Propagated {} -[{}]-> {}: {} edges created, {} candidates skipped",
            subject,
            code,
            connector,
            report.created.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Work out the pairs a propagation would commit, without writing
    pub fn plan<S, E>(
        &self,
        store: &S,
        subject: PersonId,
        connector: PersonId,
        code: RelationCode,
    ) -> Result<(Vec<EdgePair>, PropagationReport), InferenceError>
    where
        S: EdgeStore<Error = E> + PersonDirectory<Error = E>,
        E: Display,
    {
        if subject == connector {
            return Err(InferenceError::SelfRelationship(subject));
        }
        self.catalog.get(code)?;
        let subject_person = graph::require_person(store, subject)?;
        graph::require_person(store, connector)?;

        let mut report = PropagationReport::new(subject, connector, code);
        let mut pairs = Vec::new();

        let neighbours = graph::neighbours(store, &self.gender, &self.inverse, connector)?;
        report.scanned = neighbours.len();

        for neighbour in &neighbours {
            match self.candidate(store, &subject_person, code, neighbour)? {
                Ok(pair) => {
                    if pair.inverse.is_none() {
                        tracing::debug!("No inverse for {} -> {} ({})", subject, pair.object, pair.code);
                        report.forward_only.push(pair.object);
                    }
                    pairs.push(pair);
                }
                Err((deduced, reason)) => {
                    tracing::debug!("Skipping {} via {}: {}", neighbour.id, connector, reason);
                    report.skip(neighbour.id, deduced, reason);
                }
            }
        }

        Ok((pairs, report))
    }

    /// Decide what, if anything, `subject -> neighbour` should become
    #[allow(clippy::type_complexity)]
    fn candidate<S, E>(
        &self,
        store: &S,
        subject: &Person,
        first: RelationCode,
        neighbour: &Neighbour,
    ) -> Result<Result<EdgePair, (Option<RelationCode>, SkipReason)>, InferenceError>
    where
        S: EdgeStore<Error = E>,
        E: Display,
    {
        if neighbour.id == subject.id {
            return Ok(Err((None, SkipReason::SelfRelationship)));
        }
        let Some(second) = neighbour.code else {
            return Ok(Err((None, SkipReason::UnresolvedGender)));
        };
        let Some(composition) = self.rules.compose(first, second) else {
            return Ok(Err((None, SkipReason::NoRule)));
        };

        // The second edge's own code is recorded data about the target
        let target_gender = match neighbour.gender(&self.gender) {
            Gender::Unknown => second.gender(),
            known => known,
        };
        let Some(deduced) = composition.adapt(target_gender) else {
            return Ok(Err((None, SkipReason::UnresolvedGender)));
        };

        if let Err(e) = self.catalog.get(deduced) {
            tracing::warn!("Deduced code {} rejected: {}", deduced, e);
            return Ok(Err((Some(deduced), SkipReason::UnknownRelationType)));
        }

        if store.exists(subject.id, neighbour.id).map_err(graph::store_error)? {
            return Ok(Err((Some(deduced), SkipReason::DuplicateEdge)));
        }

        let inverse = self.inverse_for(deduced, subject);
        Ok(Ok(EdgePair::derived(subject.id, neighbour.id, deduced, inverse)))
    }
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinfolk_domain::{CatalogError, CatalogSource, NewEdge, RelationshipTypeDef};
    use kinfolk_store::MemoryStore;
    use RelationCode::*;

    struct Family {
        store: MemoryStore,
        engine: InferenceEngine,
    }

    impl Family {
        fn new() -> Self {
            Self {
                store: MemoryStore::new(),
                engine: InferenceEngine::with_defaults(),
            }
        }

        fn person(&mut self, name: &str, gender: Gender) -> PersonId {
            self.store.add_person(Person::new(name, gender))
        }

        /// Record a confirmed pair in both directions
        fn link(&mut self, a: PersonId, code: RelationCode, b: PersonId) {
            let holder = self.store.get_person(a).unwrap().unwrap();
            let inverse = self.engine.inverse_for(code, &holder);
            self.store
                .commit_pairs(&[EdgePair::confirmed(a, b, code, inverse)])
                .unwrap();
        }

        fn code(&self, a: PersonId, b: PersonId) -> Option<RelationCode> {
            self.store
                .find_accepted(a)
                .unwrap()
                .into_iter()
                .find(|e| e.subject == a && e.object == b)
                .map(|e| e.code)
        }
    }

    #[test]
    fn test_father_brother_gives_paternal_uncle() {
        let mut f = Family::new();
        let me = f.person("Sam", Gender::Male);
        let dad = f.person("Bob", Gender::Male);
        let uncle = f.person("Carl", Gender::Male);
        f.link(dad, Brother, uncle);
        f.link(me, Father, dad);

        let created = f.engine.propagate(&mut f.store, me, dad, Father).unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(f.code(me, uncle), Some(UnclePaternal));
        assert_eq!(f.code(uncle, me), Some(Nephew));
        assert!(created.iter().all(|e| e.created_automatically));
    }

    #[test]
    fn test_son_son_gives_grandchild() {
        let mut f = Family::new();
        let me = f.person("Ann", Gender::Female);
        let son = f.person("Ben", Gender::Male);
        let grandson = f.person("Cid", Gender::Male);
        let granddaughter = f.person("Dee", Gender::Female);
        f.link(son, Son, grandson);
        f.link(son, Daughter, granddaughter);
        f.link(me, Son, son);

        f.engine.propagate(&mut f.store, me, son, Son).unwrap();
        assert_eq!(f.code(me, grandson), Some(Grandson));
        assert_eq!(f.code(me, granddaughter), Some(Granddaughter));
        assert_eq!(f.code(grandson, me), Some(Grandmother));
    }

    #[test]
    fn test_loop_back_creates_nothing() {
        let mut f = Family::new();
        let me = f.person("Sam", Gender::Male);
        let dad = f.person("Bob", Gender::Male);
        f.link(me, Father, dad);

        let report = f
            .engine
            .propagate_with_report(&mut f.store, me, dad, Father)
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(report.skipped_for(SkipReason::SelfRelationship), 1);
    }

    #[test]
    fn test_existing_edge_wins() {
        let mut f = Family::new();
        let me = f.person("Sam", Gender::Male);
        let dad = f.person("Bob", Gender::Male);
        let carl = f.person("Carl", Gender::Male);
        f.link(dad, Brother, carl);
        f.link(me, Father, dad);
        f.store.insert(NewEdge::confirmed(me, carl, FamilyMember)).unwrap();

        let report = f
            .engine
            .propagate_with_report(&mut f.store, me, dad, Father)
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(report.skipped_for(SkipReason::DuplicateEdge), 1);
        assert_eq!(f.code(me, carl), Some(FamilyMember));
    }

    #[test]
    fn test_unknown_subject_gender_writes_forward_only() {
        let mut f = Family::new();
        let me = f.person("Kim", Gender::Unknown);
        let dad = f.person("Bob", Gender::Male);
        let uncle = f.person("Carl", Gender::Male);
        f.link(dad, Brother, uncle);
        f.link(me, Father, dad);

        let report = f
            .engine
            .propagate_with_report(&mut f.store, me, dad, Father)
            .unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.forward_only, vec![uncle]);
        assert_eq!(f.code(me, uncle), Some(UnclePaternal));
        assert_eq!(f.code(uncle, me), None);
    }

    #[test]
    fn test_existing_inverse_reported_as_forward_only() {
        let mut f = Family::new();
        let me = f.person("Sam", Gender::Male);
        let dad = f.person("Bob", Gender::Male);
        let uncle = f.person("Carl", Gender::Male);
        f.link(dad, Brother, uncle);
        f.store.insert(NewEdge::confirmed(uncle, me, Nephew)).unwrap();
        f.link(me, Father, dad);

        let report = f
            .engine
            .propagate_with_report(&mut f.store, me, dad, Father)
            .unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].object, uncle);
        assert_eq!(report.forward_only, vec![uncle]);
        assert_eq!(f.code(me, uncle), Some(UnclePaternal));
    }

    #[test]
    fn test_target_gender_falls_back_to_recorded_code() {
        let mut f = Family::new();
        let me = f.person("Sam", Gender::Male);
        let mum = f.person("Eve", Gender::Female);
        let aunt = f.person("Flo", Gender::Unknown);
        f.store
            .commit_pairs(&[EdgePair::confirmed(mum, aunt, Sister, None)])
            .unwrap();
        f.link(me, Mother, mum);

        f.engine.propagate(&mut f.store, me, mum, Mother).unwrap();
        assert_eq!(f.code(me, aunt), Some(AuntMaternal));
    }

    #[test]
    fn test_unresolved_target_gender_skipped() {
        let mut f = Family::new();
        let me = f.person("Sam", Gender::Male);
        let dad = f.person("Bob", Gender::Male);
        let sib = f.person("Pat", Gender::Unknown);
        f.store
            .commit_pairs(&[EdgePair::confirmed(dad, sib, Sibling, None)])
            .unwrap();
        f.link(me, Father, dad);

        let report = f
            .engine
            .propagate_with_report(&mut f.store, me, dad, Father)
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(report.skipped_for(SkipReason::UnresolvedGender), 1);
    }

    #[test]
    fn test_incoming_only_edge_is_normalised() {
        let mut f = Family::new();
        let me = f.person("Sam", Gender::Male);
        let dad = f.person("Bob", Gender::Male);
        let grandpa = f.person("Gus", Gender::Male);
        // Only the grandfather's side was recorded: grandpa -> dad is "son"
        f.store.insert(NewEdge::confirmed(grandpa, dad, Son)).unwrap();
        f.link(me, Father, dad);

        f.engine.propagate(&mut f.store, me, dad, Father).unwrap();
        assert_eq!(f.code(me, grandpa), Some(GrandfatherPaternal));
        assert_eq!(f.code(grandpa, me), Some(Grandson));
    }

    #[test]
    fn test_propagate_is_idempotent() {
        let mut f = Family::new();
        let me = f.person("Sam", Gender::Male);
        let dad = f.person("Bob", Gender::Male);
        let uncle = f.person("Carl", Gender::Male);
        let gran = f.person("Gia", Gender::Female);
        f.link(dad, Brother, uncle);
        f.link(dad, Mother, gran);
        f.link(me, Father, dad);

        let first = f.engine.propagate(&mut f.store, me, dad, Father).unwrap();
        let edges_after_first = f.store.all_edges().len();
        let second = f.engine.propagate(&mut f.store, me, dad, Father).unwrap();

        assert_eq!(first.len(), 4);
        assert!(second.is_empty());
        assert_eq!(f.store.all_edges().len(), edges_after_first);
    }

    #[test]
    fn test_rejects_invalid_trigger() {
        let mut f = Family::new();
        let me = f.person("Sam", Gender::Male);
        assert!(matches!(
            f.engine.propagate(&mut f.store, me, me, Father),
            Err(InferenceError::SelfRelationship(_))
        ));
        assert!(matches!(
            f.engine.propagate(&mut f.store, me, PersonId::new(), Father),
            Err(InferenceError::PersonNotFound(_))
        ));
    }

    struct WithoutCousins;

    impl CatalogSource for WithoutCousins {
        fn load(&self) -> Result<Vec<RelationshipTypeDef>, CatalogError> {
            Ok(RelationCode::ALL
                .iter()
                .filter(|c| c.kinship() != kinfolk_domain::Kinship::Cousin)
                .map(|&c| RelationshipTypeDef::for_code(c))
                .collect())
        }
    }

    #[test]
    fn test_code_missing_from_catalog_skipped() {
        let mut f = Family::new();
        f.engine = InferenceEngine::new(
            Arc::new(RelationshipCatalog::new(WithoutCousins)),
            Arc::new(GenderResolver::attribute_only()),
        );
        let me = f.person("Sam", Gender::Male);
        let dad = f.person("Bob", Gender::Male);
        let nephew = f.person("Ned", Gender::Male);
        f.link(dad, Nephew, nephew);
        f.link(me, Father, dad);

        let report = f
            .engine
            .propagate_with_report(&mut f.store, me, dad, Father)
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(report.skipped_for(SkipReason::UnknownRelationType), 1);
    }
}
