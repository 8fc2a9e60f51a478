//! Ranked, read-only relationship suggestions
//!
//! Runs the same composition as propagation over everyone two hops away, but
//! proposes instead of committing. Sources, strongest first:
//!
//! - composition where both hops are blood relations
//! - composition through a spouse, in-law or step relation
//! - siblings inferred from a recorded shared parent
//! - `family_member` for two-hop relatives no rule covers
//!
//! Nothing here writes to the store.

use crate::graph::{self, Neighbour};
use crate::{InferenceError, SuggestionConfig};
use kinfolk_domain::traits::{EdgeStore, PersonDirectory, RelationshipHintSource};
use kinfolk_domain::{
    Category, CompositionRuleTable, Gender, GenderResolver, InverseResolver, Kinship, Person,
    PersonId, RelationCode, RelationshipCatalog,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::{self, Display};
use std::sync::{mpsc, Arc};
use std::thread;

/// What a suggestion is based on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionBasis {
    /// Composition of two blood relations
    Blood,
    /// Composition involving a spouse, in-law or step relation
    Marriage,
    /// Both people have the same recorded parent
    CommonParent,
    /// Two hops away with no composition rule
    Fallback,
}

impl SuggestionBasis {
    /// Get the basis as a short label
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionBasis::Blood => "blood",
            SuggestionBasis::Marriage => "marriage",
            SuggestionBasis::CommonParent => "common_parent",
            SuggestionBasis::Fallback => "fallback",
        }
    }
}

impl fmt::Display for SuggestionBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed relationship from the subject to a candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Person being proposed
    pub candidate: PersonId,
    /// How the subject would describe the candidate
    pub suggested_code: RelationCode,
    /// Human-readable explanation
    pub rationale: String,
    /// Score in `[0, 1]`
    pub confidence: f64,
    /// Source of the proposal
    pub basis: SuggestionBasis,
}

/// Produces ranked suggestions for a person
pub struct SuggestionEngine {
    config: SuggestionConfig,
    catalog: Arc<RelationshipCatalog>,
    gender: Arc<GenderResolver>,
    rules: CompositionRuleTable,
    inverse: InverseResolver,
    hints: Option<Arc<dyn RelationshipHintSource>>,
}

impl SuggestionEngine {
    /// Create an engine with the given scoring
    pub fn new(
        config: SuggestionConfig,
        catalog: Arc<RelationshipCatalog>,
        gender: Arc<GenderResolver>,
    ) -> Self {
        Self {
            config,
            catalog,
            gender,
            rules: CompositionRuleTable::new(),
            inverse: InverseResolver::new(),
            hints: None,
        }
    }

    /// Engine with default scoring over the builtin catalog
    pub fn with_defaults() -> Self {
        Self::new(
            SuggestionConfig::default(),
            RelationshipCatalog::global(),
            Arc::new(GenderResolver::attribute_only()),
        )
    }

    /// Install an external hint source for fallback candidates
    pub fn with_hints(mut self, hints: impl RelationshipHintSource + 'static) -> Self {
        self.hints = Some(Arc::new(hints));
        self
    }

    /// The scoring configuration
    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Suggest relationships for `person`, best first
    ///
    /// People already directly related to `person` are never suggested. Each
    /// candidate appears once, with its highest-confidence proposal.
    pub fn suggest<S, E>(&self, store: &S, person: PersonId) -> Result<Vec<Suggestion>, InferenceError>
    where
        S: EdgeStore<Error = E> + PersonDirectory<Error = E>,
        E: Display,
    {
        let subject = graph::require_person(store, person)?;
        let direct = graph::neighbours(store, &self.gender, &self.inverse, person)?;

        let mut excluded: HashSet<PersonId> = direct.iter().map(|n| n.id).collect();
        excluded.insert(person);
        let subject_parents = graph::parents_of(store, person)?;

        let mut proposals = Vec::new();
        for middle in &direct {
            let Some(first) = middle.code else { continue };
            for far in graph::recorded(store, middle.id)? {
                if excluded.contains(&far.id) {
                    continue;
                }
                if let Some(s) = self.compose_candidate(middle, first, &far) {
                    proposals.push(s);
                } else if self.config.include_fallback {
                    proposals.push(self.fallback_candidate(&subject, middle, first, &far));
                }
            }
        }
        for &parent in &subject_parents {
            proposals.extend(self.common_parent_candidates(store, parent, &excluded)?);
        }

        let mut parents_cache: HashMap<PersonId, BTreeSet<PersonId>> = HashMap::new();
        let mut best: HashMap<PersonId, Suggestion> = HashMap::new();
        for s in proposals {
            if s.suggested_code.generation() != 0 {
                if !parents_cache.contains_key(&s.candidate) {
                    parents_cache.insert(s.candidate, graph::parents_of(store, s.candidate)?);
                }
                let shares_parent = parents_cache
                    .get(&s.candidate)
                    .is_some_and(|parents| !parents.is_disjoint(&subject_parents));
                if shares_parent {
                    tracing::debug!(
                        "Dropping {} for {}: same generation as {}",
                        s.suggested_code,
                        s.candidate,
                        person
                    );
                    continue;
                }
            }
            match best.get(&s.candidate) {
                Some(existing) if existing.confidence >= s.confidence => {}
                _ => {
                    best.insert(s.candidate, s);
                }
            }
        }

        let mut suggestions: Vec<Suggestion> = best.into_values().collect();
        suggestions.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.candidate.cmp(&b.candidate))
        });
        suggestions.truncate(self.config.max_suggestions);

        tracing::debug!("{} suggestions for {}", suggestions.len(), person);
        Ok(suggestions)
    }

    fn compose_candidate(
        &self,
        middle: &Neighbour,
        first: RelationCode,
        far: &Neighbour,
    ) -> Option<Suggestion> {
        let second = far.code?;
        let composition = self.rules.compose(first, second)?;
        let target_gender = match far.gender(&self.gender) {
            Gender::Unknown => second.gender(),
            known => known,
        };
        let code = composition.adapt(target_gender)?;
        self.catalog.get(code).ok()?;

        let (basis, confidence) = match composition.category {
            Category::Blood => (SuggestionBasis::Blood, self.config.blood_confidence),
            _ => (SuggestionBasis::Marriage, self.config.marriage_confidence),
        };

        Some(Suggestion {
            candidate: far.id,
            suggested_code: code,
            rationale: format!(
                "{} is the {} of your {} {}",
                far.name(),
                second.label(),
                first.label(),
                middle.name()
            ),
            confidence,
            basis,
        })
    }

    fn fallback_candidate(
        &self,
        subject: &Person,
        middle: &Neighbour,
        first: RelationCode,
        far: &Neighbour,
    ) -> Suggestion {
        let rationale = format!("{} is related to your {} {}", far.name(), first.label(), middle.name());
        let suggested_code = far
            .person
            .as_ref()
            .and_then(|other| self.hint(subject, other))
            .unwrap_or(RelationCode::FamilyMember);

        Suggestion {
            candidate: far.id,
            suggested_code,
            rationale,
            confidence: self.config.fallback_confidence,
            basis: SuggestionBasis::Fallback,
        }
    }

    /// Ask the hint source, discarding answers that arrive over budget or
    /// name codes outside the catalog
    ///
    /// The lookup runs on its own thread so a slow source cannot hold up
    /// `suggest` past the budget. A late answer is dropped with the channel.
    fn hint(&self, subject: &Person, other: &Person) -> Option<RelationCode> {
        let hints = Arc::clone(self.hints.as_ref()?);
        let budget = self.config.hint_timeout();
        let (tx, rx) = mpsc::sync_channel(1);
        let (asker, about) = (subject.clone(), other.clone());

        let spawned = thread::Builder::new()
            .name("kinfolk-hint".to_string())
            .spawn(move || {
                let _ = tx.send(hints.hint(&asker, &about, budget));
            });
        if let Err(e) = spawned {
            tracing::warn!("Could not start relationship hint lookup: {}", e);
            return None;
        }

        let code = match rx.recv_timeout(budget) {
            Ok(code) => code,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!("Relationship hint for {} exceeded {:?}; ignored", other.id, budget);
                return None;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::warn!("Relationship hint for {} failed", other.id);
                return None;
            }
        };
        let code = code.filter(|c| *c != RelationCode::FamilyMember)?;
        match self.catalog.get(code) {
            Ok(_) => Some(code),
            Err(e) => {
                tracing::debug!("Hint {} ignored: {}", code, e);
                None
            }
        }
    }

    /// Persons recorded as children of `parent` (or naming `parent` as
    /// their parent) who are not yet related to the subject
    fn common_parent_candidates<S, E>(
        &self,
        store: &S,
        parent: PersonId,
        excluded: &HashSet<PersonId>,
    ) -> Result<Vec<Suggestion>, InferenceError>
    where
        S: EdgeStore<Error = E> + PersonDirectory<Error = E>,
        E: Display,
    {
        let parent_name = store
            .get_person(parent)
            .map_err(graph::store_error)?
            .map(|p| p.display_name)
            .unwrap_or_else(|| parent.to_string());

        let edges = store.find_accepted(parent).map_err(graph::store_error)?;
        let children: BTreeSet<PersonId> = edges
            .iter()
            .filter_map(|e| match e.code.kinship() {
                Kinship::Parent if e.object == parent => Some(e.subject),
                Kinship::Child if e.subject == parent => Some(e.object),
                _ => None,
            })
            .filter(|id| !excluded.contains(id))
            .collect();

        let mut found = Vec::new();
        for child in children {
            let person = store.get_person(child).map_err(graph::store_error)?;
            let gender = person
                .as_ref()
                .map(|p| self.gender.resolve(p))
                .unwrap_or(Gender::Unknown);
            let Some(code) = RelationCode::from_parts(Kinship::Sibling, None, gender) else {
                continue;
            };
            if self.catalog.get(code).is_err() {
                continue;
            }
            let name = person.map(|p| p.display_name).unwrap_or_else(|| child.to_string());
            found.push(Suggestion {
                candidate: child,
                suggested_code: code,
                rationale: format!("{} shares your parent {}", name, parent_name),
                confidence: self.config.common_parent_confidence,
                basis: SuggestionBasis::CommonParent,
            });
        }
        Ok(found)
    }
}

impl std::fmt::Debug for SuggestionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionEngine")
            .field("config", &self.config)
            .field("has_hints", &self.hints.is_some())
            .finish()
    }
}
