//! Outcome of a propagation pass
//!
//! Tracks what one `propagate` call looked at, what it created and why each
//! rejected candidate was skipped.

use kinfolk_domain::{PersonId, RelationCode, RelationshipEdge};
use std::collections::BTreeMap;
use std::fmt;

/// Why a candidate deduction was not committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    /// The deduction pointed back at the subject
    SelfRelationship,
    /// No composition rule for the pair of codes
    NoRule,
    /// A gender-specific code was needed and the gender is unknown
    UnresolvedGender,
    /// The deduced code is not in the catalog
    UnknownRelationType,
    /// An accepted edge already exists; the existing edge wins
    DuplicateEdge,
}

impl SkipReason {
    /// Get the reason as a short label
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::SelfRelationship => "self_relationship",
            SkipReason::NoRule => "no_rule",
            SkipReason::UnresolvedGender => "unresolved_gender",
            SkipReason::UnknownRelationType => "unknown_relation_type",
            SkipReason::DuplicateEdge => "duplicate_edge",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A neighbour of the connector that produced no edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCandidate {
    /// The neighbour
    pub other: PersonId,
    /// Deduced code, when composition got that far
    pub code: Option<RelationCode>,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Result of one propagation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationReport {
    /// Person the new relationships are described from
    pub subject: PersonId,
    /// Person the deductions run through
    pub connector: PersonId,
    /// Code of the triggering edge
    pub code: RelationCode,
    /// Neighbours of the connector examined
    pub scanned: usize,
    /// Edges committed by this pass, forward and inverse
    pub created: Vec<RelationshipEdge>,
    /// Candidates that were not committed
    pub skipped: Vec<SkippedCandidate>,
    /// Neighbours whose forward edge was written without an inverse
    pub forward_only: Vec<PersonId>,
}

impl PropagationReport {
    /// Create an empty report for a trigger
    pub fn new(subject: PersonId, connector: PersonId, code: RelationCode) -> Self {
        Self {
            subject,
            connector,
            code,
            scanned: 0,
            created: Vec::new(),
            skipped: Vec::new(),
            forward_only: Vec::new(),
        }
    }

    /// Record a skipped candidate
    pub fn skip(&mut self, other: PersonId, code: Option<RelationCode>, reason: SkipReason) {
        self.skipped.push(SkippedCandidate { other, code, reason });
    }

    /// Skips grouped by reason
    pub fn skip_counts(&self) -> BTreeMap<SkipReason, usize> {
        let mut counts = BTreeMap::new();
        for skipped in &self.skipped {
            *counts.entry(skipped.reason).or_insert(0) += 1;
        }
        counts
    }

    /// Number of skips with the given reason
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }

    /// Whether the pass created nothing
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    /// Generate a summary of the pass
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Propagation {} -[{}]-> {}", self.subject, self.code, self.connector),
            format!("Scanned: {}", self.scanned),
            format!("Created: {}", self.created.len()),
        ];

        if !self.forward_only.is_empty() {
            lines.push(format!("Without inverse: {}", self.forward_only.len()));
        }

        if !self.skipped.is_empty() {
            lines.push("Skipped:".to_string());
            for (reason, count) in self.skip_counts() {
                lines.push(format!("  {}: {}", reason, count));
            }
        }

        lines.join("\n")
    }
}
