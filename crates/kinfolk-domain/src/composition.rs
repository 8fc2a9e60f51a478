//! Composition rules: "Subject→C is R1 and C→Other is R2, so Subject→Other is R3"
//!
//! Rules are keyed on the structural [`Kinship`] of both codes, so the table
//! is one `match` over kind pairs. The result is a gender template
//! ([`Composition`]) that is turned into a concrete code once the target's
//! gender is known.

use crate::{Category, Gender, Kinship, RelationCode, Side};

/// Outcome of composing two relation codes, before gender adaptation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Composition {
    /// Kind of the deduced relationship
    pub kind: Kinship,

    /// Family side carried over from the chain, if any
    pub side: Option<Side>,

    /// Blood when both hops are blood relations, otherwise the first
    /// non-blood category met along the chain
    pub category: Category,
}

impl Composition {
    /// Turn the template into a concrete code for a target of `gender`
    ///
    /// Returns `None` when the kind needs a concrete gender and none is known.
    pub fn adapt(&self, gender: Gender) -> Option<RelationCode> {
        RelationCode::from_parts(self.kind, self.side, gender)
    }

    /// Generation offset of the deduced relationship
    pub fn generation(&self) -> i8 {
        self.kind.generation()
    }
}

/// The consolidated composition table
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionRuleTable;

impl CompositionRuleTable {
    /// Create the table
    pub fn new() -> Self {
        Self
    }

    /// Compose two consecutive relations
    ///
    /// Only the given order is consulted. Most pairs have no composed
    /// meaning and yield `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kinfolk_domain::{CompositionRuleTable, Gender, RelationCode};
    ///
    /// let table = CompositionRuleTable::new();
    /// let composed = table.compose(RelationCode::Father, RelationCode::Brother).unwrap();
    /// assert_eq!(composed.adapt(Gender::Male), Some(RelationCode::UnclePaternal));
    /// assert!(table.compose(RelationCode::Wife, RelationCode::Husband).is_none());
    /// ```
    pub fn compose(&self, first: RelationCode, second: RelationCode) -> Option<Composition> {
        use Kinship::*;

        let via_first = first.lineage_side();
        let via_second = second.side();

        let (kind, side) = match (first.kinship(), second.kinship()) {
            (Parent, Parent) => (Grandparent, via_first),
            (Parent, Sibling) => (ParentSibling, via_first),
            (Parent, Child) => (Sibling, None),
            (Parent, SiblingChild) => (Cousin, via_first),
            (Parent, StepChild) => (StepSibling, None),

            (Child, Child) => (Grandchild, None),
            (Child, Spouse) => (ChildInLaw, None),
            (Child, Sibling) => (Child, None),

            (Sibling, Parent) => (Parent, None),
            (Sibling, Sibling) => (Sibling, None),
            (Sibling, Child) => (SiblingChild, None),
            (Sibling, Spouse) => (SiblingInLaw, None),
            (Sibling, Grandparent) => (Grandparent, via_second),
            (Sibling, ParentSibling) => (ParentSibling, via_second),
            (Sibling, Cousin) => (Cousin, via_second),

            (Spouse, Parent) => (ParentInLaw, None),
            (Spouse, Sibling) => (SiblingInLaw, None),
            (Spouse, SiblingChild) => (SiblingChild, None),

            (ParentSibling, Child) => (Cousin, via_first),
            (ParentSibling, Spouse) => (ParentSibling, via_first),

            (Cousin, Sibling) => (Cousin, via_first),

            (StepParent, Child) => (StepSibling, None),

            _ => return None,
        };

        Some(Composition {
            kind,
            side,
            category: chain_category(first.category(), second.category()),
        })
    }

    /// Compose and adapt to the gender implied by the second code
    ///
    /// Convenience for callers that know nothing about the target beyond
    /// the edge that reaches it.
    pub fn compose_code(&self, first: RelationCode, second: RelationCode) -> Option<RelationCode> {
        self.compose(first, second)?.adapt(second.gender())
    }
}

fn chain_category(first: Category, second: Category) -> Category {
    match (first, second) {
        (Category::Blood, Category::Blood) => Category::Blood,
        (Category::Blood, other) => other,
        (other, _) => other,
    }
}
