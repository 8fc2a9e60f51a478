//! Inverse relations
//!
//! For an edge `(A, B, code)` the inverse is the code B uses to describe A.
//! It depends on A's gender ("father" inverts to "son" or "daughter"). Cousins
//! and sibling-in-law codes invert to a fixed code regardless of gender.

use crate::{Gender, Kinship, RelationCode};

/// Computes gender-specific inverse codes
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseResolver;

impl InverseResolver {
    /// Create the resolver
    pub fn new() -> Self {
        Self
    }

    /// Inverse of `code` for a holder of `holder_gender`
    ///
    /// `holder_gender` is the gender of the edge's original subject, who
    /// becomes the person named by the inverse code. Returns `None` when the
    /// inverse needs a concrete gender that is unknown; callers must skip the
    /// inverse rather than guess.
    ///
    /// # Examples
    ///
    /// ```
    /// use kinfolk_domain::{Gender, InverseResolver, RelationCode};
    ///
    /// let inverse = InverseResolver::new();
    /// assert_eq!(inverse.inverse_of(RelationCode::Father, Gender::Female), Some(RelationCode::Daughter));
    /// assert_eq!(inverse.inverse_of(RelationCode::UnclePaternal, Gender::Unknown), None);
    /// ```
    pub fn inverse_of(&self, code: RelationCode, holder_gender: Gender) -> Option<RelationCode> {
        if let Some(fixed) = Self::fixed_inverse(code) {
            return Some(fixed);
        }

        let kind = match code.kinship() {
            Kinship::Parent => Kinship::Child,
            Kinship::Child => Kinship::Parent,
            Kinship::Sibling => Kinship::Sibling,
            Kinship::Spouse => Kinship::Spouse,
            Kinship::Grandparent => Kinship::Grandchild,
            Kinship::Grandchild => Kinship::Grandparent,
            Kinship::ParentSibling => Kinship::SiblingChild,
            Kinship::SiblingChild => Kinship::ParentSibling,
            Kinship::ParentInLaw => Kinship::ChildInLaw,
            Kinship::ChildInLaw => Kinship::ParentInLaw,
            Kinship::SiblingInLaw => Kinship::SiblingInLaw,
            Kinship::StepParent => Kinship::StepChild,
            Kinship::StepChild => Kinship::StepParent,
            Kinship::StepSibling => Kinship::StepSibling,
            Kinship::Cousin => Kinship::Cousin,
            Kinship::FamilyMember => Kinship::FamilyMember,
        };

        // The side of a grandchild or nephew edge says nothing about which of
        // the holder's children links them, so inverses are side-less.
        RelationCode::from_parts(kind, None, holder_gender)
    }

    /// Inverses that do not depend on the holder's gender
    pub fn fixed_inverse(code: RelationCode) -> Option<RelationCode> {
        match code {
            RelationCode::BrotherInLaw => Some(RelationCode::SisterInLaw),
            RelationCode::SisterInLaw => Some(RelationCode::BrotherInLaw),
            c if c.kinship() == Kinship::Cousin => Some(RelationCode::Cousin),
            _ => None,
        }
    }
}
