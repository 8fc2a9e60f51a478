//! Relation codes - the closed vocabulary of family relationships
//!
//! An edge `(A, B, code)` reads "B is A's `code`". Every code decomposes into
//! a [`Kinship`] kind, an optional [`Side`] of the family and the [`Gender`]
//! of the person it names. Composition and inversion work on those parts and
//! map back to a concrete code through [`RelationCode::from_parts`].

use crate::{Gender, RelationError};
use std::fmt;
use std::str::FromStr;

/// Structural kind of a relationship, independent of gender and side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kinship {
    /// Father / mother
    Parent,
    /// Son / daughter
    Child,
    /// Brother / sister
    Sibling,
    /// Husband / wife
    Spouse,
    /// Grandfather / grandmother
    Grandparent,
    /// Grandson / granddaughter
    Grandchild,
    /// Uncle / aunt
    ParentSibling,
    /// Nephew / niece
    SiblingChild,
    /// First cousin
    Cousin,
    /// Father- / mother-in-law
    ParentInLaw,
    /// Son- / daughter-in-law
    ChildInLaw,
    /// Brother- / sister-in-law
    SiblingInLaw,
    /// Stepfather / stepmother
    StepParent,
    /// Stepson / stepdaughter
    StepChild,
    /// Stepbrother / stepsister
    StepSibling,
    /// Related, but no more precise code is known
    FamilyMember,
}

impl Kinship {
    /// Generation offset of the named person relative to the subject
    ///
    /// Ancestors are positive, descendants negative, peers zero.
    pub fn generation(&self) -> i8 {
        match self {
            Kinship::Grandparent => 2,
            Kinship::Parent
            | Kinship::ParentSibling
            | Kinship::ParentInLaw
            | Kinship::StepParent => 1,
            Kinship::Sibling
            | Kinship::Spouse
            | Kinship::Cousin
            | Kinship::SiblingInLaw
            | Kinship::StepSibling
            | Kinship::FamilyMember => 0,
            Kinship::Child
            | Kinship::SiblingChild
            | Kinship::ChildInLaw
            | Kinship::StepChild => -1,
            Kinship::Grandchild => -2,
        }
    }

    /// Category of relationships of this kind
    pub fn category(&self) -> Category {
        match self {
            Kinship::Spouse => Category::Marriage,
            Kinship::ParentInLaw | Kinship::ChildInLaw | Kinship::SiblingInLaw => Category::InLaw,
            Kinship::StepParent | Kinship::StepChild | Kinship::StepSibling => Category::Step,
            _ => Category::Blood,
        }
    }
}

/// Side of the family a relationship runs through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Through the father
    Paternal,
    /// Through the mother
    Maternal,
}

/// Category of a relationship type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Descent-based relationship
    Blood,
    /// Direct marriage
    Marriage,
    /// Relationship through a spouse
    InLaw,
    /// Relationship through a step-parent
    Step,
}

impl Category {
    /// Get the category as its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Blood => "blood",
            Category::Marriage => "marriage",
            Category::InLaw => "in_law",
            Category::Step => "step",
        }
    }

    /// Parse a category from its storage string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "blood" => Some(Category::Blood),
            "marriage" => Some(Category::Marriage),
            "in_law" => Some(Category::InLaw),
            "step" => Some(Category::Step),
            _ => None,
        }
    }
}

/// A relation code
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationCode {
    Father,
    Mother,
    Parent,
    Son,
    Daughter,
    Child,
    Brother,
    Sister,
    Sibling,
    Husband,
    Wife,
    Spouse,
    GrandfatherPaternal,
    GrandmotherPaternal,
    GrandfatherMaternal,
    GrandmotherMaternal,
    Grandfather,
    Grandmother,
    Grandson,
    Granddaughter,
    UnclePaternal,
    AuntPaternal,
    UncleMaternal,
    AuntMaternal,
    Uncle,
    Aunt,
    Nephew,
    Niece,
    CousinPaternalM,
    CousinPaternalF,
    CousinMaternalM,
    CousinMaternalF,
    Cousin,
    FatherInLaw,
    MotherInLaw,
    SonInLaw,
    DaughterInLaw,
    BrotherInLaw,
    SisterInLaw,
    Stepfather,
    Stepmother,
    Stepson,
    Stepdaughter,
    Stepbrother,
    Stepsister,
    FamilyMember,
}

impl RelationCode {
    /// Every code, in declaration order
    pub const ALL: [RelationCode; 46] = [
        RelationCode::Father,
        RelationCode::Mother,
        RelationCode::Parent,
        RelationCode::Son,
        RelationCode::Daughter,
        RelationCode::Child,
        RelationCode::Brother,
        RelationCode::Sister,
        RelationCode::Sibling,
        RelationCode::Husband,
        RelationCode::Wife,
        RelationCode::Spouse,
        RelationCode::GrandfatherPaternal,
        RelationCode::GrandmotherPaternal,
        RelationCode::GrandfatherMaternal,
        RelationCode::GrandmotherMaternal,
        RelationCode::Grandfather,
        RelationCode::Grandmother,
        RelationCode::Grandson,
        RelationCode::Granddaughter,
        RelationCode::UnclePaternal,
        RelationCode::AuntPaternal,
        RelationCode::UncleMaternal,
        RelationCode::AuntMaternal,
        RelationCode::Uncle,
        RelationCode::Aunt,
        RelationCode::Nephew,
        RelationCode::Niece,
        RelationCode::CousinPaternalM,
        RelationCode::CousinPaternalF,
        RelationCode::CousinMaternalM,
        RelationCode::CousinMaternalF,
        RelationCode::Cousin,
        RelationCode::FatherInLaw,
        RelationCode::MotherInLaw,
        RelationCode::SonInLaw,
        RelationCode::DaughterInLaw,
        RelationCode::BrotherInLaw,
        RelationCode::SisterInLaw,
        RelationCode::Stepfather,
        RelationCode::Stepmother,
        RelationCode::Stepson,
        RelationCode::Stepdaughter,
        RelationCode::Stepbrother,
        RelationCode::Stepsister,
        RelationCode::FamilyMember,
    ];

    /// Get the code as its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationCode::Father => "father",
            RelationCode::Mother => "mother",
            RelationCode::Parent => "parent",
            RelationCode::Son => "son",
            RelationCode::Daughter => "daughter",
            RelationCode::Child => "child",
            RelationCode::Brother => "brother",
            RelationCode::Sister => "sister",
            RelationCode::Sibling => "sibling",
            RelationCode::Husband => "husband",
            RelationCode::Wife => "wife",
            RelationCode::Spouse => "spouse",
            RelationCode::GrandfatherPaternal => "grandfather_paternal",
            RelationCode::GrandmotherPaternal => "grandmother_paternal",
            RelationCode::GrandfatherMaternal => "grandfather_maternal",
            RelationCode::GrandmotherMaternal => "grandmother_maternal",
            RelationCode::Grandfather => "grandfather",
            RelationCode::Grandmother => "grandmother",
            RelationCode::Grandson => "grandson",
            RelationCode::Granddaughter => "granddaughter",
            RelationCode::UnclePaternal => "uncle_paternal",
            RelationCode::AuntPaternal => "aunt_paternal",
            RelationCode::UncleMaternal => "uncle_maternal",
            RelationCode::AuntMaternal => "aunt_maternal",
            RelationCode::Uncle => "uncle",
            RelationCode::Aunt => "aunt",
            RelationCode::Nephew => "nephew",
            RelationCode::Niece => "niece",
            RelationCode::CousinPaternalM => "cousin_paternal_m",
            RelationCode::CousinPaternalF => "cousin_paternal_f",
            RelationCode::CousinMaternalM => "cousin_maternal_m",
            RelationCode::CousinMaternalF => "cousin_maternal_f",
            RelationCode::Cousin => "cousin",
            RelationCode::FatherInLaw => "father_in_law",
            RelationCode::MotherInLaw => "mother_in_law",
            RelationCode::SonInLaw => "son_in_law",
            RelationCode::DaughterInLaw => "daughter_in_law",
            RelationCode::BrotherInLaw => "brother_in_law",
            RelationCode::SisterInLaw => "sister_in_law",
            RelationCode::Stepfather => "stepfather",
            RelationCode::Stepmother => "stepmother",
            RelationCode::Stepson => "stepson",
            RelationCode::Stepdaughter => "stepdaughter",
            RelationCode::Stepbrother => "stepbrother",
            RelationCode::Stepsister => "stepsister",
            RelationCode::FamilyMember => "family_member",
        }
    }

    /// Human-readable label used in rationales
    pub fn label(&self) -> &'static str {
        match self {
            RelationCode::GrandfatherPaternal => "paternal grandfather",
            RelationCode::GrandmotherPaternal => "paternal grandmother",
            RelationCode::GrandfatherMaternal => "maternal grandfather",
            RelationCode::GrandmotherMaternal => "maternal grandmother",
            RelationCode::UnclePaternal => "paternal uncle",
            RelationCode::AuntPaternal => "paternal aunt",
            RelationCode::UncleMaternal => "maternal uncle",
            RelationCode::AuntMaternal => "maternal aunt",
            RelationCode::CousinPaternalM | RelationCode::CousinPaternalF => "paternal cousin",
            RelationCode::CousinMaternalM | RelationCode::CousinMaternalF => "maternal cousin",
            RelationCode::FatherInLaw => "father-in-law",
            RelationCode::MotherInLaw => "mother-in-law",
            RelationCode::SonInLaw => "son-in-law",
            RelationCode::DaughterInLaw => "daughter-in-law",
            RelationCode::BrotherInLaw => "brother-in-law",
            RelationCode::SisterInLaw => "sister-in-law",
            RelationCode::FamilyMember => "family member",
            other => other.as_str(),
        }
    }

    /// Decompose the code into kind, side and gender
    pub fn parts(&self) -> (Kinship, Option<Side>, Gender) {
        use Gender::{Female as F, Male as M, Unknown as U};
        use Kinship as K;
        use Side::{Maternal as Mat, Paternal as Pat};

        match self {
            RelationCode::Father => (K::Parent, None, M),
            RelationCode::Mother => (K::Parent, None, F),
            RelationCode::Parent => (K::Parent, None, U),
            RelationCode::Son => (K::Child, None, M),
            RelationCode::Daughter => (K::Child, None, F),
            RelationCode::Child => (K::Child, None, U),
            RelationCode::Brother => (K::Sibling, None, M),
            RelationCode::Sister => (K::Sibling, None, F),
            RelationCode::Sibling => (K::Sibling, None, U),
            RelationCode::Husband => (K::Spouse, None, M),
            RelationCode::Wife => (K::Spouse, None, F),
            RelationCode::Spouse => (K::Spouse, None, U),
            RelationCode::GrandfatherPaternal => (K::Grandparent, Some(Pat), M),
            RelationCode::GrandmotherPaternal => (K::Grandparent, Some(Pat), F),
            RelationCode::GrandfatherMaternal => (K::Grandparent, Some(Mat), M),
            RelationCode::GrandmotherMaternal => (K::Grandparent, Some(Mat), F),
            RelationCode::Grandfather => (K::Grandparent, None, M),
            RelationCode::Grandmother => (K::Grandparent, None, F),
            RelationCode::Grandson => (K::Grandchild, None, M),
            RelationCode::Granddaughter => (K::Grandchild, None, F),
            RelationCode::UnclePaternal => (K::ParentSibling, Some(Pat), M),
            RelationCode::AuntPaternal => (K::ParentSibling, Some(Pat), F),
            RelationCode::UncleMaternal => (K::ParentSibling, Some(Mat), M),
            RelationCode::AuntMaternal => (K::ParentSibling, Some(Mat), F),
            RelationCode::Uncle => (K::ParentSibling, None, M),
            RelationCode::Aunt => (K::ParentSibling, None, F),
            RelationCode::Nephew => (K::SiblingChild, None, M),
            RelationCode::Niece => (K::SiblingChild, None, F),
            RelationCode::CousinPaternalM => (K::Cousin, Some(Pat), M),
            RelationCode::CousinPaternalF => (K::Cousin, Some(Pat), F),
            RelationCode::CousinMaternalM => (K::Cousin, Some(Mat), M),
            RelationCode::CousinMaternalF => (K::Cousin, Some(Mat), F),
            RelationCode::Cousin => (K::Cousin, None, U),
            RelationCode::FatherInLaw => (K::ParentInLaw, None, M),
            RelationCode::MotherInLaw => (K::ParentInLaw, None, F),
            RelationCode::SonInLaw => (K::ChildInLaw, None, M),
            RelationCode::DaughterInLaw => (K::ChildInLaw, None, F),
            RelationCode::BrotherInLaw => (K::SiblingInLaw, None, M),
            RelationCode::SisterInLaw => (K::SiblingInLaw, None, F),
            RelationCode::Stepfather => (K::StepParent, None, M),
            RelationCode::Stepmother => (K::StepParent, None, F),
            RelationCode::Stepson => (K::StepChild, None, M),
            RelationCode::Stepdaughter => (K::StepChild, None, F),
            RelationCode::Stepbrother => (K::StepSibling, None, M),
            RelationCode::Stepsister => (K::StepSibling, None, F),
            RelationCode::FamilyMember => (K::FamilyMember, None, U),
        }
    }

    /// Structural kind of this code
    pub fn kinship(&self) -> Kinship {
        self.parts().0
    }

    /// Family side recorded in this code, if any
    pub fn side(&self) -> Option<Side> {
        self.parts().1
    }

    /// Gender of the person this code names (`Unknown` for neutral codes)
    pub fn gender(&self) -> Gender {
        self.parts().2
    }

    /// Side of the family a chain starting with this code runs through
    ///
    /// A father opens the paternal line, a mother the maternal one; sided
    /// codes carry their own side.
    pub fn lineage_side(&self) -> Option<Side> {
        match self {
            RelationCode::Father => Some(Side::Paternal),
            RelationCode::Mother => Some(Side::Maternal),
            other => other.side(),
        }
    }

    /// Generation offset of the named person relative to the subject
    pub fn generation(&self) -> i8 {
        self.kinship().generation()
    }

    /// Category of this code
    pub fn category(&self) -> Category {
        self.kinship().category()
    }

    /// Whether this code is gender-neutral
    pub fn is_neutral(&self) -> bool {
        !self.gender().is_known()
    }

    /// Build a concrete code from its parts
    ///
    /// Unknown gender falls back to the kind's neutral code; kinds without
    /// a neutral code yield `None`. Cousins lose their side when gender is
    /// unknown, since sided cousin codes are gendered.
    pub fn from_parts(kind: Kinship, side: Option<Side>, gender: Gender) -> Option<Self> {
        use Gender::{Female as F, Male as M, Unknown as U};
        use Side::{Maternal as Mat, Paternal as Pat};

        let code = match (kind, side, gender) {
            (Kinship::Parent, _, M) => RelationCode::Father,
            (Kinship::Parent, _, F) => RelationCode::Mother,
            (Kinship::Parent, _, U) => RelationCode::Parent,
            (Kinship::Child, _, M) => RelationCode::Son,
            (Kinship::Child, _, F) => RelationCode::Daughter,
            (Kinship::Child, _, U) => RelationCode::Child,
            (Kinship::Sibling, _, M) => RelationCode::Brother,
            (Kinship::Sibling, _, F) => RelationCode::Sister,
            (Kinship::Sibling, _, U) => RelationCode::Sibling,
            (Kinship::Spouse, _, M) => RelationCode::Husband,
            (Kinship::Spouse, _, F) => RelationCode::Wife,
            (Kinship::Spouse, _, U) => RelationCode::Spouse,
            (Kinship::Grandparent, Some(Pat), M) => RelationCode::GrandfatherPaternal,
            (Kinship::Grandparent, Some(Pat), F) => RelationCode::GrandmotherPaternal,
            (Kinship::Grandparent, Some(Mat), M) => RelationCode::GrandfatherMaternal,
            (Kinship::Grandparent, Some(Mat), F) => RelationCode::GrandmotherMaternal,
            (Kinship::Grandparent, None, M) => RelationCode::Grandfather,
            (Kinship::Grandparent, None, F) => RelationCode::Grandmother,
            (Kinship::Grandchild, _, M) => RelationCode::Grandson,
            (Kinship::Grandchild, _, F) => RelationCode::Granddaughter,
            (Kinship::ParentSibling, Some(Pat), M) => RelationCode::UnclePaternal,
            (Kinship::ParentSibling, Some(Pat), F) => RelationCode::AuntPaternal,
            (Kinship::ParentSibling, Some(Mat), M) => RelationCode::UncleMaternal,
            (Kinship::ParentSibling, Some(Mat), F) => RelationCode::AuntMaternal,
            (Kinship::ParentSibling, None, M) => RelationCode::Uncle,
            (Kinship::ParentSibling, None, F) => RelationCode::Aunt,
            (Kinship::SiblingChild, _, M) => RelationCode::Nephew,
            (Kinship::SiblingChild, _, F) => RelationCode::Niece,
            (Kinship::Cousin, Some(Pat), M) => RelationCode::CousinPaternalM,
            (Kinship::Cousin, Some(Pat), F) => RelationCode::CousinPaternalF,
            (Kinship::Cousin, Some(Mat), M) => RelationCode::CousinMaternalM,
            (Kinship::Cousin, Some(Mat), F) => RelationCode::CousinMaternalF,
            (Kinship::Cousin, _, _) => RelationCode::Cousin,
            (Kinship::ParentInLaw, _, M) => RelationCode::FatherInLaw,
            (Kinship::ParentInLaw, _, F) => RelationCode::MotherInLaw,
            (Kinship::ChildInLaw, _, M) => RelationCode::SonInLaw,
            (Kinship::ChildInLaw, _, F) => RelationCode::DaughterInLaw,
            (Kinship::SiblingInLaw, _, M) => RelationCode::BrotherInLaw,
            (Kinship::SiblingInLaw, _, F) => RelationCode::SisterInLaw,
            (Kinship::StepParent, _, M) => RelationCode::Stepfather,
            (Kinship::StepParent, _, F) => RelationCode::Stepmother,
            (Kinship::StepChild, _, M) => RelationCode::Stepson,
            (Kinship::StepChild, _, F) => RelationCode::Stepdaughter,
            (Kinship::StepSibling, _, M) => RelationCode::Stepbrother,
            (Kinship::StepSibling, _, F) => RelationCode::Stepsister,
            (Kinship::FamilyMember, _, _) => RelationCode::FamilyMember,
            (
                Kinship::Grandparent
                | Kinship::Grandchild
                | Kinship::ParentSibling
                | Kinship::SiblingChild
                | Kinship::ParentInLaw
                | Kinship::ChildInLaw
                | Kinship::SiblingInLaw
                | Kinship::StepParent
                | Kinship::StepChild
                | Kinship::StepSibling,
                _,
                U,
            ) => return None,
        };

        Some(code)
    }
}

impl FromStr for RelationCode {
    type Err = RelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RelationCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == wanted)
            .ok_or_else(|| RelationError::UnknownRelationType(wanted.to_string()))
    }
}

impl fmt::Display for RelationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<&str> = RelationCode::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes.len(), RelationCode::ALL.len());
        for code in RelationCode::ALL {
            assert_eq!(code.as_str().parse::<RelationCode>(), Ok(code));
        }
    }

    #[test]
    fn test_parts_roundtrip_for_every_code() {
        for code in RelationCode::ALL {
            let (kind, side, gender) = code.parts();
            assert_eq!(RelationCode::from_parts(kind, side, gender), Some(code), "{}", code);
        }
    }

    #[test]
    fn test_parse_known_and_unknown() {
        assert_eq!("uncle_paternal".parse::<RelationCode>().unwrap(), RelationCode::UnclePaternal);
        assert_eq!(" cousin_maternal_f ".parse::<RelationCode>().unwrap(), RelationCode::CousinMaternalF);
        let err = "great_uncle".parse::<RelationCode>().unwrap_err();
        assert_eq!(err, RelationError::UnknownRelationType("great_uncle".to_string()));
    }

    #[test]
    fn test_generation_offsets() {
        assert_eq!(RelationCode::GrandmotherMaternal.generation(), 2);
        assert_eq!(RelationCode::Father.generation(), 1);
        assert_eq!(RelationCode::Cousin.generation(), 0);
        assert_eq!(RelationCode::Niece.generation(), -1);
        assert_eq!(RelationCode::Grandson.generation(), -2);
    }

    #[test]
    fn test_categories() {
        assert_eq!(RelationCode::Wife.category(), Category::Marriage);
        assert_eq!(RelationCode::BrotherInLaw.category(), Category::InLaw);
        assert_eq!(RelationCode::Stepsister.category(), Category::Step);
        assert_eq!(RelationCode::UncleMaternal.category(), Category::Blood);
    }

    #[test]
    fn test_unknown_gender_without_neutral_code() {
        assert_eq!(RelationCode::from_parts(Kinship::Grandchild, None, Gender::Unknown), None);
        assert_eq!(
            RelationCode::from_parts(Kinship::Cousin, Some(Side::Paternal), Gender::Unknown),
            Some(RelationCode::Cousin)
        );
    }

    #[test]
    fn test_lineage_side() {
        assert_eq!(RelationCode::Father.lineage_side(), Some(Side::Paternal));
        assert_eq!(RelationCode::Mother.lineage_side(), Some(Side::Maternal));
        assert_eq!(RelationCode::Parent.lineage_side(), None);
        assert_eq!(RelationCode::AuntMaternal.lineage_side(), Some(Side::Maternal));
    }
}
