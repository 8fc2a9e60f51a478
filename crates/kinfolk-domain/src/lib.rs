//! Kinfolk Domain Layer
//!
//! Core model and rule logic for the family relationship graph. Apart from
//! `uuid` for identifiers this crate has no external dependencies; storage and
//! services depend on it, never the other way round.
//!
//! ## Key Concepts
//!
//! - **Person**: id, display name and gender, owned by an external profile store
//! - **Relation code**: closed vocabulary (`father`, `uncle_paternal`, ...)
//! - **Catalog**: the relation types in use, cached process-wide
//! - **Composition**: two consecutive relations folded into one
//! - **Inverse**: how the other endpoint of an edge describes the subject
//!
//! ## Architecture
//!
//! - Pure functions for composition and inversion
//! - Trait definitions for profile and edge storage
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod code;
pub mod composition;
pub mod error;
pub mod gender;
pub mod inverse;
pub mod person;
pub mod relationship;
pub mod traits;

// Re-exports for convenience
pub use catalog::{BuiltinCatalog, CatalogSnapshot, CatalogSource, RelationshipCatalog, RelationshipTypeDef};
pub use code::{Category, Kinship, RelationCode, Side};
pub use composition::{Composition, CompositionRuleTable};
pub use error::{CatalogError, RelationError};
pub use gender::{GenderFallback, GenderResolver, NameTable};
pub use inverse::InverseResolver;
pub use person::{Gender, Person, PersonId};
pub use relationship::{EdgeId, EdgePair, EdgeStatus, NewEdge, RelationshipEdge};
