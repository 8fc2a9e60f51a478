//! Kinfolk Inference
//!
//! Relationship propagation and suggestions over the family graph.
//!
//! # Overview
//!
//! - **Propagation**: when `subject -> connector` is accepted, every
//!   relationship of the connector is composed into a candidate
//!   `subject -> other`, and survivors are committed with their inverses in
//!   one transaction
//! - **Suggestions**: the same composition, read-only, ranked by confidence
//! - **Service**: confirmation and request handling that triggers propagation
//!   and keeps inference failures from failing the user's action
//!
//! # Guards
//!
//! | Condition | Handling |
//! |-----------|----------|
//! | Deduction points back at the subject | skipped |
//! | Accepted edge already exists | skipped, existing edge wins |
//! | Gender needed but unknown | skipped, never guessed |
//! | Code not in the catalog | skipped and logged |
//! | Storage failure while committing | whole pass rolled back |
//!
//! # Usage
//!
//! ```
//! use kinfolk_domain::{Gender, Person, RelationCode};
//! use kinfolk_inference::RelationshipService;
//! use kinfolk_store::MemoryStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut service = RelationshipService::with_defaults(MemoryStore::new());
//! let me = service.store_mut().add_person(Person::new("Sam", Gender::Male));
//! let dad = service.store_mut().add_person(Person::new("Bob", Gender::Male));
//! let uncle = service.store_mut().add_person(Person::new("Carl", Gender::Male));
//!
//! service.confirm(dad, uncle, RelationCode::Brother)?;
//! let outcome = service.confirm(me, dad, RelationCode::Father)?;
//!
//! // Carl is now Sam's paternal uncle, and Sam is Carl's nephew
//! assert_eq!(outcome.inference.created().len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Settings are usually read from the `[inference]` table of a TOML file:
//!
//! ```toml
//! [inference.gender]
//! name_fallback = false
//!
//! [inference.suggestions]
//! blood_confidence = 0.9
//! marriage_confidence = 0.75
//! common_parent_confidence = 0.6
//! fallback_confidence = 0.3
//! include_fallback = true
//! max_suggestions = 50
//! hint_timeout_ms = 2000
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod graph;
mod report;
mod service;
mod suggestion;

pub use config::{GenderConfig, InferenceConfig, SuggestionConfig};
pub use engine::InferenceEngine;
pub use error::InferenceError;
pub use report::{PropagationReport, SkipReason, SkippedCandidate};
pub use service::{ConfirmOutcome, InferenceOutcome, RelationshipService};
pub use suggestion::{Suggestion, SuggestionBasis, SuggestionEngine};
