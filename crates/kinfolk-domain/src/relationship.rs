//! Relationship edges between persons

use crate::{PersonId, RelationCode};
use std::fmt;

/// Unique identifier for an edge (UUIDv7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(u128);

impl EdgeId {
    /// Generate a new EdgeId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an EdgeId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an EdgeId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid edge id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Lifecycle status of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeStatus {
    /// Proposed, waiting for the other person
    Pending,
    /// Confirmed; part of the graph
    Accepted,
    /// Declined
    Rejected,
}

impl EdgeStatus {
    /// Get the status as its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeStatus::Pending => "pending",
            EdgeStatus::Accepted => "accepted",
            EdgeStatus::Rejected => "rejected",
        }
    }

    /// Parse a status from its storage string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(EdgeStatus::Pending),
            "accepted" => Some(EdgeStatus::Accepted),
            "rejected" => Some(EdgeStatus::Rejected),
            _ => None,
        }
    }
}

/// A directed, typed relationship: "object is subject's `code`"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipEdge {
    /// Unique identifier
    pub id: EdgeId,

    /// Person the relationship is described from
    pub subject: PersonId,

    /// Person being described
    pub object: PersonId,

    /// Relation code
    pub code: RelationCode,

    /// Lifecycle status
    pub status: EdgeStatus,

    /// True when produced by inference rather than confirmed by a user
    pub created_automatically: bool,

    /// Creation time (seconds since Unix epoch)
    pub created_at: u64,

    /// When the edge was accepted
    pub accepted_at: Option<u64>,
}

impl RelationshipEdge {
    /// Whether the edge is part of the accepted graph
    pub fn is_accepted(&self) -> bool {
        self.status == EdgeStatus::Accepted
    }

    /// The endpoint that is not `person`, if `person` is on this edge
    pub fn other_end(&self, person: PersonId) -> Option<PersonId> {
        if self.subject == person {
            Some(self.object)
        } else if self.object == person {
            Some(self.subject)
        } else {
            None
        }
    }
}

/// Request to insert a single edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEdge {
    /// Person the relationship is described from
    pub subject: PersonId,
    /// Person being described
    pub object: PersonId,
    /// Relation code
    pub code: RelationCode,
    /// Initial status
    pub status: EdgeStatus,
    /// True when produced by inference
    pub created_automatically: bool,
}

impl NewEdge {
    /// An accepted, user-confirmed edge
    pub fn confirmed(subject: PersonId, object: PersonId, code: RelationCode) -> Self {
        Self {
            subject,
            object,
            code,
            status: EdgeStatus::Accepted,
            created_automatically: false,
        }
    }

    /// A pending relationship request
    pub fn request(subject: PersonId, object: PersonId, code: RelationCode) -> Self {
        Self {
            status: EdgeStatus::Pending,
            ..Self::confirmed(subject, object, code)
        }
    }
}

/// A forward edge and its inverse, committed together
///
/// When the inverse cannot be resolved it is `None` and only the forward
/// edge is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePair {
    /// Person the forward edge is described from
    pub subject: PersonId,
    /// Person the forward edge describes
    pub object: PersonId,
    /// Forward relation code
    pub code: RelationCode,
    /// Code the object uses to describe the subject
    pub inverse: Option<RelationCode>,
    /// Provenance flag applied to both edges
    pub created_automatically: bool,
}

impl EdgePair {
    /// A pair derived by inference
    pub fn derived(
        subject: PersonId,
        object: PersonId,
        code: RelationCode,
        inverse: Option<RelationCode>,
    ) -> Self {
        Self {
            subject,
            object,
            code,
            inverse,
            created_automatically: true,
        }
    }

    /// A pair confirmed by a user
    pub fn confirmed(
        subject: PersonId,
        object: PersonId,
        code: RelationCode,
        inverse: Option<RelationCode>,
    ) -> Self {
        Self {
            created_automatically: false,
            ..Self::derived(subject, object, code, inverse)
        }
    }

    /// Whether the pair would relate a person to themself
    pub fn is_self_loop(&self) -> bool {
        self.subject == self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [EdgeStatus::Pending, EdgeStatus::Accepted, EdgeStatus::Rejected] {
            assert_eq!(EdgeStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EdgeStatus::parse("approved"), None);
    }

    #[test]
    fn test_other_end() {
        let a = PersonId::new();
        let b = PersonId::new();
        let edge = RelationshipEdge {
            id: EdgeId::new(),
            subject: a,
            object: b,
            code: RelationCode::Father,
            status: EdgeStatus::Accepted,
            created_automatically: false,
            created_at: 0,
            accepted_at: Some(0),
        };
        assert_eq!(edge.other_end(a), Some(b));
        assert_eq!(edge.other_end(b), Some(a));
        assert_eq!(edge.other_end(PersonId::new()), None);
    }

    #[test]
    fn test_pair_constructors() {
        let a = PersonId::new();
        let pair = EdgePair::confirmed(a, a, RelationCode::Sibling, None);
        assert!(pair.is_self_loop());
        assert!(!pair.created_automatically);
        let request = NewEdge::request(a, PersonId::new(), RelationCode::Son);
        assert_eq!(request.status, EdgeStatus::Pending);
    }
}
