//! Person module - the read-only view of a profile the engines work with

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a person based on UUIDv7
///
/// Profiles are owned by an external store; the id is the only thing the
/// relationship graph keeps about them besides name and gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(u128);

impl PersonId {
    /// Generate a new UUIDv7-based PersonId
    ///
    /// # Examples
    ///
    /// ```
    /// use kinfolk_domain::PersonId;
    ///
    /// let id = PersonId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a PersonId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a PersonId from its UUID string form
    ///
    /// # Examples
    ///
    /// ```
    /// use kinfolk_domain::PersonId;
    ///
    /// let id = PersonId::new();
    /// let parsed = PersonId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid person id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for PersonId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Recorded or resolved gender of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Not recorded and not resolvable
    #[default]
    Unknown,
}

impl Gender {
    /// Get the gender as its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }

    /// Whether a concrete gender is known
    pub fn is_known(&self) -> bool {
        !matches!(self, Gender::Unknown)
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "unknown" | "" => Ok(Gender::Unknown),
            other => Err(format!("Unknown gender: {}", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person as supplied by the profile store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Unique identifier
    pub id: PersonId,

    /// Name shown to users (first token doubles as the given name)
    pub display_name: String,

    /// Recorded gender attribute, `Unknown` when absent
    pub gender: Gender,
}

impl Person {
    /// Create a person with a fresh id
    pub fn new(display_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: PersonId::new(),
            display_name: display_name.into(),
            gender,
        }
    }

    /// First whitespace-separated token of the display name
    pub fn given_name(&self) -> Option<&str> {
        self.display_name.split_whitespace().next()
    }
}
