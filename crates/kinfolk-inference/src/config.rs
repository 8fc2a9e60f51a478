//! Configuration for inference and suggestions
//!
//! Defines the gender fallback table and the suggestion confidence tiers.

use crate::InferenceError;
use kinfolk_domain::{Gender, GenderResolver, NameTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Top-level configuration for the inference services
///
/// Usually embedded as the `[inference]` table of a larger config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Gender resolution settings
    #[serde(default)]
    pub gender: GenderConfig,

    /// Suggestion scoring settings
    #[serde(default)]
    pub suggestions: SuggestionConfig,
}

impl InferenceConfig {
    /// Check every section
    pub fn validate(&self) -> Result<(), InferenceError> {
        self.gender.validate()?;
        self.suggestions.validate()
    }
}

/// Gender resolution settings
///
/// The name table is a last resort used only for persons with no recorded
/// gender. It ships empty and is disabled unless `name_fallback` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenderConfig {
    /// Consult the name table when the gender attribute is missing
    #[serde(default)]
    pub name_fallback: bool,

    /// Given name to gender (`male` / `female`)
    #[serde(default)]
    pub names: BTreeMap<String, String>,
}

impl GenderConfig {
    /// Check that every name maps to a concrete gender
    pub fn validate(&self) -> Result<(), InferenceError> {
        self.parsed_names().map(|_| ())
    }

    /// Build the resolver described by this configuration
    pub fn resolver(&self) -> Result<GenderResolver, InferenceError> {
        let names = self.parsed_names()?;
        if !self.name_fallback || names.is_empty() {
            return Ok(GenderResolver::attribute_only());
        }
        Ok(GenderResolver::with_fallback(NameTable::new(names)))
    }

    fn parsed_names(&self) -> Result<Vec<(String, Gender)>, InferenceError> {
        self.names
            .iter()
            .map(|(name, gender)| {
                let parsed: Gender = gender.parse().map_err(InferenceError::Config)?;
                if !parsed.is_known() {
                    return Err(InferenceError::Config(format!(
                        "name '{}' must map to male or female, got '{}'",
                        name, gender
                    )));
                }
                Ok((name.clone(), parsed))
            })
            .collect()
    }
}

/// Suggestion scoring settings
///
/// Confidence tiers must be strictly ordered:
/// blood > marriage > common parent > fallback.
///
/// # Examples
///
/// ```
/// use kinfolk_inference::SuggestionConfig;
///
/// let config = SuggestionConfig::default();
/// assert_eq!(config.max_suggestions, 50);
/// assert!(config.validate().is_ok());
///
/// // Only rule-backed suggestions
/// let config = SuggestionConfig::strict();
/// assert!(!config.include_fallback);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Score for a composition where both hops are blood relations
    #[serde(default = "default_blood_confidence")]
    pub blood_confidence: f64,

    /// Score for a composition through a spouse, in-law or step relation
    #[serde(default = "default_marriage_confidence")]
    pub marriage_confidence: f64,

    /// Score for a sibling inferred from a shared parent
    #[serde(default = "default_common_parent_confidence")]
    pub common_parent_confidence: f64,

    /// Score for a two-hop relative with no composition rule
    #[serde(default = "default_fallback_confidence")]
    pub fallback_confidence: f64,

    /// Propose `family_member` for two-hop relatives with no rule
    #[serde(default = "default_include_fallback")]
    pub include_fallback: bool,

    /// Upper bound on the number of suggestions returned
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Time budget for one external hint lookup (milliseconds)
    #[serde(default = "default_hint_timeout_ms")]
    pub hint_timeout_ms: u64,
}

fn default_blood_confidence() -> f64 {
    0.9
}

fn default_marriage_confidence() -> f64 {
    0.75
}

fn default_common_parent_confidence() -> f64 {
    0.6
}

fn default_fallback_confidence() -> f64 {
    0.3
}

fn default_include_fallback() -> bool {
    true
}

fn default_max_suggestions() -> usize {
    50
}

fn default_hint_timeout_ms() -> u64 {
    2_000
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            blood_confidence: default_blood_confidence(),
            marriage_confidence: default_marriage_confidence(),
            common_parent_confidence: default_common_parent_confidence(),
            fallback_confidence: default_fallback_confidence(),
            include_fallback: default_include_fallback(),
            max_suggestions: default_max_suggestions(),
            hint_timeout_ms: default_hint_timeout_ms(),
        }
    }
}

impl SuggestionConfig {
    /// Rule-backed suggestions only, short list
    pub fn strict() -> Self {
        Self {
            include_fallback: false,
            max_suggestions: 20,
            ..Self::default()
        }
    }

    /// Everything reachable in two hops, long list
    pub fn broad() -> Self {
        Self {
            include_fallback: true,
            max_suggestions: 200,
            ..Self::default()
        }
    }

    /// Get the hint budget as Duration
    pub fn hint_timeout(&self) -> Duration {
        Duration::from_millis(self.hint_timeout_ms)
    }

    /// Check ranges and tier ordering
    pub fn validate(&self) -> Result<(), InferenceError> {
        let tiers = [
            ("blood_confidence", self.blood_confidence),
            ("marriage_confidence", self.marriage_confidence),
            ("common_parent_confidence", self.common_parent_confidence),
            ("fallback_confidence", self.fallback_confidence),
        ];

        for (name, value) in tiers {
            if !(0.0..=1.0).contains(&value) {
                return Err(InferenceError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        for pair in tiers.windows(2) {
            let ((higher, a), (lower, b)) = (pair[0], pair[1]);
            if a <= b {
                return Err(InferenceError::Config(format!(
                    "{} ({}) must be greater than {} ({})",
                    higher, a, lower, b
                )));
            }
        }

        if self.max_suggestions == 0 {
            return Err(InferenceError::Config(
                "max_suggestions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
