//! Domain-level error types

use thiserror::Error;

/// Errors raised while interpreting relation codes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationError {
    /// The code is not part of the loaded catalog
    #[error("Unknown relation type: {0}")]
    UnknownRelationType(String),

    /// A gender-dependent result was needed but the gender is unknown
    #[error("Gender unresolved for {0}")]
    UnresolvedGender(String),
}

/// Errors raised while loading the relationship catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A catalog row names a code outside the relation vocabulary
    #[error("Unknown relation type in catalog: {0}")]
    UnknownRelationType(String),

    /// The same code appears twice in one load
    #[error("Duplicate catalog code: {0}")]
    DuplicateCode(String),

    /// A row is internally inconsistent with its code
    #[error("Invalid catalog definition: {0}")]
    InvalidDefinition(String),

    /// The catalog source could not be read
    #[error("Catalog source error: {0}")]
    Source(String),
}

impl From<RelationError> for CatalogError {
    fn from(e: RelationError) -> Self {
        match e {
            RelationError::UnknownRelationType(code) => CatalogError::UnknownRelationType(code),
            other => CatalogError::InvalidDefinition(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RelationError::UnknownRelationType("godparent".to_string());
        assert_eq!(err.to_string(), "Unknown relation type: godparent");

        let err: CatalogError = err.into();
        assert_eq!(err, CatalogError::UnknownRelationType("godparent".to_string()));

        let err: CatalogError = RelationError::UnresolvedGender("uncle".to_string()).into();
        assert_eq!(err.to_string(), "Invalid catalog definition: Gender unresolved for uncle");
    }

    #[test]
    fn test_errors_are_std_errors() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<RelationError>();
        assert_error::<CatalogError>();
    }
}
