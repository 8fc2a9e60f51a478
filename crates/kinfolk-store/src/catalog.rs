//! Catalog source backed by the `relationship_types` table

use crate::StoreError;
use kinfolk_domain::{CatalogError, CatalogSource, Category, Gender, RelationCode, RelationshipTypeDef};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;

/// Loads enabled relation types from a store's database file
///
/// Each load opens a short-lived read-only connection, so the source can be
/// shared across threads while stores keep their own connections.
#[derive(Debug, Clone)]
pub struct SqliteCatalogSource {
    path: PathBuf,
}

impl SqliteCatalogSource {
    /// Create a source for the database at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load_rows(&self) -> Result<Vec<(String, i64, String, String)>, StoreError> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare(
            "SELECT code, generation, category, required_gender
             FROM relationship_types WHERE enabled = 1 ORDER BY code",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl CatalogSource for SqliteCatalogSource {
    fn load(&self) -> Result<Vec<RelationshipTypeDef>, CatalogError> {
        let rows = self.load_rows().map_err(|e| CatalogError::Source(e.to_string()))?;

        rows.into_iter()
            .map(|(code, generation, category, gender)| -> Result<RelationshipTypeDef, CatalogError> {
                let code: RelationCode = code.parse()?;
                let category = Category::parse(&category).ok_or_else(|| {
                    CatalogError::InvalidDefinition(format!("{}: unknown category {}", code, category))
                })?;
                let required_gender = gender
                    .parse::<Gender>()
                    .map_err(|e| CatalogError::InvalidDefinition(format!("{}: {}", code, e)))?;
                let generation = i8::try_from(generation).map_err(|_| {
                    CatalogError::InvalidDefinition(format!("{}: generation {} out of range", code, generation))
                })?;

                Ok(RelationshipTypeDef {
                    code,
                    generation,
                    category,
                    required_gender,
                })
            })
            .collect()
    }
}
