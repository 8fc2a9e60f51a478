//! Resolved paths and the handles commands work through.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Names;
use kinfolk_domain::{EdgeId, Person, PersonId, RelationCode, RelationshipCatalog};
use kinfolk_inference::RelationshipService;
use kinfolk_store::{SqliteCatalogSource, SqliteStore};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Service type every data command runs against.
pub type Service = RelationshipService<SqliteStore>;

/// Configuration plus the files it points at.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: Config,
    /// Where the configuration lives (or would live)
    pub config_path: PathBuf,
    /// SQLite database file
    pub db_path: PathBuf,
}

impl Context {
    /// Build a context, letting `db_override` win over the config file.
    pub fn new(config: Config, config_path: PathBuf, db_override: Option<PathBuf>) -> Self {
        let db_path = db_override.unwrap_or_else(|| config.database_path(&config_path));
        Self {
            config,
            config_path,
            db_path,
        }
    }

    /// Open the database, creating it and its directory if needed.
    pub fn open_store(&self) -> Result<SqliteStore> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(SqliteStore::open(&self.db_path, &self.config.store)?)
    }

    /// Open the relationship service over the database and its stored catalog.
    pub fn open_service(&self) -> Result<Service> {
        let store = self.open_store()?;
        let catalog = Arc::new(RelationshipCatalog::new(SqliteCatalogSource::new(
            self.db_path.clone(),
        )));
        Ok(RelationshipService::from_config(store, catalog, &self.config.inference)?)
    }
}

/// Find a person by id, or by exact display name when the input is not an id.
pub fn resolve_person(store: &SqliteStore, input: &str) -> Result<Person> {
    use kinfolk_domain::traits::PersonDirectory;

    if let Ok(id) = PersonId::from_string(input.trim()) {
        return store
            .get_person(id)?
            .ok_or_else(|| CliError::NotFound(format!("person {}", id)));
    }

    let mut matches = store.find_persons_by_name(input)?;
    match matches.len() {
        0 => Err(CliError::NotFound(format!("no person named '{}'", input.trim()))),
        1 => Ok(matches.remove(0)),
        count => Err(CliError::Ambiguous {
            name: input.trim().to_string(),
            count,
        }),
    }
}

/// Parse a relation code, accepting `uncle-paternal` and `Uncle Paternal` spellings.
pub fn parse_code(input: &str) -> Result<RelationCode> {
    let normalised = input.trim().to_lowercase().replace(['-', ' '], "_");
    normalised
        .parse()
        .map_err(|e| CliError::InvalidInput(format!("{}", e)))
}

/// Parse an edge id.
pub fn parse_edge_id(input: &str) -> Result<EdgeId> {
    EdgeId::from_string(input.trim()).map_err(CliError::InvalidInput)
}

/// Display names of everyone in the store.
pub fn all_names(store: &SqliteStore) -> Result<Names> {
    Ok(store
        .list_persons()?
        .into_iter()
        .map(|p| (p.id, p.display_name))
        .collect())
}
