//! Relationship catalog - the closed set of relation types in use
//!
//! The catalog is reference data: loaded once from a [`CatalogSource`],
//! validated, then served from a shared snapshot until [`RelationshipCatalog::invalidate`]
//! is called. Normal request handling only reads it.

use crate::{Category, CatalogError, Gender, RelationCode, RelationError};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Definition of one relation type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipTypeDef {
    /// The relation code
    pub code: RelationCode,

    /// Generation offset (ancestor > 0, descendant < 0, peer = 0)
    pub generation: i8,

    /// Blood, marriage, in-law or step
    pub category: Category,

    /// Gender the target person must have, `Unknown` meaning any
    pub required_gender: Gender,
}

impl RelationshipTypeDef {
    /// Derive the canonical definition of a code
    pub fn for_code(code: RelationCode) -> Self {
        Self {
            code,
            generation: code.generation(),
            category: code.category(),
            required_gender: code.gender(),
        }
    }

    /// Check a definition loaded from an external source against its code
    pub fn validate(&self) -> Result<(), CatalogError> {
        let canonical = Self::for_code(self.code);
        if *self != canonical {
            return Err(CatalogError::InvalidDefinition(format!(
                "{} expects generation {} / {} / {}, found {} / {} / {}",
                self.code,
                canonical.generation,
                canonical.category.as_str(),
                canonical.required_gender,
                self.generation,
                self.category.as_str(),
                self.required_gender,
            )));
        }
        Ok(())
    }
}

/// Where catalog definitions come from
pub trait CatalogSource: Send + Sync {
    /// Load every enabled relation type definition
    fn load(&self) -> Result<Vec<RelationshipTypeDef>, CatalogError>;
}

/// Catalog source serving every known code
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl CatalogSource for BuiltinCatalog {
    fn load(&self) -> Result<Vec<RelationshipTypeDef>, CatalogError> {
        Ok(RelationCode::ALL
            .iter()
            .copied()
            .map(RelationshipTypeDef::for_code)
            .collect())
    }
}

/// Validated, immutable view of the catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    defs: HashMap<RelationCode, RelationshipTypeDef>,
}

impl CatalogSnapshot {
    /// Validate a set of definitions into a snapshot
    pub fn from_defs(defs: Vec<RelationshipTypeDef>) -> Result<Self, CatalogError> {
        let mut map = HashMap::with_capacity(defs.len());
        for def in defs {
            def.validate()?;
            if map.insert(def.code, def.clone()).is_some() {
                return Err(CatalogError::DuplicateCode(def.code.to_string()));
            }
        }
        Ok(Self { defs: map })
    }

    /// Look up a code
    pub fn get(&self, code: RelationCode) -> Result<&RelationshipTypeDef, RelationError> {
        self.defs
            .get(&code)
            .ok_or_else(|| RelationError::UnknownRelationType(code.to_string()))
    }

    /// Whether the code is part of this catalog
    pub fn contains(&self, code: RelationCode) -> bool {
        self.defs.contains_key(&code)
    }

    /// All definitions, in code order
    pub fn all(&self) -> Vec<RelationshipTypeDef> {
        let mut defs: Vec<_> = self.defs.values().cloned().collect();
        defs.sort_by_key(|d| d.code);
        defs
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Read-through cache over a [`CatalogSource`]
pub struct RelationshipCatalog {
    source: Box<dyn CatalogSource>,
    snapshot: RwLock<Option<Arc<CatalogSnapshot>>>,
}

impl RelationshipCatalog {
    /// Create a catalog over the given source (nothing is loaded yet)
    pub fn new(source: impl CatalogSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            snapshot: RwLock::new(None),
        }
    }

    /// Catalog over [`BuiltinCatalog`]
    pub fn builtin() -> Self {
        Self::new(BuiltinCatalog)
    }

    /// Process-wide catalog backed by the builtin source
    pub fn global() -> Arc<RelationshipCatalog> {
        static GLOBAL: OnceLock<Arc<RelationshipCatalog>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(RelationshipCatalog::builtin())))
    }

    /// Current snapshot, loading it if needed
    pub fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        if let Some(snapshot) = self.read_cached() {
            return Ok(snapshot);
        }

        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        // Another reader may have loaded while we waited for the write lock
        if let Some(snapshot) = guard.as_ref() {
            return Ok(Arc::clone(snapshot));
        }
        let loaded = Arc::new(CatalogSnapshot::from_defs(self.source.load()?)?);
        *guard = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Look up a code
    ///
    /// Unknown or disabled codes yield `UnknownRelationType`; callers skip
    /// the candidate rather than fail.
    pub fn get(&self, code: RelationCode) -> Result<RelationshipTypeDef, RelationError> {
        let snapshot = self
            .snapshot()
            .map_err(|e| RelationError::UnknownRelationType(format!("{} ({})", code, e)))?;
        snapshot.get(code).cloned()
    }

    /// Look up a code by its storage string
    pub fn get_str(&self, code: &str) -> Result<RelationshipTypeDef, RelationError> {
        self.get(code.parse()?)
    }

    /// All definitions
    pub fn all(&self) -> Result<Vec<RelationshipTypeDef>, CatalogError> {
        Ok(self.snapshot()?.all())
    }

    /// Drop the cached snapshot; the next read reloads from the source
    pub fn invalidate(&self) {
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    fn read_cached(&self) -> Option<Arc<CatalogSnapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(Arc::clone)
    }
}

impl std::fmt::Debug for RelationshipCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipCatalog")
            .field("loaded", &self.read_cached().is_some())
            .finish()
    }
}
