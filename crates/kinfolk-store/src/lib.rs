//! Kinfolk Storage Layer
//!
//! Implements the `PersonDirectory` and `EdgeStore` traits on SQLite, plus an
//! in-memory store with the same semantics for tests and embedding.
//!
//! # Architecture
//!
//! - SQLite tables for persons, edges and the relationship-type catalog
//! - A partial unique index keeps one accepted edge per ordered pair
//! - Writes run in `BEGIN IMMEDIATE` transactions so concurrent writers
//!   serialize and existence checks are authoritative
//!
//! # Examples
//!
//! ```no_run
//! use kinfolk_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for person and edge operations
//! ```

#![warn(missing_docs)]

mod catalog;
mod config;
mod memory;

pub use catalog::SqliteCatalogSource;
pub use config::StoreConfig;
pub use memory::MemoryStore;

use kinfolk_domain::traits::{EdgeStore, PersonDirectory};
use kinfolk_domain::{
    BuiltinCatalog, CatalogSource, EdgeId, EdgePair, EdgeStatus, Gender, NewEdge, Person,
    PersonId, RelationCode, RelationshipEdge,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An accepted edge already exists for the ordered pair
    #[error("Accepted edge already exists from {subject} to {object}")]
    Duplicate {
        /// Subject of the existing edge
        subject: PersonId,
        /// Object of the existing edge
        object: PersonId,
    },

    /// An edge would relate a person to themself
    #[error("Person {0} cannot be related to themself")]
    SelfRelationship(PersonId),

    /// Status change not allowed
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
}

/// Current timestamp in seconds since Unix epoch
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

const EDGE_COLUMNS: &str =
    "id, subject_id, object_id, relation_code, status, created_automatically, created_at, accepted_at";

/// SQLite-based implementation of the person and edge stores
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should open its own
/// SqliteStore on the same database file; writers serialize through
/// immediate transactions and the configured busy timeout.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with default configuration
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open(path, &StoreConfig::default())
    }

    /// Open a store with explicit configuration
    pub fn open<P: AsRef<Path>>(path: P, config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(config.busy_timeout())?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema and seed the relationship catalog
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;

        let defs = BuiltinCatalog
            .load()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for def in defs {
            tx.execute(
                "INSERT OR IGNORE INTO relationship_types (code, generation, category, required_gender)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    def.code.as_str(),
                    def.generation as i64,
                    def.category.as_str(),
                    def.required_gender.as_str(),
                ],
            )?;
        }
        tx.commit()?;

        Ok(())
    }

    /// Direct access to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Add a person profile
    pub fn add_person(&mut self, person: &Person) -> Result<PersonId, StoreError> {
        self.conn.execute(
            "INSERT INTO persons (id, display_name, gender) VALUES (?1, ?2, ?3)",
            params![
                id_to_bytes(person.id.value()),
                &person.display_name,
                person.gender.as_str(),
            ],
        )?;
        Ok(person.id)
    }

    /// List every person, ordered by display name
    pub fn list_persons(&self) -> Result<Vec<Person>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, display_name, gender FROM persons ORDER BY display_name, id")?;
        let persons = stmt
            .query_map([], row_to_person)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(persons)
    }

    /// Find persons whose display name matches exactly (case-insensitive)
    pub fn find_persons_by_name(&self, name: &str) -> Result<Vec<Person>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display_name, gender FROM persons
             WHERE display_name = ?1 COLLATE NOCASE ORDER BY id",
        )?;
        let persons = stmt
            .query_map(params![name.trim()], row_to_person)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(persons)
    }

    /// Enable or disable a relation type in the stored catalog
    ///
    /// Callers holding a cached catalog must invalidate it afterwards.
    pub fn set_relation_enabled(&mut self, code: RelationCode, enabled: bool) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE relationship_types SET enabled = ?2 WHERE code = ?1",
            params![code.as_str(), enabled],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("relation type {}", code)));
        }
        Ok(())
    }

    /// Every edge touching `person`, whatever its status
    pub fn edges_for(&self, person: PersonId) -> Result<Vec<RelationshipEdge>, StoreError> {
        let sql = format!(
            "SELECT {} FROM edges WHERE subject_id = ?1 OR object_id = ?1 ORDER BY created_at, id",
            EDGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let edges = stmt
            .query_map(params![id_to_bytes(person.value())], row_to_edge)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    fn accepted_exists(conn: &Connection, subject: PersonId, object: PersonId) -> Result<bool, StoreError> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM edges WHERE subject_id = ?1 AND object_id = ?2 AND status = 'accepted'",
                params![id_to_bytes(subject.value()), id_to_bytes(object.value())],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    /// Insert an accepted edge unless the pair is already taken
    ///
    /// Returns `None` when the unique index rejected the row, which happens
    /// when a concurrent writer committed the same pair first.
    fn insert_accepted(
        conn: &Connection,
        subject: PersonId,
        object: PersonId,
        code: RelationCode,
        created_automatically: bool,
        now: u64,
    ) -> Result<Option<RelationshipEdge>, StoreError> {
        let edge = RelationshipEdge {
            id: EdgeId::new(),
            subject,
            object,
            code,
            status: EdgeStatus::Accepted,
            created_automatically,
            created_at: now,
            accepted_at: Some(now),
        };

        let inserted = conn.execute(
            "INSERT INTO edges (id, subject_id, object_id, relation_code, status, created_automatically, created_at, accepted_at)
             VALUES (?1, ?2, ?3, ?4, 'accepted', ?5, ?6, ?6)
             ON CONFLICT DO NOTHING",
            params![
                id_to_bytes(edge.id.value()),
                id_to_bytes(subject.value()),
                id_to_bytes(object.value()),
                code.as_str(),
                created_automatically,
                now as i64,
            ],
        )?;

        Ok((inserted == 1).then_some(edge))
    }

    /// Move a pending edge to `status` inside the caller's transaction
    fn transition(conn: &Connection, id: EdgeId, status: EdgeStatus) -> Result<RelationshipEdge, StoreError> {
        let sql = format!("SELECT {} FROM edges WHERE id = ?1", EDGE_COLUMNS);
        let mut edge = conn
            .query_row(&sql, params![id_to_bytes(id.value())], row_to_edge)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("edge {}", id)))?;

        if edge.status == status {
            return Ok(edge);
        }
        if edge.status != EdgeStatus::Pending {
            return Err(StoreError::InvalidTransition(format!(
                "{} -> {}",
                edge.status.as_str(),
                status.as_str()
            )));
        }
        if status == EdgeStatus::Accepted && Self::accepted_exists(conn, edge.subject, edge.object)? {
            return Err(StoreError::Duplicate {
                subject: edge.subject,
                object: edge.object,
            });
        }

        let accepted_at = (status == EdgeStatus::Accepted).then_some(current_timestamp());
        conn.execute(
            "UPDATE edges SET status = ?2, accepted_at = ?3 WHERE id = ?1",
            params![
                id_to_bytes(id.value()),
                status.as_str(),
                accepted_at.map(|t| t as i64),
            ],
        )?;

        edge.status = status;
        edge.accepted_at = accepted_at;
        Ok(edge)
    }
}

impl PersonDirectory for SqliteStore {
    type Error = StoreError;

    fn get_person(&self, id: PersonId) -> Result<Option<Person>, Self::Error> {
        let person = self
            .conn
            .query_row(
                "SELECT id, display_name, gender FROM persons WHERE id = ?1",
                params![id_to_bytes(id.value())],
                row_to_person,
            )
            .optional()?;
        Ok(person)
    }
}

impl EdgeStore for SqliteStore {
    type Error = StoreError;

    fn find_accepted(&self, person: PersonId) -> Result<Vec<RelationshipEdge>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM edges
             WHERE status = 'accepted' AND (subject_id = ?1 OR object_id = ?1)
             ORDER BY created_at, id",
            EDGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let edges = stmt
            .query_map(params![id_to_bytes(person.value())], row_to_edge)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    fn exists(&self, subject: PersonId, object: PersonId) -> Result<bool, Self::Error> {
        Self::accepted_exists(&self.conn, subject, object)
    }

    fn get_edge(&self, id: EdgeId) -> Result<Option<RelationshipEdge>, Self::Error> {
        let sql = format!("SELECT {} FROM edges WHERE id = ?1", EDGE_COLUMNS);
        let edge = self
            .conn
            .query_row(&sql, params![id_to_bytes(id.value())], row_to_edge)
            .optional()?;
        Ok(edge)
    }

    fn insert(&mut self, edge: NewEdge) -> Result<EdgeId, Self::Error> {
        if edge.subject == edge.object {
            return Err(StoreError::SelfRelationship(edge.subject));
        }

        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if edge.status == EdgeStatus::Accepted && Self::accepted_exists(&tx, edge.subject, edge.object)? {
            return Err(StoreError::Duplicate {
                subject: edge.subject,
                object: edge.object,
            });
        }

        let id = EdgeId::new();
        let now = current_timestamp();
        let accepted_at = (edge.status == EdgeStatus::Accepted).then_some(now as i64);
        tx.execute(
            "INSERT INTO edges (id, subject_id, object_id, relation_code, status, created_automatically, created_at, accepted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id_to_bytes(id.value()),
                id_to_bytes(edge.subject.value()),
                id_to_bytes(edge.object.value()),
                edge.code.as_str(),
                edge.status.as_str(),
                edge.created_automatically,
                now as i64,
                accepted_at,
            ],
        )?;
        tx.commit()?;

        Ok(id)
    }

    fn commit_pairs(&mut self, pairs: &[EdgePair]) -> Result<Vec<RelationshipEdge>, Self::Error> {
        // Dropping the transaction on an early return rolls back every insert
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = current_timestamp();
        let mut created = Vec::new();

        for pair in pairs {
            if pair.is_self_loop() {
                continue;
            }
            if Self::accepted_exists(&tx, pair.subject, pair.object)? {
                continue;
            }
            let forward = match Self::insert_accepted(
                &tx,
                pair.subject,
                pair.object,
                pair.code,
                pair.created_automatically,
                now,
            )? {
                Some(edge) => edge,
                None => continue,
            };
            created.push(forward);

            if let Some(inverse) = pair.inverse {
                if !Self::accepted_exists(&tx, pair.object, pair.subject)? {
                    if let Some(edge) = Self::insert_accepted(
                        &tx,
                        pair.object,
                        pair.subject,
                        inverse,
                        pair.created_automatically,
                        now,
                    )? {
                        created.push(edge);
                    }
                }
            }
        }

        tx.commit()?;
        Ok(created)
    }

    fn set_status(&mut self, id: EdgeId, status: EdgeStatus) -> Result<RelationshipEdge, Self::Error> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let edge = Self::transition(&tx, id, status)?;
        tx.commit()?;
        Ok(edge)
    }

    fn accept_pending(
        &mut self,
        id: EdgeId,
        inverse: Option<RelationCode>,
    ) -> Result<Vec<RelationshipEdge>, Self::Error> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let accepted = Self::transition(&tx, id, EdgeStatus::Accepted)?;
        let mut written = vec![accepted];

        if let Some(code) = inverse {
            let (subject, object) = (written[0].object, written[0].subject);
            if !Self::accepted_exists(&tx, subject, object)? {
                if let Some(edge) = Self::insert_accepted(&tx, subject, object, code, false, current_timestamp())? {
                    written.push(edge);
                }
            }
        }

        tx.commit()?;
        Ok(written)
    }

    fn delete_pair(&mut self, a: PersonId, b: PersonId) -> Result<usize, Self::Error> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "DELETE FROM edges
             WHERE status = 'accepted'
               AND ((subject_id = ?1 AND object_id = ?2) OR (subject_id = ?2 AND object_id = ?1))",
            params![id_to_bytes(a.value()), id_to_bytes(b.value())],
        )?;
        tx.commit()?;
        Ok(removed)
    }
}

/// Convert an id to bytes for storage
pub(crate) fn id_to_bytes(value: u128) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Convert stored bytes back to an id value
pub(crate) fn bytes_to_id(bytes: &[u8]) -> Result<u128, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for id, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(u128::from_be_bytes(arr))
}

fn conversion_error(idx: usize, ty: Type, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
}

fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u128> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes_to_id(&bytes).map_err(|e| conversion_error(idx, Type::Blob, e))
}

fn row_to_person(row: &Row<'_>) -> rusqlite::Result<Person> {
    let gender: String = row.get(2)?;
    let gender = gender
        .parse::<Gender>()
        .map_err(|e| conversion_error(2, Type::Text, StoreError::InvalidData(e)))?;

    Ok(Person {
        id: PersonId::from_value(id_column(row, 0)?),
        display_name: row.get(1)?,
        gender,
    })
}

fn row_to_edge(row: &Row<'_>) -> rusqlite::Result<RelationshipEdge> {
    let code: String = row.get(3)?;
    let code = code
        .parse::<RelationCode>()
        .map_err(|e| conversion_error(3, Type::Text, StoreError::InvalidData(e.to_string())))?;

    let status: String = row.get(4)?;
    let status = EdgeStatus::parse(&status).ok_or_else(|| {
        conversion_error(4, Type::Text, StoreError::InvalidData(format!("Unknown status: {}", status)))
    })?;

    let accepted_at: Option<i64> = row.get(7)?;

    Ok(RelationshipEdge {
        id: EdgeId::from_value(id_column(row, 0)?),
        subject: PersonId::from_value(id_column(row, 1)?),
        object: PersonId::from_value(id_column(row, 2)?),
        code,
        status,
        created_automatically: row.get(5)?,
        created_at: row.get::<_, i64>(6)? as u64,
        accepted_at: accepted_at.map(|t| t as u64),
    })
}
