//! Integration tests for kinfolk-store
//!
//! These tests exercise the SQLite store through the domain traits: person
//! CRUD, accepted-pair uniqueness, batch atomicity and concurrent writers.

use kinfolk_domain::traits::{EdgeStore, PersonDirectory};
use kinfolk_domain::{
    CatalogSource, EdgePair, EdgeStatus, Gender, NewEdge, Person, PersonId, RelationCode,
    RelationshipCatalog,
};
use kinfolk_store::{SqliteCatalogSource, SqliteStore, StoreConfig, StoreError};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn add(store: &mut SqliteStore, name: &str, gender: Gender) -> PersonId {
    store.add_person(&Person::new(name, gender)).unwrap()
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_person_roundtrip() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let person = Person::new("Ada Lovelace", Gender::Female);
    store.add_person(&person).unwrap();

    let fetched = store.get_person(person.id).unwrap().expect("person stored");
    assert_eq!(fetched, person);
    assert!(store.get_person(PersonId::new()).unwrap().is_none());

    let found = store.find_persons_by_name("ada lovelace").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(store.list_persons().unwrap().len(), 1);
}

#[test]
fn test_insert_and_find_accepted() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = add(&mut store, "A", Gender::Male);
    let b = add(&mut store, "B", Gender::Male);

    let id = store.insert(NewEdge::confirmed(a, b, RelationCode::Father)).unwrap();
    let edge = store.get_edge(id).unwrap().expect("edge stored");
    assert_eq!(edge.code, RelationCode::Father);
    assert!(edge.is_accepted());
    assert!(!edge.created_automatically);

    assert!(store.exists(a, b).unwrap());
    assert!(!store.exists(b, a).unwrap());
    assert_eq!(store.find_accepted(a).unwrap().len(), 1);
    assert_eq!(store.find_accepted(b).unwrap().len(), 1);
}

#[test]
fn test_duplicate_accepted_pair_rejected() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = add(&mut store, "A", Gender::Male);
    let b = add(&mut store, "B", Gender::Female);

    store.insert(NewEdge::confirmed(a, b, RelationCode::Brother)).unwrap();
    let result = store.insert(NewEdge::confirmed(a, b, RelationCode::Cousin));
    assert!(matches!(result, Err(StoreError::Duplicate { .. })));

    // The reverse direction is a different ordered pair
    assert!(store.insert(NewEdge::confirmed(b, a, RelationCode::Sister)).is_ok());
}

#[test]
fn test_self_relationship_rejected() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = add(&mut store, "A", Gender::Male);
    let result = store.insert(NewEdge::confirmed(a, a, RelationCode::Brother));
    assert!(matches!(result, Err(StoreError::SelfRelationship(_))));
}

#[test]
fn test_request_accept_and_reject() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = add(&mut store, "A", Gender::Female);
    let b = add(&mut store, "B", Gender::Male);
    let c = add(&mut store, "C", Gender::Male);

    let accepted = store.insert(NewEdge::request(a, b, RelationCode::Mother)).unwrap();
    let rejected = store.insert(NewEdge::request(a, c, RelationCode::Mother)).unwrap();
    assert!(!store.exists(a, b).unwrap());

    let edge = store.set_status(accepted, EdgeStatus::Accepted).unwrap();
    assert!(edge.accepted_at.is_some());
    assert!(store.exists(a, b).unwrap());

    let edge = store.set_status(rejected, EdgeStatus::Rejected).unwrap();
    assert_eq!(edge.status, EdgeStatus::Rejected);
    assert!(edge.accepted_at.is_none());

    let result = store.set_status(rejected, EdgeStatus::Accepted);
    assert!(matches!(result, Err(StoreError::InvalidTransition(_))));
    assert_eq!(store.edges_for(a).unwrap().len(), 2);
}

#[test]
fn test_commit_pairs_skips_existing() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = add(&mut store, "A", Gender::Male);
    let b = add(&mut store, "B", Gender::Male);
    let c = add(&mut store, "C", Gender::Male);

    store.insert(NewEdge::confirmed(b, a, RelationCode::Nephew)).unwrap();
    let created = store
        .commit_pairs(&[
            EdgePair::derived(a, b, RelationCode::UnclePaternal, Some(RelationCode::Nephew)),
            EdgePair::derived(a, c, RelationCode::Brother, Some(RelationCode::Brother)),
            EdgePair::derived(c, c, RelationCode::Brother, None),
        ])
        .unwrap();

    // a->b is new, its inverse already existed; a<->c is new in both directions
    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|e| e.created_automatically));
    assert!(store.exists(a, b).unwrap());
    assert!(store.exists(c, a).unwrap());
}

#[test]
fn test_commit_pairs_rolls_back_on_failure() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = add(&mut store, "A", Gender::Male);
    let b = add(&mut store, "B", Gender::Male);
    let c = add(&mut store, "C", Gender::Female);

    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER fail_on_niece BEFORE INSERT ON edges
             WHEN NEW.relation_code = 'niece'
             BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
        )
        .unwrap();

    let result = store.commit_pairs(&[
        EdgePair::derived(a, b, RelationCode::Brother, Some(RelationCode::Brother)),
        EdgePair::derived(a, c, RelationCode::Uncle, Some(RelationCode::Niece)),
    ]);
    assert!(matches!(result, Err(StoreError::Database(_))));

    assert!(!store.exists(a, b).unwrap());
    assert!(!store.exists(b, a).unwrap());
    assert!(!store.exists(a, c).unwrap());
}

#[test]
fn test_accept_pending_is_atomic() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let me = add(&mut store, "Sam", Gender::Male);
    let dad = add(&mut store, "Bob", Gender::Male);
    let id = store.insert(NewEdge::request(me, dad, RelationCode::Father)).unwrap();

    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER fail_on_son BEFORE INSERT ON edges
             WHEN NEW.relation_code = 'son'
             BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
        )
        .unwrap();

    let result = store.accept_pending(id, Some(RelationCode::Son));
    assert!(matches!(result, Err(StoreError::Database(_))));
    assert!(!store.exists(me, dad).unwrap());
    assert!(!store.exists(dad, me).unwrap());
    assert_eq!(store.get_edge(id).unwrap().unwrap().status, EdgeStatus::Pending);

    store.connection().execute_batch("DROP TRIGGER fail_on_son;").unwrap();
    let written = store.accept_pending(id, Some(RelationCode::Son)).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[0].status, EdgeStatus::Accepted);
    assert_eq!(written[1].code, RelationCode::Son);
    assert!(store.exists(me, dad).unwrap());
    assert!(store.exists(dad, me).unwrap());
}

#[test]
fn test_delete_pair() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = add(&mut store, "A", Gender::Male);
    let b = add(&mut store, "B", Gender::Male);

    store
        .commit_pairs(&[EdgePair::confirmed(a, b, RelationCode::Father, Some(RelationCode::Son))])
        .unwrap();
    assert_eq!(store.delete_pair(b, a).unwrap(), 2);
    assert!(store.find_accepted(a).unwrap().is_empty());
    assert_eq!(store.delete_pair(a, b).unwrap(), 0);
}

#[test]
fn test_catalog_source_reads_enabled_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kinfolk.db");
    let mut store = SqliteStore::new(&path).unwrap();

    let source = SqliteCatalogSource::new(&path);
    let defs = source.load().unwrap();
    assert_eq!(defs.len(), RelationCode::ALL.len());

    let catalog = RelationshipCatalog::new(SqliteCatalogSource::new(&path));
    assert!(catalog.get(RelationCode::Stepsister).is_ok());

    store.set_relation_enabled(RelationCode::Stepsister, false).unwrap();
    // Cached until invalidated
    assert!(catalog.get(RelationCode::Stepsister).is_ok());
    catalog.invalidate();
    assert!(catalog.get(RelationCode::Stepsister).is_err());
    assert!(catalog.get(RelationCode::Stepbrother).is_ok());
}

#[test]
fn test_reopen_preserves_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kinfolk.db");
    let (a, b) = {
        let mut store = SqliteStore::new(&path).unwrap();
        let a = add(&mut store, "A", Gender::Male);
        let b = add(&mut store, "B", Gender::Female);
        store.insert(NewEdge::confirmed(a, b, RelationCode::Husband)).unwrap();
        (a, b)
    };

    let store = SqliteStore::new(&path).unwrap();
    assert!(store.exists(a, b).unwrap());
    assert_eq!(store.list_persons().unwrap().len(), 2);
}

#[test]
fn test_concurrent_writers_create_one_pair() {
    let dir = TempDir::new().unwrap();
    let path = Arc::new(dir.path().join("kinfolk.db"));
    let config = StoreConfig { busy_timeout_ms: 10_000 };

    let (a, b) = {
        let mut store = SqliteStore::open(path.as_ref(), &config).unwrap();
        (add(&mut store, "A", Gender::Male), add(&mut store, "B", Gender::Male))
    };

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let path = Arc::clone(&path);
            let config = config.clone();
            thread::spawn(move || {
                let mut store = SqliteStore::open(path.as_ref(), &config).unwrap();
                store
                    .commit_pairs(&[EdgePair::derived(a, b, RelationCode::Brother, Some(RelationCode::Brother))])
                    .unwrap()
                    .len()
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 2, "exactly one writer should create the pair");

    let store = SqliteStore::open(path.as_ref(), &config).unwrap();
    assert_eq!(store.find_accepted(a).unwrap().len(), 2);
}
