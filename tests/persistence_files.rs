//! Save/load through real files.

use std::fs;

use book_inventory::{Inventory, PersistenceError, persistence};
use tempfile::TempDir;

/// Helper to build a catalog with one copy checked out
fn catalog() -> Inventory {
    let mut inventory = Inventory::with_current_year(2025);
    assert!(inventory.add("Dune", "Frank Herbert", "ISBN-001", 1965, 3).is_ok());
    assert!(inventory.add("Emma", "Jane Austen", "ISBN-002", 1815, 2).is_ok());
    assert!(inventory.add("Ubik", "Philip K. Dick", "ISBN-003", 1969, 1).is_ok());
    assert!(inventory.checkout("ISBN-002").is_ok());
    inventory
}

/// Registry order of a catalog, newest first
fn order(inventory: &Inventory) -> Vec<String> {
    inventory.entries().map(|e| e.book.isbn().to_string()).collect()
}

#[test]
fn text_round_trip_resets_availability() {
    let dir = TempDir::new();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let path = dir.path().join("catalog.txt");

    let source = catalog();
    assert_eq!(persistence::save_to_file(&source, &path).ok(), Some(3));

    let mut loaded = Inventory::with_current_year(2025);
    assert!(loaded.add("Stale", "Nobody", "ISBN-999", 2000, 1).is_ok());
    let report = persistence::load_from_file(&mut loaded, &path);
    assert!(report.is_ok_and(|r| r.is_clean() && r.loaded == 3));

    assert!(!loaded.contains("ISBN-999"));
    assert_eq!(order(&loaded), order(&source));
    for isbn in ["ISBN-001", "ISBN-002", "ISBN-003"] {
        let total = source.list(isbn).map(|c| c.total());
        assert_eq!(loaded.list(isbn).map(|c| (c.total(), c.available())), total.map(|t| (t, t)));
    }
}

#[test]
fn json_round_trip_keeps_availability() {
    let dir = TempDir::new();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let path = dir.path().join("catalog.json");

    let source = catalog();
    assert_eq!(persistence::save_to_file(&source, &path).ok(), Some(3));

    let mut loaded = Inventory::with_current_year(2025);
    let report = persistence::load_from_file(&mut loaded, &path);
    assert!(report.is_ok_and(|r| r.is_clean()));
    assert_eq!(order(&loaded), order(&source));
    assert_eq!(loaded.list("ISBN-002"), source.list("ISBN-002"));
    assert_eq!(loaded.list("ISBN-002").map(|c| c.available()), Ok(1));
}

#[test]
fn partial_file_loads_good_lines() {
    let dir = TempDir::new();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let path = dir.path().join("catalog.txt");
    let written = fs::write(
        &path,
        "Dune,Frank Herbert,ISBN-001,1965,3\n\
         broken line\n\
         Emma,Jane Austen,ISBN-002,1815,0\n\
         Ubik,Philip K. Dick,ISBN-003,1969,1\n",
    );
    assert!(written.is_ok());

    let mut inventory = Inventory::with_current_year(2025);
    let report = persistence::load_from_file(&mut inventory, &path);
    assert!(report.is_ok());
    if let Ok(report) = report {
        assert_eq!(report.loaded, 2);
        assert!(matches!(report.rejected.first(), Some(PersistenceError::Format { line: 2, .. })));
        assert!(matches!(report.rejected.get(1), Some(PersistenceError::Rejected { line: 3, .. })));
    }
    assert_eq!(inventory.len(), 2);
}

#[test]
fn missing_file_keeps_catalog() {
    let dir = TempDir::new();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };

    let mut inventory = catalog();
    let result = persistence::load_from_file(&mut inventory, dir.path().join("absent.txt"));
    assert!(matches!(result, Err(PersistenceError::Io { .. })));
    assert_eq!(inventory.len(), 3);
}

#[test]
fn empty_catalog_writes_empty_file() {
    let dir = TempDir::new();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let path = dir.path().join("empty.txt");

    assert_eq!(persistence::save_to_file(&Inventory::with_current_year(2025), &path).ok(), Some(0));
    assert_eq!(fs::read_to_string(&path).ok().as_deref(), Some(""));
}
