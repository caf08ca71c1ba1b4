//! Property tests for the inventory invariants.

use std::{
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use book_inventory::{Book, Inventory, InventoryError, OrderedIndex};
use proptest::prelude::*;

/// One engine call
#[derive(Debug, Clone)]
enum Op {
    /// Add copies of a title
    Add(usize, i64),
    /// Check out one copy
    Checkout(usize),
    /// Return one copy
    Return(usize),
}

/// Small ISBN pool so operations collide often
const ISBNS: [&str; 5] = ["ISBN-A", "ISBN-B", "ISBN-C", "ISBN-D", "ISBN-E"];

/// Strategy producing one engine call
fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ISBNS.len(), 1_i64..5).prop_map(|(i, copies)| Op::Add(i, copies)),
        (0..ISBNS.len()).prop_map(Op::Checkout),
        (0..ISBNS.len()).prop_map(Op::Return),
    ]
}

/// ISBN for a pool slot
fn isbn(i: usize) -> &'static str {
    ISBNS.get(i).copied().unwrap_or("ISBN-A")
}

proptest! {
    #[test]
    fn counts_stay_consistent(ops in proptest::collection::vec(arb_op(), 0..200)) {
        let mut inventory = Inventory::with_current_year(2025);
        let mut added: BTreeMap<&str, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Add(i, copies) => {
                    let before = inventory.list(isbn(i)).ok();
                    prop_assert!(inventory.add("Title", "Author", isbn(i), 2000, copies).is_ok());
                    let delta = u32::try_from(copies).unwrap_or(0);
                    let total = added.entry(isbn(i)).or_default();
                    *total = total.saturating_add(delta);
                    let after = inventory.list(isbn(i));
                    let expected = before.map_or(delta, |b| b.available().saturating_add(delta));
                    prop_assert_eq!(after.map(|c| c.available()), Ok(expected));
                }
                Op::Checkout(i) => {
                    let before = inventory.list(isbn(i));
                    match inventory.checkout(isbn(i)) {
                        Ok(counts) => prop_assert_eq!(Ok(counts.available().saturating_add(1)), before.map(|c| c.available())),
                        Err(InventoryError::NotFound(_)) => prop_assert!(before.is_err()),
                        Err(InventoryError::Unavailable { .. }) => {
                            prop_assert_eq!(before.clone().map(|c| c.available()), Ok(0));
                            prop_assert_eq!(inventory.list(isbn(i)), before);
                        }
                        Err(other) => prop_assert!(false, "unexpected error {other}"),
                    }
                }
                Op::Return(i) => {
                    let before = inventory.list(isbn(i));
                    match inventory.return_copy(isbn(i)) {
                        Ok(counts) => prop_assert_eq!(Ok(counts.available()), before.map(|c| c.available().saturating_add(1))),
                        Err(InventoryError::NotFound(_)) => prop_assert!(before.is_err()),
                        Err(InventoryError::InvalidState { .. }) => {
                            prop_assert_eq!(before.clone().map(|c| c.checked_out()), Ok(0));
                            prop_assert_eq!(inventory.list(isbn(i)), before);
                        }
                        Err(other) => prop_assert!(false, "unexpected error {other}"),
                    }
                }
            }

            for entry in inventory.entries() {
                prop_assert!(entry.available_copies() <= entry.total_copies());
            }
        }

        for (key, total) in &added {
            prop_assert_eq!(inventory.list(key).map(|c| c.total()), Ok(*total));
        }
        prop_assert_eq!(inventory.registry().len(), added.len());
        prop_assert_eq!(inventory.len(), added.len());
    }

    #[test]
    fn checkout_then_return_is_identity(copies in 1_i64..10, out in 0_u32..9) {
        let mut inventory = Inventory::with_current_year(2025);
        prop_assert!(inventory.add("Dune", "Frank Herbert", "ISBN-001", 1965, copies).is_ok());
        for _ in 0..out {
            if inventory.checkout("ISBN-001").is_err() {
                break;
            }
        }
        let before = inventory.list("ISBN-001");
        if before.as_ref().is_ok_and(|c| c.available() >= 1) {
            prop_assert!(inventory.checkout("ISBN-001").is_ok());
            prop_assert!(inventory.return_copy("ISBN-001").is_ok());
            prop_assert_eq!(inventory.list("ISBN-001"), before);
        }
    }

    #[test]
    fn index_keys_stay_sorted(
        inserts in proptest::collection::vec("[A-Z]{1,3}", 1..60),
        removals in proptest::collection::vec("[A-Z]{1,3}", 0..60),
    ) {
        let mut index = OrderedIndex::new();
        let mut expected = BTreeSet::new();
        for key in &inserts {
            let book = Rc::new(Book::new("Title", "Author", key.as_str(), 2000));
            prop_assert!(index.insert_or_update(book, 1).is_ok());
            expected.insert(key.clone());
        }
        for key in &removals {
            let removed = index.remove(key).is_ok();
            prop_assert_eq!(removed, expected.remove(key));
        }

        let keys: Vec<&str> = index.keys().collect();
        let wanted: Vec<&str> = expected.iter().map(String::as_str).collect();
        prop_assert_eq!(keys, wanted);
        prop_assert_eq!(index.len(), expected.len());
        prop_assert_eq!(index.min(), expected.first().map(String::as_str));
        for pair in expected.iter().collect::<Vec<_>>().windows(2) {
            if let [a, b] = pair {
                prop_assert_eq!(index.successor(a), Some(b.as_str()));
            }
        }
    }
}
