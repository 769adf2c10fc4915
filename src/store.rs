use std::collections::BTreeMap;

use crate::model::Id;

/// In-memory rows for one entity type, keyed by id.
///
/// Ids come from a per-table counter that starts at 1 and only moves
/// forward, so an id is never reused after a delete. Because ids are
/// assigned in ascending order, BTreeMap iteration is insertion order.
#[derive(Debug)]
pub struct Table<T> {
    rows: BTreeMap<Id, T>,
    next_id: Id,
}

impl<T: Clone> Table<T> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Hands out the next id. Callers must only take an id for a row that
    /// is actually inserted; a rejected payload must not burn one.
    pub fn next_id(&mut self) -> Id {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, id: Id, row: T) {
        self.rows.insert(id, row);
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    /// Cloned snapshot of every row, insertion order.
    pub fn list(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    /// Cloned snapshot of the rows matching `pred`, insertion order.
    pub fn list_where(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|r| pred(r)).cloned().collect()
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.rows.values().find(|r| pred(r))
    }

    pub fn find_mut(&mut self, pred: impl Fn(&T) -> bool) -> Option<&mut T> {
        self.rows.values_mut().find(|r| pred(r))
    }

    /// Removes the row. True iff something was there to remove.
    pub fn delete(&mut self, id: Id) -> bool {
        self.rows.remove(&id).is_some()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.rows.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut t: Table<&str> = Table::new();
        let a = t.next_id();
        t.insert(a, "a");
        let b = t.next_id();
        t.insert(b, "b");
        assert_eq!((a, b), (1, 2));

        assert!(t.delete(a));
        let c = t.next_id();
        t.insert(c, "c");
        assert_eq!(c, 3, "deleted id must not come back");
    }

    #[test]
    fn get_and_delete_report_absence_plainly() {
        let mut t: Table<i32> = Table::new();
        assert!(t.get(99).is_none());
        assert!(!t.delete(99));

        let id = t.next_id();
        t.insert(id, 7);
        assert_eq!(t.get(id), Some(&7));
        assert!(t.delete(id));
        assert!(!t.delete(id), "second delete of same id is false");
    }

    #[test]
    fn list_returns_insertion_order_snapshots() {
        let mut t: Table<String> = Table::new();
        for name in ["first", "second", "third"] {
            let id = t.next_id();
            t.insert(id, name.to_string());
        }
        assert_eq!(t.list(), vec!["first", "second", "third"]);
        assert_eq!(t.list_where(|s| s.contains('i')), vec!["first", "third"]);
    }
}
