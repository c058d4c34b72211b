//! Ordered record collections.
//!
//! None of these operations fail. Updating or deleting an identity that is not present
//! is a silent no-op: edits are optimistic, and the record may already be gone by the
//! time an edit lands. The boolean results exist for logging, not for error handling.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ids::RecordId;
use crate::record::Record;

/// An ordered collection of records of one kind, keyed by identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    records: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Record> Collection<T> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records in the given order. Identities are trusted to be unique.
    pub fn add_many(&mut self, records: impl IntoIterator<Item = T>) {
        self.records.extend(records);
    }

    /// Replace the record sharing `record`'s identity.
    ///
    /// The missing-field marker is recomputed before storing. Returns `false` (and
    /// changes nothing) when no record has that identity.
    pub fn update(&mut self, mut record: T) -> bool {
        let Some(slot) = self.records.iter_mut().find(|r| r.id() == record.id()) else {
            debug!(
                kind = T::KIND.collection_name(),
                id = %record.id(),
                "update of unknown record ignored"
            );
            return false;
        };
        record.refresh_missing();
        *slot = record;
        true
    }

    /// Remove the record with identity `id`. Returns `false` when absent.
    pub fn delete(&mut self, id: &RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        let removed = self.records.len() != before;
        if !removed {
            debug!(
                kind = T::KIND.collection_name(),
                %id,
                "delete of unknown record ignored"
            );
        }
        removed
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Look up a record by identity.
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Whether a record with this identity exists.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate in collection order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// The records as a slice, in collection order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a, T: Record> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::record::{field, Customer, MissingFields};

    fn customer(id: &str, name: &str) -> Customer {
        Customer {
            id: id.parse().unwrap(),
            name: name.into(),
            phone_number: "555-0100".into(),
            total_purchase_amount: Some(Money::ZERO),
            email: None,
            address: None,
            missing_fields: MissingFields::none(),
        }
    }

    #[test]
    fn add_many_preserves_order() {
        let mut customers = Collection::new();
        customers.add_many(vec![customer("c1", "A"), customer("c2", "B")]);
        customers.add_many(vec![customer("c3", "C")]);
        let names: Vec<_> = customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn update_replaces_in_place_and_recomputes_missing() {
        let mut customers = Collection::new();
        customers.add_many(vec![customer("c1", "A"), customer("c2", "B")]);

        let mut edited = customer("c1", "A2");
        edited.phone_number = String::new();
        assert!(customers.update(edited));

        let stored = &customers.as_slice()[0];
        assert_eq!(stored.name, "A2");
        assert!(stored.missing_fields.contains(field::PHONE_NUMBER));
    }

    #[test]
    fn update_of_unknown_identity_is_a_silent_no_op() {
        let mut customers = Collection::new();
        customers.add_many(vec![customer("c1", "A")]);
        let snapshot = customers.clone();

        assert!(!customers.update(customer("ghost", "Z")));
        assert_eq!(customers, snapshot);
    }

    #[test]
    fn delete_of_unknown_identity_is_a_silent_no_op() {
        let mut customers = Collection::new();
        customers.add_many(vec![customer("c1", "A")]);

        assert!(!customers.delete(&"ghost".parse().unwrap()));
        assert_eq!(customers.len(), 1);
        assert!(customers.delete(&"c1".parse().unwrap()));
        assert!(customers.is_empty());
    }

    #[test]
    fn clear_empties_collection() {
        let mut customers = Collection::new();
        customers.add_many(vec![customer("c1", "A"), customer("c2", "B")]);
        customers.clear();
        assert!(customers.is_empty());
    }
}
