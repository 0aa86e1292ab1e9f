//! Identifier-keyed sets.
//!
//! Both sets are ordered by identifier. Iteration order carries no meaning
//! for the graph; it is only stable so that results and stored arrays are
//! deterministic.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::id::PersonId;
use crate::person::Person;

/// A set of person identifiers, serialized as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSet(BTreeSet<PersonId>);

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.0.contains(id)
    }

    /// Adds `id`; returns false if it was already present.
    pub fn insert(&mut self, id: PersonId) -> bool {
        self.0.insert(id)
    }

    /// Removes `id`; returns false if it was absent.
    pub fn remove(&mut self, id: &PersonId) -> bool {
        self.0.remove(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonId> {
        self.0.iter()
    }
}

impl FromIterator<PersonId> for IdSet {
    fn from_iter<I: IntoIterator<Item = PersonId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a PersonId;
    type IntoIter = std::collections::btree_set::Iter<'a, PersonId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A set of person records keyed by identifier.
///
/// Inserting a record whose identifier is already present keeps the first
/// copy, so a set built from several queries holds one record per person.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonSet(BTreeMap<PersonId, Person>);

impl PersonSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `person` unless its identifier is already present.
    ///
    /// Returns true when the set grew.
    pub fn insert(&mut self, person: Person) -> bool {
        match self.0.entry(person.id) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(person);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Union: adds every record of `other` not already present.
    ///
    /// Returns how many records were added.
    pub fn extend_unique(&mut self, other: impl IntoIterator<Item = Person>) -> usize {
        other
            .into_iter()
            .map(|person| self.insert(person))
            .filter(|grew| *grew)
            .count()
    }

    /// Difference: records of `self` whose identifier is absent from `other`.
    pub fn missing_from(&self, other: &PersonSet) -> PersonSet {
        self.0
            .iter()
            .filter(|(id, _)| !other.contains(id))
            .map(|(id, person)| (*id, person.clone()))
            .collect::<BTreeMap<_, _>>()
            .into()
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.0.contains_key(id)
    }

    pub fn get(&self, id: &PersonId) -> Option<&Person> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> IdSet {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.0.values()
    }

    pub fn into_vec(self) -> Vec<Person> {
        self.0.into_values().collect()
    }
}

impl From<BTreeMap<PersonId, Person>> for PersonSet {
    fn from(map: BTreeMap<PersonId, Person>) -> Self {
        Self(map)
    }
}

impl FromIterator<Person> for PersonSet {
    fn from_iter<I: IntoIterator<Item = Person>>(iter: I) -> Self {
        let mut set = PersonSet::new();
        set.extend_unique(iter);
        set
    }
}

impl IntoIterator for PersonSet {
    type Item = Person;
    type IntoIter = btree_map::IntoValues<PersonId, Person>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(byte: u8, name: &str) -> Person {
        Person::with_id(PersonId::from_bytes([byte; 12]), Some(name.to_string()))
    }

    #[test]
    fn test_insert_keeps_first_copy() {
        let mut set = PersonSet::new();
        assert!(set.insert(person(1, "first")));
        assert!(!set.insert(person(1, "second")));

        assert_eq!(set.len(), 1);
        let kept = set.get(&PersonId::from_bytes([1; 12])).unwrap();
        assert_eq!(kept.name.as_deref(), Some("first"));
    }

    #[test]
    fn test_extend_unique_counts_new_records() {
        let mut set: PersonSet = [person(1, "a"), person(2, "b")].into_iter().collect();
        let added = set.extend_unique([person(2, "b"), person(3, "c"), person(3, "c")]);

        assert_eq!(added, 1);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_missing_from() {
        let have: PersonSet = [person(1, "a")].into_iter().collect();
        let needed: PersonSet = [person(1, "a"), person(2, "b")].into_iter().collect();

        let delta = needed.missing_from(&have);
        assert_eq!(delta.len(), 1);
        assert!(delta.contains(&PersonId::from_bytes([2; 12])));
        assert!(have.missing_from(&needed).is_empty());
    }

    #[test]
    fn test_id_set_serializes_as_array() {
        let ids: IdSet = [PersonId::from_bytes([2; 12]), PersonId::from_bytes([1; 12])]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&ids).unwrap();
        assert_eq!(
            json,
            r#"["010101010101010101010101","020202020202020202020202"]"#
        );
    }
}
