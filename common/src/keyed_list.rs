//! The keyed list type provides a map-like interface over an index-addressed
//! arena: entries live in a vector, and a hash index maps each key to its slot
//!
//! Removal swaps the last entry into the freed slot, so deletion is O(1) but
//! the iteration order is NOT stable across removals. Callers that expose a
//! keyed list (e.g. as a member list) must document the non-stable order

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// A map-like arena with O(1) insertion, lookup, and swap-remove deletion
///
/// Keys are unique by construction; inserting a present key overwrites its
/// value in place. Iteration yields entries in storage order, which matches
/// insertion order only until the first removal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<(K, V)>", into = "Vec<(K, V)>")]
#[serde(bound(serialize = "K: Serialize, V: Serialize"))]
#[serde(bound(deserialize = "K: Deserialize<'de>, V: Deserialize<'de>"))]
pub struct KeyedList<K: Clone + Eq + Hash, V: Clone> {
    /// The underlying arena of entries
    elems: Vec<(K, V)>,
    /// The index mapping each key to its slot in the arena
    index: FxHashMap<K, usize>,
}

/// Serialization writes only the arena; the index is rebuilt on read
impl<K: Clone + Eq + Hash, V: Clone> From<Vec<(K, V)>> for KeyedList<K, V> {
    fn from(elems: Vec<(K, V)>) -> Self {
        elems.into_iter().collect()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> From<KeyedList<K, V>> for Vec<(K, V)> {
    fn from(list: KeyedList<K, V>) -> Self {
        list.elems
    }
}

// Implemented manually so the key type need not be `Default` itself
impl<K: Clone + Eq + Hash, V: Clone> Default for KeyedList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> KeyedList<K, V> {
    /// Constructor
    pub fn new() -> Self {
        Self { elems: Vec::new(), index: FxHashMap::default() }
    }

    // -----------
    // | Getters |
    // -----------

    /// Returns whether the number of entries is zero
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Checks if the list contains the given key
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns a reference to the value corresponding to the key
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.elems[slot].1)
    }

    /// Returns a mutable reference to the value corresponding to the key
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.index.get(key).map(|&slot| &mut self.elems[slot].1)
    }

    /// Returns an iterator over the entries in storage order
    pub fn iter(&self) -> impl Iterator<Item = &(K, V)> {
        self.elems.iter()
    }

    /// Returns an iterator over borrowed keys in storage order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.elems.iter().map(|(k, _)| k)
    }

    /// Returns an iterator over borrowed values in storage order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.elems.iter().map(|(_, v)| v)
    }

    // -----------
    // | Setters |
    // -----------

    /// Inserts a key-value pair into the list
    ///
    /// If the key was not present, `None` is returned. If the key was
    /// present, the value is updated in place and the old value returned
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&slot) => {
                let old_value = self.elems[slot].1.clone();
                self.elems[slot].1 = value;

                Some(old_value)
            },
            None => {
                self.index.insert(key.clone(), self.elems.len());
                self.elems.push((key, value));
                None
            },
        }
    }

    /// Inserts a key-value pair only if the key is absent
    ///
    /// Returns whether the pair was inserted
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        if self.contains_key(&key) {
            return false;
        }

        self.insert(key, value);
        true
    }

    /// Removes a key from the list by swapping the last entry into its slot,
    /// returning the value if the key was present
    ///
    /// The storage order of the remaining entries is not preserved
    pub fn swap_remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        let (_, value) = self.elems.swap_remove(slot);

        // Repoint the index entry for the entry swapped into the freed slot
        if let Some((moved_key, _)) = self.elems.get(slot) {
            self.index.insert(moved_key.clone(), slot);
        }

        Some(value)
    }

    /// Clears the list, removing all entries
    pub fn clear(&mut self) {
        self.elems.clear();
        self.index.clear();
    }
}

impl<K: Clone + Eq + Hash, V: Clone> FromIterator<(K, V)> for KeyedList<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = KeyedList::new();
        for (k, v) in iter {
            list.insert(k, v);
        }

        list
    }
}
