use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::BuildHasher;

use mc_utils::hash::{FixedHashState, HashTable};

use super::Value;

// -----------------------------------------------------------------------------
// Map

/// An insertion-ordered, string-keyed mapping of [`Value`]s.
///
/// This is the "generic mapping" a record packs into. Entries keep the order in
/// which they were first inserted, so a packed record lists its fields in
/// declaration order. Lookups go through a side index of entry positions, so
/// `get` does not scan.
///
/// Equality ignores order: two maps are equal when they hold the same keys with
/// equal values.
///
/// # Examples
///
/// ```
/// use mc_pack::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("b", Value::from(2));
/// map.insert("a", Value::from(1));
///
/// assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a"]);
/// assert_eq!(map.get("a"), Some(&Value::Int(1)));
/// ```
#[derive(Clone, Default)]
pub struct Map {
    entries: Vec<(String, Value)>,
    // Positions into `entries`, hashed by key.
    index: HashTable<usize>,
}

#[inline]
fn hash_key(key: &str) -> u64 {
    FixedHashState.hash_one(key)
}

impl Map {
    /// Creates an empty `Map`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashTable::new(),
        }
    }

    /// Creates an empty `Map` with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashTable::with_capacity(capacity),
        }
    }

    #[inline]
    fn position(&self, key: &str) -> Option<usize> {
        let entries = &self.entries;
        self.index
            .find(hash_key(key), |&i| entries[i].0 == key)
            .copied()
    }

    /// Inserts `value` under `key`.
    ///
    /// An existing entry keeps its position and the previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(i) = self.position(&key) {
            return Some(core::mem::replace(&mut self.entries[i].1, value));
        }

        let i = self.entries.len();
        let entries = &self.entries;
        self.index
            .insert_unique(hash_key(&key), i, |&j| hash_key(&entries[j].0));
        self.entries.push((key, value));
        None
    }

    /// Returns the value stored under `key`.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Returns a mutable reference to the value stored under `key`.
    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.position(key).map(|i| &mut self.entries[i].1)
    }

    /// Returns `true` if the map holds `key`.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Removes `key`, keeping the relative order of the other entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.position(key)?;
        let (_, value) = self.entries.remove(i);
        self.reindex();
        Some(value)
    }

    /// Keeps only the entries for which `f` returns `true`, in order.
    pub fn retain(&mut self, mut f: impl FnMut(&str, &Value) -> bool) {
        let before = self.entries.len();
        self.entries.retain(|(k, v)| f(k, v));
        if self.entries.len() != before {
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        let entries = &self.entries;
        for (i, (key, _)) in entries.iter().enumerate() {
            self.index
                .insert_unique(hash_key(key), i, |&j| hash_key(&entries[j].0));
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the keys in insertion order.
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over the values in insertion order.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

// -----------------------------------------------------------------------------
// Traits

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Map::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: Into<String>> Extend<(K, Value)> for Map {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = alloc::vec::IntoIter<(String, Value)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a str, &'a Value);
    type IntoIter = core::iter::Map<
        core::slice::Iter<'a, (String, Value)>,
        fn(&'a (String, Value)) -> (&'a str, &'a Value),
    >;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::Map;
    use crate::Value;

    #[test]
    fn insert_keeps_first_position() {
        let mut map = Map::new();
        map.insert("x", Value::from(1));
        map.insert("y", Value::from(2));
        assert_eq!(map.insert("x", Value::from(3)), Some(Value::Int(1)));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(map.get("x"), Some(&Value::Int(3)));
    }

    #[test]
    fn remove_and_retain_reindex() {
        let mut map: Map = [("a", Value::Null), ("b", Value::from(2)), ("c", Value::Null)]
            .into_iter()
            .collect();

        assert_eq!(map.remove("a"), Some(Value::Null));
        assert_eq!(map.get("c"), Some(&Value::Null));

        map.retain(|_, v| !v.is_null());
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("b"));
        assert!(!map.contains_key("c"));

        map.insert("d", Value::from(4));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "d"]);
    }

    #[test]
    fn equality_ignores_order() {
        let a: Map = [("a", Value::from(1)), ("b", Value::from(2))].into_iter().collect();
        let b: Map = [("b", Value::from(2)), ("a", Value::from(1))].into_iter().collect();
        assert_eq!(a, b);
    }
}
