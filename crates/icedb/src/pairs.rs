//! Serde adapter storing a map as a sequence of `[key, value]` pairs.
//!
//! JSON objects only admit string keys; most chip database tables are keyed
//! by ids, locations or coordinate tuples. Use with `#[serde(with = "crate::pairs")]`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{btree_map, hash_map, BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// A map that can be rebuilt one pair at a time.
pub(crate) trait PairMap<K, V>: Default {
    /// Inserts a pair, returning `false` if the key was already present.
    fn insert_new(&mut self, key: K, value: V) -> bool;
}

impl<K: Ord, V> PairMap<K, V> for BTreeMap<K, V> {
    fn insert_new(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            btree_map::Entry::Vacant(e) => {
                e.insert(value);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> PairMap<K, V> for HashMap<K, V, S> {
    fn insert_new(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            hash_map::Entry::Vacant(e) => {
                e.insert(value);
                true
            }
            hash_map::Entry::Occupied(_) => false,
        }
    }
}

pub(crate) fn serialize<'a, M, K, V, S>(map: &'a M, serializer: S) -> Result<S::Ok, S::Error>
where
    &'a M: IntoIterator<Item = (&'a K, &'a V)>,
    K: Serialize + 'a,
    V: Serialize + 'a,
    S: Serializer,
{
    serializer.collect_seq(map)
}

/// Rebuilds the map, rejecting sequences that repeat a key.
pub(crate) fn deserialize<'de, M, K, V, D>(deserializer: D) -> Result<M, D::Error>
where
    M: PairMap<K, V>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let pairs = Vec::<(K, V)>::deserialize(deserializer)?;
    let mut map = M::default();
    for (i, (key, value)) in pairs.into_iter().enumerate() {
        if !map.insert_new(key, value) {
            return Err(D::Error::custom(format_args!("duplicate key at pair {i}")));
        }
    }
    Ok(map)
}
