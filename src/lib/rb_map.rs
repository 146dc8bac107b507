//! Ordered in-memory containers.
//!
//! [`Map`] is a sorted associative map backed by a red-black tree stored in an
//! index arena, ordered by a caller-supplied comparator. Positions in the map
//! are [`MapIterator`] handles that can be held across mutations and are
//! checked for liveness on every use.
//!
//! The [`list`] module provides a doubly linked list with the same handle
//! style, and [`bytes`] holds stateless byte-string helpers.
#![warn(missing_docs)]

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use log::{debug, trace};

pub mod bytes;
mod error;
pub mod list;
mod rb_iter;
mod rb_node;
mod rb_tree;

pub use error::InvariantError;
pub use rb_iter::{Iter, IterMut, MapIterator};

use rb_tree::{RbTree, Search};

/// Comparator used by [`Map::new`].
pub type OrdComparator<K> = fn(&K, &K) -> Ordering;

/// A sorted map ordered by a three-way comparator.
///
/// The comparator must be a strict total order. Keys it reports as
/// `Ordering::Equal` are the same key: setting one replaces the value of the
/// other.
#[derive(Clone)]
pub struct Map<K, V, C = OrdComparator<K>> {
    tree: RbTree<K, V, C>,
    length: usize,
}

impl<K: Ord, V> Map<K, V> {
    /// Creates an empty map ordered by `K`'s `Ord` implementation.
    pub fn new() -> Self {
        Self::with_comparator(K::cmp)
    }
}

impl<K: Ord, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> Map<K, V, C> {
    /// Creates an empty map ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self
    where
        C: Fn(&K, &K) -> Ordering,
    {
        Map {
            tree: RbTree::new(cmp),
            length: 0,
        }
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Handle to the smallest key, or the end handle if the map is empty.
    pub fn begin(&self) -> MapIterator {
        self.tree.handle(self.tree.first())
    }

    /// Handle to the largest key, or the end handle if the map is empty.
    pub fn rbegin(&self) -> MapIterator {
        self.tree.handle(self.tree.last())
    }

    /// The end handle, one past either bound.
    pub fn end(&self) -> MapIterator {
        MapIterator::END
    }

    /// Handle to the entry after `it`. The end handle and stale handles give
    /// the end handle.
    pub fn next(&self, it: MapIterator) -> MapIterator {
        match self.tree.resolve(it) {
            Some(n) => self.tree.handle(self.tree.next(n)),
            None => MapIterator::END,
        }
    }

    /// Handle to the entry before `it`. The end handle and stale handles give
    /// the end handle.
    pub fn prev(&self, it: MapIterator) -> MapIterator {
        match self.tree.resolve(it) {
            Some(n) => self.tree.handle(self.tree.prev(n)),
            None => MapIterator::END,
        }
    }

    /// Returns true if `it` names an entry currently in the map.
    pub fn is_valid(&self, it: MapIterator) -> bool {
        self.tree.resolve(it).is_some()
    }

    /// Returns the entry at `it`.
    pub fn value(&self, it: MapIterator) -> Option<(&K, &V)> {
        let n = self.tree.resolve(it)?;
        self.tree.entries[n].as_ref().map(|(k, v)| (k, v))
    }

    /// Returns the entry at `it` with a mutable value. The key stays shared:
    /// it fixes the entry's position.
    pub fn value_mut(&mut self, it: MapIterator) -> Option<(&K, &mut V)> {
        let n = self.tree.resolve(it)?;
        self.tree.entries[n].as_mut().map(|(k, v)| (&*k, v))
    }

    /// Replaces the value at `it`. Returns false for end or stale handles.
    pub fn set_value(&mut self, it: MapIterator, value: V) -> bool {
        match self.value_mut(it) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Removes the entry at `it`. Returns false, leaving the map untouched,
    /// for the end handle or a stale handle.
    pub fn erase(&mut self, it: MapIterator) -> bool {
        self.erase_entry(it).is_some()
    }

    fn erase_entry(&mut self, it: MapIterator) -> Option<(K, V)> {
        let Some(n) = self.tree.resolve(it) else {
            if !it.is_end() {
                trace!("ignoring stale map iterator {:?}", it);
            }
            return None;
        };
        self.tree.remove(n);
        self.length -= 1;
        self.tree.release(n)
    }

    /// Removes every entry.
    ///
    /// Erases the first entry until the map is empty, which is O(n log n);
    /// simplicity wins over the fastest possible teardown here.
    pub fn clear(&mut self) {
        if self.length > 0 {
            debug!("clearing map of {} entries", self.length);
        }
        while self.length > 0 {
            let first = self.begin();
            if !self.erase(first) {
                break;
            }
        }
    }

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.value(self.begin())
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.value(self.rbegin())
    }

    /// Returns an iterator over the entries in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(
            &self.tree.nodes,
            &self.tree.entries,
            self.tree.root,
            self.length,
        )
    }

    /// Returns an iterator over the entries in key order, with mutable
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(
            &self.tree.nodes,
            &mut self.tree.entries,
            self.tree.root,
            self.length,
        )
    }

    /// Number of nodes on the longest root-to-leaf path of the backing tree.
    pub fn height(&self) -> usize {
        self.tree.height()
    }
}

impl<K, V, C> Map<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Sets `key` to `value` and returns a handle to the entry.
    ///
    /// If the key is present only its value changes; position and size stay
    /// the same.
    pub fn set(&mut self, key: K, value: V) -> MapIterator {
        self.upsert(key, value).0
    }

    /// Inserts `key` with `value`, returning the value it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value).1
    }

    fn upsert(&mut self, key: K, value: V) -> (MapIterator, Option<V>) {
        match self.tree.find(&key) {
            Search::Found(n) => {
                let old = self.tree.entries[n]
                    .as_mut()
                    .map(|(_, slot)| mem::replace(slot, value));
                (self.tree.handle(n), old)
            }
            Search::Vacant(parent) => {
                let n = self.tree.alloc(key, value);
                self.tree.insert(parent, n);
                self.length += 1;
                (self.tree.handle(n), None)
            }
        }
    }

    /// Handle to `key`'s entry, or the end handle if absent.
    pub fn find(&self, key: &K) -> MapIterator {
        match self.tree.find(key) {
            Search::Found(n) => self.tree.handle(n),
            Search::Vacant(_) => MapIterator::END,
        }
    }

    /// Returns a reference to the value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.value(self.find(key)).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let it = self.find(key);
        self.value_mut(it).map(|(_, v)| v)
    }

    /// Returns true if the map holds `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        !self.find(key).is_end()
    }

    /// Removes `key`. Returns false if it was absent.
    pub fn remove(&mut self, key: &K) -> bool {
        let it = self.find(key);
        self.erase(it)
    }

    /// Removes `key` and returns its entry.
    pub fn take(&mut self, key: &K) -> Option<(K, V)> {
        let it = self.find(key);
        self.erase_entry(it)
    }

    /// Verifies the red-black invariants, key order, parent links and the
    /// element count. Returns the number of entries on success.
    pub fn check_invariants(&self) -> Result<usize, InvariantError> {
        let counted = self.tree.check()?;
        if counted != self.length {
            return Err(InvariantError::Size {
                counted,
                recorded: self.length,
            });
        }
        Ok(counted)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Map<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> IntoIterator for &'a Map<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut Map<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C> Extend<(K, V)> for Map<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        map.extend(iter);
        map
    }
}
