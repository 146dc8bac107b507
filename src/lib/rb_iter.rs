use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::rb_node::{self, Node, NIL};

/// A position in a [`Map`](crate::Map).
///
/// The handle is a plain slot index plus the slot's generation; it borrows
/// nothing, so it can be held across mutations. Navigation and access go
/// through the map ([`Map::next`](crate::Map::next),
/// [`Map::value`](crate::Map::value), ...), which checks the handle is still
/// live first. Once the referenced entry is erased the handle is stale and
/// every lookup through it reports `None`/`false`.
///
/// The end handle sits one past either bound of the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapIterator {
    index: usize,
    generation: u32,
}

impl MapIterator {
    pub(super) const END: MapIterator = MapIterator {
        index: NIL,
        generation: 0,
    };

    pub(super) fn new(index: usize, generation: u32) -> Self {
        MapIterator { index, generation }
    }

    pub(super) fn index(&self) -> usize {
        self.index
    }

    pub(super) fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns true for the end handle.
    pub fn is_end(&self) -> bool {
        self.index == NIL
    }
}

impl Default for MapIterator {
    fn default() -> Self {
        MapIterator::END
    }
}

/// Borrowing iterator over a map's entries in key order.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node],
    entries: &'a [Option<(K, V)>],
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(
        nodes: &'a [Node],
        entries: &'a [Option<(K, V)>],
        root: usize,
        len: usize,
    ) -> Self {
        Iter {
            nodes,
            entries,
            front: rb_node::leftmost(nodes, root),
            back: rb_node::rightmost(nodes, root),
            remaining: len,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            entries: self.entries,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let n = self.front;
        self.front = rb_node::successor(self.nodes, n);
        self.remaining -= 1;
        self.entries[n].as_ref().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let n = self.back;
        self.back = rb_node::predecessor(self.nodes, n);
        self.remaining -= 1;
        self.entries[n].as_ref().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Borrowing iterator over a map's entries in key order, with mutable
/// values.
pub struct IterMut<'a, K, V> {
    nodes: &'a [Node],
    entries: *mut Option<(K, V)>,
    front: usize,
    back: usize,
    remaining: usize,
    marker: PhantomData<&'a mut (K, V)>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(super) fn new(
        nodes: &'a [Node],
        entries: &'a mut [Option<(K, V)>],
        root: usize,
        len: usize,
    ) -> Self {
        IterMut {
            nodes,
            entries: entries.as_mut_ptr(),
            front: rb_node::leftmost(nodes, root),
            back: rb_node::rightmost(nodes, root),
            remaining: len,
            marker: PhantomData,
        }
    }

    fn entry(&mut self, n: usize) -> Option<(&'a K, &'a mut V)> {
        // Slots are yielded at most once between front and back, so the
        // returned borrows never alias.
        let slot = unsafe { &mut *self.entries.add(n) };
        slot.as_mut().map(|(k, v)| (&*k, v))
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let n = self.front;
        self.front = rb_node::successor(self.nodes, n);
        self.remaining -= 1;
        self.entry(n)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let n = self.back;
        self.back = rb_node::predecessor(self.nodes, n);
        self.remaining -= 1;
        self.entry(n)
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}
