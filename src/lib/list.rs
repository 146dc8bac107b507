//! A doubly linked list over an index arena.
//!
//! Positions are [`ListIterator`] handles. Like [`MapIterator`], a handle
//! borrows nothing and is re-checked on every use: once its node is removed
//! the handle goes stale and operations through it fail softly.
//!
//! [`MapIterator`]: crate::MapIterator

use std::fmt;
use std::iter::FusedIterator;

struct ListNode<T> {
    prev: Option<usize>,
    next: Option<usize>,
    value: Option<T>,
    generation: u32,
}

/// A position in a [`List`].
///
/// The end handle refers to no node and sits past either end of the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ListIterator {
    node: Option<(usize, u32)>,
}

impl ListIterator {
    const END: ListIterator = ListIterator { node: None };

    /// Returns true for the end handle.
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }
}

/// A doubly linked list with O(1) splicing at any live handle.
pub struct List<T> {
    nodes: Vec<ListNode<T>>,
    free: Vec<usize>,
    first: Option<usize>,
    last: Option<usize>,
    count: usize,
}

impl<T> List<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        List {
            nodes: Vec::new(),
            free: Vec::new(),
            first: None,
            last: None,
            count: 0,
        }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Removes every element, front first.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Handle to the first element, or the end handle if empty.
    pub fn front(&self) -> ListIterator {
        self.handle(self.first)
    }

    /// Handle to the last element, or the end handle if empty.
    pub fn back(&self) -> ListIterator {
        self.handle(self.last)
    }

    /// The end handle.
    pub fn end(&self) -> ListIterator {
        ListIterator::END
    }

    fn handle(&self, n: Option<usize>) -> ListIterator {
        ListIterator {
            node: n.map(|n| (n, self.nodes[n].generation)),
        }
    }

    fn alloc(&mut self, prev: Option<usize>, next: Option<usize>, value: T) -> usize {
        if let Some(n) = self.free.pop() {
            let node = &mut self.nodes[n];
            node.prev = prev;
            node.next = next;
            node.value = Some(value);
            return n;
        }
        self.nodes.push(ListNode {
            prev,
            next,
            value: Some(value),
            generation: 0,
        });
        self.nodes.len() - 1
    }

    fn release(&mut self, n: usize) -> Option<T> {
        let node = &mut self.nodes[n];
        node.prev = None;
        node.next = None;
        node.generation = node.generation.wrapping_add(1);
        self.free.push(n);
        self.count -= 1;
        node.value.take()
    }

    /// Appends `value` and returns a handle to it.
    pub fn push_back(&mut self, value: T) -> ListIterator {
        let n = self.alloc(self.last, None, value);
        match self.last {
            Some(last) => self.nodes[last].next = Some(n),
            None => self.first = Some(n),
        }
        self.last = Some(n);
        self.count += 1;
        self.handle(Some(n))
    }

    /// Prepends `value` and returns a handle to it.
    pub fn push_front(&mut self, value: T) -> ListIterator {
        let n = self.alloc(None, self.first, value);
        match self.first {
            Some(first) => self.nodes[first].prev = Some(n),
            None => self.last = Some(n),
        }
        self.first = Some(n);
        self.count += 1;
        self.handle(Some(n))
    }

    /// Removes and returns the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        let n = self.first?;
        self.unlink(n);
        self.release(n)
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        let n = self.last?;
        self.unlink(n);
        self.release(n)
    }

    fn unlink(&mut self, n: usize) {
        let (prev, next) = (self.nodes[n].prev, self.nodes[n].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.first = next,
        }
        match next {
            Some(x) => self.nodes[x].prev = prev,
            None => self.last = prev,
        }
    }

    /// Resolves a handle to its node if it is live and its neighbours still
    /// link back to it.
    fn resolve(&self, it: ListIterator) -> Option<usize> {
        let (n, generation) = it.node?;
        let node = self.nodes.get(n)?;
        if node.generation != generation || node.value.is_none() {
            return None;
        }
        let prev_ok = match node.prev {
            None => self.first == Some(n),
            Some(p) => self.nodes[p].next == Some(n),
        };
        let next_ok = match node.next {
            None => self.last == Some(n),
            Some(x) => self.nodes[x].prev == Some(n),
        };
        (prev_ok && next_ok).then_some(n)
    }

    /// Returns true if `it` is the end handle or names a live element.
    pub fn valid(&self, it: ListIterator) -> bool {
        it.is_end() || self.resolve(it).is_some()
    }

    /// Returns the element at `it`.
    pub fn value(&self, it: ListIterator) -> Option<&T> {
        let n = self.resolve(it)?;
        self.nodes[n].value.as_ref()
    }

    /// Returns the element at `it` mutably.
    pub fn value_mut(&mut self, it: ListIterator) -> Option<&mut T> {
        let n = self.resolve(it)?;
        self.nodes[n].value.as_mut()
    }

    /// Replaces the element at `it`. Returns false for end or stale handles.
    pub fn set(&mut self, it: ListIterator, value: T) -> bool {
        match self.value_mut(it) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Handle to the element after `it`; end at the back or for a bad handle.
    pub fn next(&self, it: ListIterator) -> ListIterator {
        match self.resolve(it) {
            Some(n) => self.handle(self.nodes[n].next),
            None => ListIterator::END,
        }
    }

    /// Handle to the element before `it`; end at the front or for a bad
    /// handle.
    pub fn prev(&self, it: ListIterator) -> ListIterator {
        match self.resolve(it) {
            Some(n) => self.handle(self.nodes[n].prev),
            None => ListIterator::END,
        }
    }

    /// Inserts `value` before `it`. Returns `None` for the end handle or a
    /// stale handle.
    pub fn insert_before(&mut self, it: ListIterator, value: T) -> Option<ListIterator> {
        let at = self.resolve(it)?;
        let prev = self.nodes[at].prev;
        let n = self.alloc(prev, Some(at), value);
        self.nodes[at].prev = Some(n);
        match prev {
            Some(p) => self.nodes[p].next = Some(n),
            None => self.first = Some(n),
        }
        self.count += 1;
        Some(self.handle(Some(n)))
    }

    /// Inserts `value` after `it`. Returns `None` for the end handle or a
    /// stale handle.
    pub fn insert_after(&mut self, it: ListIterator, value: T) -> Option<ListIterator> {
        let at = self.resolve(it)?;
        let next = self.nodes[at].next;
        let n = self.alloc(Some(at), next, value);
        self.nodes[at].next = Some(n);
        match next {
            Some(x) => self.nodes[x].prev = Some(n),
            None => self.last = Some(n),
        }
        self.count += 1;
        Some(self.handle(Some(n)))
    }

    /// Removes the element at `it` and returns it.
    pub fn remove(&mut self, it: ListIterator) -> Option<T> {
        let n = self.resolve(it)?;
        self.unlink(n);
        self.release(n)
    }

    /// Returns an iterator from front to back.
    pub fn iter(&self) -> ListIter<'_, T> {
        ListIter {
            list: self,
            front: self.first,
            back: self.last,
            remaining: self.count,
        }
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = List::new();
        list.extend(iter);
        list
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = ListIter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a [`List`].
pub struct ListIter<'a, T> {
    list: &'a List<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for ListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.front?];
        self.front = node.next;
        self.remaining -= 1;
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for ListIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.back?];
        self.back = node.prev;
        self.remaining -= 1;
        node.value.as_ref()
    }
}

impl<T> ExactSizeIterator for ListIter<'_, T> {}

impl<T> FusedIterator for ListIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Clone>(list: &List<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    /// Walks handles from the front, checking every link on the way.
    fn walk<T: Clone>(list: &List<T>) -> Vec<T> {
        let mut out = Vec::new();
        let mut it = list.front();
        while !it.is_end() {
            assert!(list.valid(it));
            out.push(list.value(it).unwrap().clone());
            it = list.next(it);
        }
        out
    }

    #[test]
    fn test_empty_list() {
        let mut list: List<i32> = List::new();
        assert!(list.is_empty());
        assert!(list.front().is_end());
        assert!(list.back().is_end());
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.pop_back(), None);
        assert!(list.valid(list.end()));
        assert!(list.value(list.end()).is_none());
    }

    #[test]
    fn test_push_and_pop_both_ends() {
        let mut list = List::new();
        list.push_back(2);
        list.push_back(3);
        list.push_front(1);
        assert_eq!(collect(&list), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), None);
        assert!(list.front().is_end());
    }

    #[test]
    fn test_handle_navigation() {
        let list: List<i32> = (1..=4).collect();
        assert_eq!(walk(&list), vec![1, 2, 3, 4]);
        let back = list.back();
        assert_eq!(list.value(list.prev(back)), Some(&3));
        assert!(list.next(back).is_end());
        assert!(list.prev(list.front()).is_end());
        assert!(list.next(list.end()).is_end());
    }

    #[test]
    fn test_insert_around_handle() {
        let mut list = List::new();
        let mid = list.push_back(2);
        let first = list.insert_before(mid, 1).unwrap();
        let last = list.insert_after(mid, 4).unwrap();
        list.insert_before(last, 3).unwrap();
        assert_eq!(walk(&list), vec![1, 2, 3, 4]);
        assert_eq!(list.front(), first);
        assert_eq!(list.back(), last);
        assert_eq!(list.insert_before(list.end(), 0), None);
        assert_eq!(list.insert_after(list.end(), 0), None);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_remove_middle_and_ends() {
        let mut list = List::new();
        let a = list.push_back('a');
        let b = list.push_back('b');
        let c = list.push_back('c');
        assert_eq!(list.remove(b), Some('b'));
        assert_eq!(list.next(a), c);
        assert_eq!(list.prev(c), a);
        assert_eq!(list.remove(a), Some('a'));
        assert_eq!(list.remove(c), Some('c'));
        assert!(list.is_empty());
        assert!(list.front().is_end());
    }

    #[test]
    fn test_stale_handle_fails_softly() {
        let mut list = List::new();
        let a = list.push_back(1);
        list.push_back(2);
        assert_eq!(list.remove(a), Some(1));
        assert!(!list.valid(a));
        assert_eq!(list.remove(a), None);
        assert!(!list.set(a, 5));
        assert_eq!(list.insert_after(a, 9), None);
        // recycled slot must not revive the old handle
        let b = list.push_front(3);
        assert_ne!(a, b);
        assert!(!list.valid(a));
        assert_eq!(walk(&list), vec![3, 2]);
    }

    #[test]
    fn test_set_and_value_mut() {
        let mut list: List<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let front = list.front();
        assert!(list.set(front, "z".to_string()));
        list.value_mut(list.back()).unwrap().push('!');
        assert_eq!(collect(&list), vec!["z".to_string(), "y!".to_string()]);
    }

    #[test]
    fn test_iter_double_ended() {
        let list: List<i32> = (1..=5).collect();
        let reversed: Vec<_> = list.iter().rev().copied().collect();
        assert_eq!(reversed, vec![5, 4, 3, 2, 1]);
        let mut it = list.iter();
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&5));
        assert_eq!(it.len(), 3);
        assert_eq!(format!("{:?}", list), "[1, 2, 3, 4, 5]");
    }

    #[test]
    fn test_clear_then_reuse() {
        let mut list: List<i32> = (0..10).collect();
        list.clear();
        assert!(list.is_empty());
        list.push_back(7);
        assert_eq!(walk(&list), vec![7]);
    }

    #[test]
    fn stress_test_against_vecdeque() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        use std::collections::VecDeque;

        let mut rng = StdRng::seed_from_u64(7);
        let mut list = List::new();
        let mut model = VecDeque::new();
        for i in 0..5000u32 {
            match rng.gen_range(0..5u8) {
                0 => {
                    list.push_back(i);
                    model.push_back(i);
                }
                1 => {
                    list.push_front(i);
                    model.push_front(i);
                }
                2 => assert_eq!(list.pop_front(), model.pop_front()),
                3 => assert_eq!(list.pop_back(), model.pop_back()),
                _ => {
                    if model.is_empty() {
                        continue;
                    }
                    // remove the element at a random position by walking handles
                    let pos = rng.gen_range(0..model.len());
                    let mut it = list.front();
                    for _ in 0..pos {
                        it = list.next(it);
                    }
                    assert_eq!(list.remove(it), model.remove(pos));
                }
            }
            assert_eq!(list.len(), model.len());
        }
        assert_eq!(collect(&list), model.into_iter().collect::<Vec<_>>());
    }
}
