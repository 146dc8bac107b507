use std::cmp::Ordering;

use crate::error::InvariantError;
use crate::rb_iter::MapIterator;
use crate::rb_node::{self, Color, Node, NIL};

/// Outcome of [`RbTree::find`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Search {
    /// A node with an equal key.
    Found(usize),
    /// No equal key. Holds the node a new key would be attached under, or
    /// `None` when the tree is empty.
    Vacant(Option<usize>),
}

/// Red-black tree over an index arena.
///
/// `nodes[i]` and `entries[i]` together form slot `i`. Slot [`NIL`] is the
/// shared black sentinel. Released slots go on `free` and are recycled by
/// [`RbTree::alloc`].
#[derive(Clone)]
pub(super) struct RbTree<K, V, C> {
    pub(super) nodes: Vec<Node>,
    pub(super) entries: Vec<Option<(K, V)>>,
    free: Vec<usize>,
    pub(super) root: usize,
    cmp: C,
}

impl<K, V, C> RbTree<K, V, C> {
    pub(super) fn new(cmp: C) -> Self {
        RbTree {
            nodes: vec![Node::sentinel()],
            entries: vec![None],
            free: Vec::new(),
            root: NIL,
            cmp,
        }
    }

    pub(super) fn first(&self) -> usize {
        rb_node::leftmost(&self.nodes, self.root)
    }

    pub(super) fn last(&self) -> usize {
        rb_node::rightmost(&self.nodes, self.root)
    }

    pub(super) fn next(&self, n: usize) -> usize {
        rb_node::successor(&self.nodes, n)
    }

    pub(super) fn prev(&self, n: usize) -> usize {
        rb_node::predecessor(&self.nodes, n)
    }

    pub(super) fn key(&self, n: usize) -> Option<&K> {
        self.entries[n].as_ref().map(|(k, _)| k)
    }

    pub(super) fn handle(&self, n: usize) -> MapIterator {
        if n == NIL {
            return MapIterator::END;
        }
        MapIterator::new(n, self.nodes[n].generation)
    }

    /// Maps a handle back to its slot if it still names a live, linked node.
    pub(super) fn resolve(&self, it: MapIterator) -> Option<usize> {
        let n = it.index();
        if n == NIL {
            return None;
        }
        let node = self.nodes.get(n)?;
        if node.generation != it.generation() || !self.is_linked(n) {
            return None;
        }
        Some(n)
    }

    /// Structural self-consistency: the node is attached, its parent (or the
    /// root pointer) refers to it, and its children point back at it.
    fn is_linked(&self, n: usize) -> bool {
        let node = &self.nodes[n];
        if !node.valid {
            return false;
        }
        let held = if node.parent == NIL {
            self.root == n
        } else {
            let parent = &self.nodes[node.parent];
            parent.left == n || parent.right == n
        };
        held && [node.left, node.right]
            .iter()
            .all(|&child| child == NIL || self.nodes[child].parent == n)
    }

    /// Stores an entry in a free slot. The node is not attached yet.
    pub(super) fn alloc(&mut self, key: K, value: V) -> usize {
        if let Some(n) = self.free.pop() {
            self.nodes[n].reset();
            self.entries[n] = Some((key, value));
            return n;
        }
        self.nodes.push(Node::new());
        self.entries.push(Some((key, value)));
        self.nodes.len() - 1
    }

    /// Returns a detached slot to the free list and moves its entry out.
    pub(super) fn release(&mut self, n: usize) -> Option<(K, V)> {
        let node = &mut self.nodes[n];
        node.unlink();
        node.valid = false;
        node.generation = node.generation.wrapping_add(1);
        self.free.push(n);
        self.entries[n].take()
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(super) fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    fn subtree_height(&self, n: usize) -> usize {
        if n == NIL {
            return 0;
        }
        let node = &self.nodes[n];
        1 + self
            .subtree_height(node.left)
            .max(self.subtree_height(node.right))
    }

    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == NIL {
            self.root = new;
        } else if self.nodes[parent].left == old {
            self.nodes[parent].left = new;
        } else {
            self.nodes[parent].right = new;
        }
    }

    fn rotate_left(&mut self, x: usize) {
        let y = self.nodes[x].right;
        let inner = self.nodes[y].left;
        self.nodes[x].right = inner;
        // The sentinel's parent link is reserved for the deletion fixup.
        if inner != NIL {
            self.nodes[inner].parent = x;
        }
        let parent = self.nodes[x].parent;
        self.replace_child(parent, x, y);
        self.nodes[y].parent = parent;
        self.nodes[y].left = x;
        self.nodes[x].parent = y;
    }

    fn rotate_right(&mut self, x: usize) {
        let y = self.nodes[x].left;
        let inner = self.nodes[y].right;
        self.nodes[x].left = inner;
        if inner != NIL {
            self.nodes[inner].parent = x;
        }
        let parent = self.nodes[x].parent;
        self.replace_child(parent, x, y);
        self.nodes[y].parent = parent;
        self.nodes[y].right = x;
        self.nodes[x].parent = y;
    }

    fn insert_fixup(&mut self, mut z: usize) {
        // The root's parent is the black sentinel, so the climb stops there.
        while self.nodes[self.nodes[z].parent].is_red() {
            let parent = self.nodes[z].parent;
            let grandparent = self.nodes[parent].parent;
            if parent == self.nodes[grandparent].left {
                let uncle = self.nodes[grandparent].right;
                if self.nodes[uncle].is_red() {
                    self.nodes[parent].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    z = grandparent;
                    continue;
                }
                if z == self.nodes[parent].right {
                    z = parent;
                    self.rotate_left(z);
                }
                let parent = self.nodes[z].parent;
                let grandparent = self.nodes[parent].parent;
                self.nodes[parent].color = Color::Black;
                self.nodes[grandparent].color = Color::Red;
                self.rotate_right(grandparent);
            } else {
                let uncle = self.nodes[grandparent].left;
                if self.nodes[uncle].is_red() {
                    self.nodes[parent].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    z = grandparent;
                    continue;
                }
                if z == self.nodes[parent].left {
                    z = parent;
                    self.rotate_right(z);
                }
                let parent = self.nodes[z].parent;
                let grandparent = self.nodes[parent].parent;
                self.nodes[parent].color = Color::Black;
                self.nodes[grandparent].color = Color::Red;
                self.rotate_left(grandparent);
            }
        }
        let root = self.root;
        self.nodes[root].color = Color::Black;
    }

    /// Detaches `n` and rebalances. Returns `false` if `n` was not attached.
    ///
    /// The entry stays in its slot; callers release it afterwards.
    pub(super) fn remove(&mut self, n: usize) -> bool {
        if n == NIL || !self.nodes[n].valid {
            return false;
        }
        let right = self.nodes[n].right;
        if right != NIL {
            let next = rb_node::leftmost(&self.nodes, right);
            self.swap_with_successor(n, next);
        }
        self.remove_one(n);
        self.nodes[n].valid = false;
        true
    }

    /// Exchanges the tree positions and colors of `a` and its in-order
    /// successor `b`, leaving `a` with no left child. Entries do not move, so
    /// handles to `b` stay good.
    fn swap_with_successor(&mut self, a: usize, b: usize) {
        let a_parent = self.nodes[a].parent;
        let a_left = self.nodes[a].left;
        let a_right = self.nodes[a].right;
        let b_parent = self.nodes[b].parent;
        let b_right = self.nodes[b].right;

        self.replace_child(a_parent, a, b);
        self.nodes[b].parent = a_parent;
        self.nodes[b].left = a_left;
        if a_left != NIL {
            self.nodes[a_left].parent = b;
        }
        if b == a_right {
            self.nodes[b].right = a;
            self.nodes[a].parent = b;
        } else {
            self.nodes[b].right = a_right;
            self.nodes[a_right].parent = b;
            // b was the leftmost node of a's right subtree
            self.nodes[b_parent].left = a;
            self.nodes[a].parent = b_parent;
        }
        self.nodes[a].left = NIL;
        self.nodes[a].right = b_right;
        if b_right != NIL {
            self.nodes[b_right].parent = a;
        }

        let color = self.nodes[a].color;
        self.nodes[a].color = self.nodes[b].color;
        self.nodes[b].color = color;
    }

    /// Splices out `z`, which has at most one child.
    fn remove_one(&mut self, z: usize) {
        let node = &self.nodes[z];
        let child = if node.left != NIL { node.left } else { node.right };
        let parent = node.parent;
        let color = node.color;

        self.replace_child(parent, z, child);
        // When child is NIL this parks the sentinel under parent so the
        // fixup can find its sibling.
        self.nodes[child].parent = parent;

        if color == Color::Black {
            if self.nodes[child].is_red() {
                self.nodes[child].color = Color::Black;
            } else {
                self.remove_fixup(child);
            }
        }

        let sentinel = &mut self.nodes[NIL];
        sentinel.unlink();
        sentinel.color = Color::Black;
        self.nodes[z].unlink();
    }

    /// Restores black height after `x` lost one black node on its path.
    fn remove_fixup(&mut self, mut x: usize) {
        while x != self.root && self.nodes[x].is_black() {
            let parent = self.nodes[x].parent;
            if x == self.nodes[parent].left {
                let mut sibling = self.nodes[parent].right;
                if self.nodes[sibling].is_red() {
                    self.nodes[sibling].color = Color::Black;
                    self.nodes[parent].color = Color::Red;
                    self.rotate_left(parent);
                    sibling = self.nodes[parent].right;
                }
                let near = self.nodes[sibling].left;
                let far = self.nodes[sibling].right;
                if self.nodes[near].is_black() && self.nodes[far].is_black() {
                    self.nodes[sibling].color = Color::Red;
                    if self.nodes[parent].is_red() {
                        self.nodes[parent].color = Color::Black;
                        return;
                    }
                    x = parent;
                    continue;
                }
                if self.nodes[far].is_black() {
                    self.nodes[near].color = Color::Black;
                    self.nodes[sibling].color = Color::Red;
                    self.rotate_right(sibling);
                    sibling = self.nodes[parent].right;
                }
                self.nodes[sibling].color = self.nodes[parent].color;
                self.nodes[parent].color = Color::Black;
                let far = self.nodes[sibling].right;
                self.nodes[far].color = Color::Black;
                self.rotate_left(parent);
                return;
            } else {
                let mut sibling = self.nodes[parent].left;
                if self.nodes[sibling].is_red() {
                    self.nodes[sibling].color = Color::Black;
                    self.nodes[parent].color = Color::Red;
                    self.rotate_right(parent);
                    sibling = self.nodes[parent].left;
                }
                let near = self.nodes[sibling].right;
                let far = self.nodes[sibling].left;
                if self.nodes[near].is_black() && self.nodes[far].is_black() {
                    self.nodes[sibling].color = Color::Red;
                    if self.nodes[parent].is_red() {
                        self.nodes[parent].color = Color::Black;
                        return;
                    }
                    x = parent;
                    continue;
                }
                if self.nodes[far].is_black() {
                    self.nodes[near].color = Color::Black;
                    self.nodes[sibling].color = Color::Red;
                    self.rotate_left(sibling);
                    sibling = self.nodes[parent].left;
                }
                self.nodes[sibling].color = self.nodes[parent].color;
                self.nodes[parent].color = Color::Black;
                let far = self.nodes[sibling].left;
                self.nodes[far].color = Color::Black;
                self.rotate_right(parent);
                return;
            }
        }
        self.nodes[x].color = Color::Black;
    }
}

impl<K, V, C> RbTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    pub(super) fn find(&self, key: &K) -> Search {
        let mut parent = None;
        let mut cur = self.root;
        while cur != NIL {
            let Some(k) = self.key(cur) else {
                break;
            };
            match (self.cmp)(key, k) {
                Ordering::Equal => return Search::Found(cur),
                Ordering::Less => {
                    parent = Some(cur);
                    cur = self.nodes[cur].left;
                }
                Ordering::Greater => {
                    parent = Some(cur);
                    cur = self.nodes[cur].right;
                }
            }
        }
        Search::Vacant(parent)
    }

    fn less(&self, a: usize, b: usize) -> bool {
        match (self.key(a), self.key(b)) {
            (Some(a), Some(b)) => (self.cmp)(a, b) == Ordering::Less,
            _ => false,
        }
    }

    /// Attaches the allocated node `n` under `parent` (as root when `None`)
    /// and rebalances.
    pub(super) fn insert(&mut self, parent: Option<usize>, n: usize) {
        self.nodes[n].reset();
        self.nodes[n].valid = true;
        let Some(parent) = parent else {
            debug_assert_eq!(self.root, NIL);
            self.nodes[n].color = Color::Black;
            self.root = n;
            return;
        };
        self.nodes[n].parent = parent;
        if self.less(n, parent) {
            self.nodes[parent].left = n;
        } else {
            self.nodes[parent].right = n;
        }
        self.insert_fixup(n);
    }

    /// Verifies every structural invariant, returning the number of nodes
    /// reachable from the root.
    pub(super) fn check(&self) -> Result<usize, InvariantError> {
        let sentinel = &self.nodes[NIL];
        if sentinel.is_red()
            || sentinel.parent != NIL
            || sentinel.left != NIL
            || sentinel.right != NIL
            || self.entries[NIL].is_some()
        {
            return Err(InvariantError::Sentinel);
        }
        if self.root == NIL {
            return Ok(0);
        }
        let root = &self.nodes[self.root];
        if root.is_red() {
            return Err(InvariantError::RedRoot(self.root));
        }
        if root.parent != NIL {
            return Err(InvariantError::ParentLink {
                node: self.root,
                found: root.parent,
                expected: NIL,
            });
        }
        let (_, count) = self.check_subtree(self.root)?;

        let mut prev = self.first();
        let mut next = self.next(prev);
        while next != NIL {
            if !self.less(prev, next) {
                return Err(InvariantError::Order { prev, next });
            }
            prev = next;
            next = self.next(next);
        }
        Ok(count)
    }

    /// Returns (black height, node count) of the subtree at `n`.
    fn check_subtree(&self, n: usize) -> Result<(usize, usize), InvariantError> {
        if n == NIL {
            return Ok((1, 0));
        }
        let node = &self.nodes[n];
        if !node.valid || self.entries[n].is_none() {
            return Err(InvariantError::Detached(n));
        }
        for child in [node.left, node.right] {
            if child == NIL {
                continue;
            }
            let found = self.nodes[child].parent;
            if found != n {
                return Err(InvariantError::ParentLink {
                    node: child,
                    found,
                    expected: n,
                });
            }
            if node.is_red() && self.nodes[child].is_red() {
                return Err(InvariantError::RedRed { parent: n, child });
            }
        }
        let (left, left_count) = self.check_subtree(node.left)?;
        let (right, right_count) = self.check_subtree(node.right)?;
        if left != right {
            return Err(InvariantError::BlackHeight { node: n, left, right });
        }
        Ok((left + usize::from(node.is_black()), left_count + right_count + 1))
    }
}
