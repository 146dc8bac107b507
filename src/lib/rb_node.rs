/// Arena index of the black sentinel standing in for every absent child.
///
/// Slot 0 never holds an entry. During deletion its parent link is borrowed
/// so the fixup can treat a removed leaf's empty slot like a real node.
pub(super) const NIL: usize = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Color {
    Red,
    Black,
}

/// Structural half of an arena slot. The key-value entry lives in the
/// tree's parallel `entries` vector at the same index.
#[derive(Clone, Debug)]
pub(super) struct Node {
    pub(super) parent: usize,
    pub(super) left: usize,
    pub(super) right: usize,
    pub(super) color: Color,
    /// Set while the node is attached to the tree.
    pub(super) valid: bool,
    /// Bumped each time the slot is released, so handles to a recycled slot
    /// no longer match.
    pub(super) generation: u32,
}

impl Node {
    pub(super) fn new() -> Self {
        Node {
            parent: NIL,
            left: NIL,
            right: NIL,
            color: Color::Red,
            valid: false,
            generation: 0,
        }
    }

    pub(super) fn sentinel() -> Self {
        Node {
            color: Color::Black,
            ..Node::new()
        }
    }

    pub(super) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    pub(super) fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    pub(super) fn unlink(&mut self) {
        self.parent = NIL;
        self.left = NIL;
        self.right = NIL;
    }

    /// Prepares a fresh or recycled slot for attachment. The generation is
    /// left alone: it was already bumped when the slot was released.
    pub(super) fn reset(&mut self) {
        self.unlink();
        self.color = Color::Red;
        self.valid = false;
    }
}

pub(super) fn leftmost(nodes: &[Node], mut n: usize) -> usize {
    while nodes[n].left != NIL {
        n = nodes[n].left;
    }
    n
}

pub(super) fn rightmost(nodes: &[Node], mut n: usize) -> usize {
    while nodes[n].right != NIL {
        n = nodes[n].right;
    }
    n
}

/// In-order successor of `n`, or `NIL` past the last node.
pub(super) fn successor(nodes: &[Node], n: usize) -> usize {
    let right = nodes[n].right;
    if right != NIL {
        return leftmost(nodes, right);
    }
    let mut child = n;
    let mut parent = nodes[n].parent;
    while parent != NIL && nodes[parent].right == child {
        child = parent;
        parent = nodes[parent].parent;
    }
    parent
}

/// In-order predecessor of `n`, or `NIL` before the first node.
pub(super) fn predecessor(nodes: &[Node], n: usize) -> usize {
    let left = nodes[n].left;
    if left != NIL {
        return rightmost(nodes, left);
    }
    let mut child = n;
    let mut parent = nodes[n].parent;
    while parent != NIL && nodes[parent].left == child {
        child = parent;
        parent = nodes[parent].parent;
    }
    parent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(parent: usize, left: usize, right: usize) -> Node {
        Node {
            parent,
            left,
            right,
            color: Color::Black,
            valid: true,
            generation: 0,
        }
    }

    /// Hand-linked tree over slots 1..=5 holding in-order ranks:
    ///
    /// ```text
    ///         4
    ///       /   \
    ///      2     5
    ///     / \
    ///    1   3
    /// ```
    fn sample() -> Vec<Node> {
        vec![
            Node::sentinel(),
            node(2, NIL, NIL),
            node(4, 1, 3),
            node(2, NIL, NIL),
            node(NIL, 2, 5),
            node(4, NIL, NIL),
        ]
    }

    #[test]
    fn test_extremes() {
        let nodes = sample();
        assert_eq!(leftmost(&nodes, 4), 1);
        assert_eq!(rightmost(&nodes, 4), 5);
        assert_eq!(rightmost(&nodes, 2), 3);
        assert_eq!(leftmost(&nodes, NIL), NIL);
    }

    #[test]
    fn test_successor_walk() {
        let nodes = sample();
        let mut order = Vec::new();
        let mut n = leftmost(&nodes, 4);
        while n != NIL {
            order.push(n);
            n = successor(&nodes, n);
        }
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_predecessor_walk() {
        let nodes = sample();
        let mut order = Vec::new();
        let mut n = rightmost(&nodes, 4);
        while n != NIL {
            order.push(n);
            n = predecessor(&nodes, n);
        }
        assert_eq!(order, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_reset_keeps_generation() {
        let mut n = node(3, 1, 2);
        n.generation = 7;
        n.reset();
        assert_eq!((n.parent, n.left, n.right), (NIL, NIL, NIL));
        assert!(n.is_red());
        assert!(!n.valid);
        assert_eq!(n.generation, 7);
    }
}
