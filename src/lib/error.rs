/// A broken structural invariant found by [`Map::check_invariants`].
///
/// Nodes are identified by their arena slot index.
///
/// [`Map::check_invariants`]: crate::Map::check_invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    /// The root node is red.
    #[error("root node {0} is red")]
    RedRoot(usize),

    /// A red node has a red child.
    #[error("red node {parent} has red child {child}")]
    RedRed {
        /// The red parent.
        parent: usize,
        /// Its red child.
        child: usize,
    },

    /// The two subtrees of a node carry different black heights.
    #[error("black height mismatch under node {node}: left {left}, right {right}")]
    BlackHeight {
        /// Node whose subtrees disagree.
        node: usize,
        /// Black height of the left subtree.
        left: usize,
        /// Black height of the right subtree.
        right: usize,
    },

    /// Two nodes adjacent in order are not strictly ascending.
    #[error("keys out of order between nodes {prev} and {next}")]
    Order {
        /// Earlier node of the pair.
        prev: usize,
        /// Later node of the pair.
        next: usize,
    },

    /// A child's parent link does not point back at its parent.
    #[error("node {node} has parent link {found}, expected {expected}")]
    ParentLink {
        /// The child node.
        node: usize,
        /// Parent link stored in the child.
        found: usize,
        /// Node that actually holds the child.
        expected: usize,
    },

    /// A node reachable from the root is flagged detached or has no entry.
    #[error("reachable node {0} is not attached")]
    Detached(usize),

    /// The recorded element count differs from the reachable node count.
    #[error("counted {counted} nodes but size is {recorded}")]
    Size {
        /// Nodes reachable from the root.
        counted: usize,
        /// Count kept by the map.
        recorded: usize,
    },

    /// The nil sentinel was left red or still linked after a mutation.
    #[error("nil sentinel is dirty")]
    Sentinel,
}
