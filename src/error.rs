use thiserror::Error;

/// A structural defect found by [`AvlMap::check`](crate::AvlMap::check).
///
/// Slots are arena indices and only useful for correlating with the map's
/// `Debug` output.  Keys are not reported because the map does not require
/// them to be `Debug`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// The root node has a parent link.
    #[error("root (slot {slot}) has parent slot {parent}")]
    RootHasParent {
        /// Slot of the root.
        slot: usize,
        /// Slot the root claims as its parent.
        parent: usize,
    },

    /// A child's parent link does not point at the node holding it.
    #[error("slot {child} is a child of slot {holder} but links to {parent:?}")]
    ParentMismatch {
        /// Slot of the child.
        child: usize,
        /// Slot whose left or right link holds the child.
        holder: usize,
        /// Parent link stored in the child.
        parent: Option<usize>,
    },

    /// An in-order walk met a key that is not greater than its predecessor.
    #[error("slot {slot} is out of order with its in-order predecessor")]
    OutOfOrder {
        /// Slot holding the offending key.
        slot: usize,
    },

    /// The cached height differs from the one computed from the children.
    #[error("slot {slot} caches height {stored} but has height {actual}")]
    StaleHeight {
        /// Slot of the node.
        slot: usize,
        /// Height stored in the node.
        stored: i8,
        /// Height recomputed from the children.
        actual: i8,
    },

    /// Subtree heights differ by more than one.
    #[error("slot {slot} has balance factor {bal}")]
    Unbalanced {
        /// Slot of the node.
        slot: usize,
        /// Right height minus left height.
        bal: i8,
    },

    /// The recorded length disagrees with the number of reachable nodes.
    #[error("map records {recorded} entries but {reachable} are reachable")]
    LenMismatch {
        /// Value of `len()`.
        recorded: usize,
        /// Nodes reachable from the root.
        reachable: usize,
    },
}
