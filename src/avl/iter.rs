use super::arena::{Arena, NodeId};
use std::iter::FusedIterator;

/// An iterator over the entries of an [`AvlMap`](crate::AvlMap), in
/// ascending key order.
///
/// The iterator keeps no stack: it finds each in-order successor through the
/// nodes' parent links.
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    next: Option<NodeId>,
    len: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(
        arena: &'a Arena<K, V>,
        root: Option<NodeId>,
        len: usize,
    ) -> Self {
        Iter {
            arena,
            next: root.map(|id| leftmost(arena, id)),
            len,
        }
    }
}

fn leftmost<K, V>(arena: &Arena<K, V>, mut id: NodeId) -> NodeId {
    while let Some(l) = arena[id].left {
        id = l;
    }
    id
}

// in-order successor of id, or None if id holds the greatest key
fn successor<K, V>(arena: &Arena<K, V>, id: NodeId) -> Option<NodeId> {
    if let Some(r) = arena[id].right {
        return Some(leftmost(arena, r));
    }

    // climb until we leave a left subtree
    let mut child = id;
    let mut parent = arena[id].parent;
    while let Some(p) = parent {
        if arena[p].left == Some(child) {
            return Some(p);
        }
        child = p;
        parent = arena[p].parent;
    }
    None
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let id = self.next?;
        self.next = successor(arena, id);
        self.len -= 1;
        let n = &arena[id];
        Some((&n.key, &n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            arena: self.arena,
            next: self.next,
            len: self.len,
        }
    }
}
