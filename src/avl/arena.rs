use std::ops::{Index, IndexMut};

/// Index of a node's slot in the [`Arena`].
pub(super) type NodeId = usize;

/// A tree node.  Links are slot indices; `parent` is only ever followed
/// upward and never owns anything.
#[derive(Clone)]
pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) val: V,
    pub(super) ht: i8,
    pub(super) left: Option<NodeId>,
    pub(super) right: Option<NodeId>,
    pub(super) parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    pub(super) fn leaf(key: K, val: V, parent: Option<NodeId>) -> Self {
        Node {
            key,
            val,
            ht: 1,
            left: None,
            right: None,
            parent,
        }
    }
}

#[derive(Clone)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant { next_free: Option<NodeId> },
}

/// Slot storage for the nodes of one tree.
///
/// Freed slots are threaded onto a free list and handed out again by
/// [`alloc`](Arena::alloc), so a long-lived map does not grow past its peak
/// population.
#[derive(Clone)]
pub(super) struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    free_head: Option<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub(super) fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free_head: None,
        }
    }

    pub(super) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free_head {
            Some(id) => {
                let live = Slot::Occupied(node);
                match std::mem::replace(&mut self.slots[id], live) {
                    Slot::Vacant { next_free } => self.free_head = next_free,
                    Slot::Occupied(_) => panic!("free list hit live slot {id}"),
                }
                log::trace!("reusing slot {id}");
                id
            }

            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        }
    }

    /// Vacates slot `id` and moves its node out.
    pub(super) fn free(&mut self, id: NodeId) -> Node<K, V> {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match std::mem::replace(&mut self.slots[id], vacant) {
            Slot::Occupied(n) => {
                self.free_head = Some(id);
                n
            }
            Slot::Vacant { .. } => panic!("double free of slot {id}"),
        }
    }

    /// Exchanges the key/value payloads of two live nodes, leaving their
    /// links and heights where they are.
    pub(super) fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }

        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.slots.split_at_mut(hi);
        match (&mut head[lo], &mut tail[0]) {
            (Slot::Occupied(x), Slot::Occupied(y)) => {
                std::mem::swap(&mut x.key, &mut y.key);
                std::mem::swap(&mut x.val, &mut y.val);
            }
            _ => panic!("swap_entries on a vacant slot ({a}, {b})"),
        }
    }

    pub(super) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
    }

    #[cfg(test)]
    pub(super) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    fn live(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied(_)))
            .count()
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match &self.slots[id] {
            Slot::Occupied(n) => n,
            Slot::Vacant { .. } => panic!("dangling link to vacant slot {id}"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match &mut self.slots[id] {
            Slot::Occupied(n) => n,
            Slot::Vacant { .. } => panic!("dangling link to vacant slot {id}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = Arena::new();
        let a = arena.alloc(Node::leaf(1, 'a', None));
        let b = arena.alloc(Node::leaf(2, 'b', Some(a)));
        let c = arena.alloc(Node::leaf(3, 'c', Some(a)));
        assert_eq!(arena.live(), 3);

        let n = arena.free(b);
        assert_eq!((n.key, n.val, n.parent), (2, 'b', Some(a)));
        assert_eq!(arena.live(), 2);

        // most recently freed slot comes back first
        arena.free(c);
        assert_eq!(arena.alloc(Node::leaf(4, 'd', None)), c);
        assert_eq!(arena.alloc(Node::leaf(5, 'e', None)), b);
        assert_eq!(arena.alloc(Node::leaf(6, 'f', None)), 3);
        assert_eq!(arena.live(), 4);
    }

    #[test]
    fn swap_entries_keeps_links() {
        let mut arena = Arena::new();
        let a = arena.alloc(Node::leaf(1, "one", None));
        let b = arena.alloc(Node::leaf(2, "two", Some(a)));
        arena[a].right = Some(b);
        arena[a].ht = 2;

        arena.swap_entries(b, a);

        assert_eq!((arena[a].key, arena[a].val), (2, "two"));
        assert_eq!((arena[b].key, arena[b].val), (1, "one"));
        assert_eq!(arena[a].right, Some(b));
        assert_eq!(arena[b].parent, Some(a));
        assert_eq!(arena[a].ht, 2);
        assert_eq!(arena[b].ht, 1);
    }

    #[test]
    #[should_panic(expected = "double free")]
    fn double_free_panics() {
        let mut arena = Arena::new();
        let a = arena.alloc(Node::leaf(0u8, (), None));
        arena.free(a);
        arena.free(a);
    }

    #[test]
    #[should_panic(expected = "vacant slot")]
    fn dangling_index_panics() {
        let mut arena = Arena::new();
        let a = arena.alloc(Node::leaf(0u8, (), None));
        arena.free(a);
        let _ = &arena[a];
    }
}
