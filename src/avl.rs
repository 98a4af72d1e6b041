#![warn(missing_docs)]
use std::borrow::Borrow;
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::mem::replace;

mod arena;
mod iter;

use crate::InvariantError;
use arena::{Arena, Node, NodeId};
pub use iter::Iter;

#[cfg(test)]
macro_rules! chk_map {
    ( $x:expr ) => {{
        let m = $x;
        if let Err(e) = m.check() {
            panic!("invariant broken: {e}");
        }
    }};
}

#[cfg(not(test))]
macro_rules! chk_map {
    ( $x:expr ) => {{
        let _ = $x;
    }};
}

/// A map from keys to values sorted by key.
///
/// The map is an [AVL tree](https://en.wikipedia.org/wiki/AVL_tree): the
/// heights of the two subtrees of every node differ by at most one, so
/// lookups, insertions and removals all take `O(log n)` steps.
///
/// Nodes live in an arena owned by the map and refer to each other by slot
/// index.  Every node also records its parent's slot, which lets a mutation
/// walk back up to the root to repair heights and lets [`iter`] run without
/// an auxiliary stack.  Removing an entry frees its slot for reuse by a
/// later insertion.
///
/// [`iter`]: AvlMap::iter
///
/// # Examples
/// ```
/// use arena_avl::AvlMap;
///
/// let mut m = AvlMap::new();
/// m.insert(3, "c");
/// m.insert(1, "a");
/// m.insert(5, "e");
///
/// assert_eq!(m.find(&1), Some(&"a"));
/// assert_eq!(m.succ(&2), Some((&3, &"c")));
/// assert_eq!(m.prec(&4), Some((&3, &"c")));
///
/// m.erase(&3);
/// assert!(!m.count(&3));
/// assert_eq!(m.succ(&2), Some((&5, &"e")));
/// ```
#[derive(Clone)]
pub struct AvlMap<K, V> {
    len: usize,
    root: Option<NodeId>,
    nodes: Arena<K, V>,
}

impl<K, V> AvlMap<K, V> {
    /// Creates a new, empty map.
    /// # Examples
    /// ```
    /// use arena_avl::AvlMap;
    /// let m: AvlMap<usize, usize> = AvlMap::new();
    /// assert!(m.is_empty());
    /// ```
    pub fn new() -> Self {
        AvlMap {
            len: 0,
            root: None,
            nodes: Arena::new(),
        }
    }

    /// Drops all elements from the map.
    pub fn clear(&mut self) {
        self.len = 0;
        self.root = None;
        self.nodes.clear();
    }

    /// Returns the number of entries in self.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if self contains no entries, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single entry.
    ///
    /// An AVL tree with `n` entries is never taller than about
    /// `1.44 * log2(n + 2)`.
    pub fn height(&self) -> usize {
        self.ht(self.root) as usize
    }

    /// Creates an iterator over the map entries, sorted by key.
    ///
    /// # Examples
    /// ```
    /// use arena_avl::AvlMap;
    ///
    /// let m: AvlMap<_, _> =
    ///     [(2, 'b'), (0, 'z'), (1, 'a')].into_iter().collect();
    /// let keys: Vec<_> = m.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [0, 1, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.root, self.len)
    }

    /// Returns the key-value pair for the least key in the map
    ///
    /// # Examples
    /// ```
    /// use arena_avl::AvlMap;
    ///
    /// let m: AvlMap<_, _> = [(2, 0), (1, 0)].into_iter().collect();
    /// assert_eq!(m.first_key_value(), Some((&1, &0)));
    /// ```
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.root.map(|id| self.entry(self.leftmost(id)))
    }

    /// Returns the key-value pair for the greatest key in the map
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut id = self.root?;
        while let Some(r) = self.nodes[id].right {
            id = r;
        }
        Some(self.entry(id))
    }

    fn entry(&self, id: NodeId) -> (&K, &V) {
        let n = &self.nodes[id];
        (&n.key, &n.val)
    }

    fn ht(&self, id: Option<NodeId>) -> i8 {
        id.map_or(0, |id| self.nodes[id].ht)
    }

    // Returns the "balance factor" of the node
    fn bal(&self, id: NodeId) -> i8 {
        let n = &self.nodes[id];
        self.ht(n.right) - self.ht(n.left)
    }

    fn update(&mut self, id: NodeId) {
        let n = &self.nodes[id];
        let ht = self.ht(n.left).max(self.ht(n.right)) + 1;
        self.nodes[id].ht = ht;
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.nodes[id].left {
            id = l;
        }
        id
    }

    // Points whichever link held `old` (a child link of `parent`, or the
    // root) at `new`.  The caller fixes `new`'s parent link.
    fn relink(
        &mut self,
        parent: Option<NodeId>,
        old: NodeId,
        new: Option<NodeId>,
    ) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let pn = &mut self.nodes[p];
                if pn.left == Some(old) {
                    pn.left = new;
                } else {
                    pn.right = new;
                }
            }
        }
    }

    fn rot_lf(&mut self, a: NodeId) {
        // We want the following transformation:
        //    a(x, b(y, z))   =>   b(a(x, y), z)
        // x and z retain the same parents.
        let Some(b) = self.nodes[a].right else {
            panic!("left rotation at slot {a} without a right child");
        };
        log::trace!("rotate left at slot {a}");
        let par = self.nodes[a].parent;

        // move y from b to a
        let y = self.nodes[b].left;
        self.nodes[a].right = y;
        if let Some(y) = y {
            self.nodes[y].parent = Some(a);
        }

        // make a be b's left child
        self.nodes[b].left = Some(a);
        self.nodes[a].parent = Some(b);

        // install b where a used to hang
        self.nodes[b].parent = par;
        self.relink(par, a, Some(b));

        self.update(a);
        self.update(b);
        if let Some(p) = par {
            self.update(p);
        }
    }

    fn rot_rt(&mut self, a: NodeId) {
        // We want the following transformation:
        //    a(b(x, y), z)   =>   b(x, a(y, z))
        // x and z retain the same parents.
        let Some(b) = self.nodes[a].left else {
            panic!("right rotation at slot {a} without a left child");
        };
        log::trace!("rotate right at slot {a}");
        let par = self.nodes[a].parent;

        // move y from b to a
        let y = self.nodes[b].right;
        self.nodes[a].left = y;
        if let Some(y) = y {
            self.nodes[y].parent = Some(a);
        }

        // make a be b's right child
        self.nodes[b].right = Some(a);
        self.nodes[a].parent = Some(b);

        self.nodes[b].parent = par;
        self.relink(par, a, Some(b));

        self.update(a);
        self.update(b);
        if let Some(p) = par {
            self.update(p);
        }
    }

    // Refreshes the height of id and, if its subtrees now differ in height by
    // two, rotates to fix it.  The children must already be balanced.
    fn rebalance(&mut self, id: NodeId) {
        self.update(id);

        let bal = self.bal(id);
        if bal < -1 {
            // shift height from left to right
            let Some(lf) = self.nodes[id].left else {
                panic!("slot {id} leans left without a left child");
            };
            if self.bal(lf) > 0 {
                self.rot_lf(lf);
            }
            self.rot_rt(id);
        } else if bal > 1 {
            // shift height from right to left
            let Some(rt) = self.nodes[id].right else {
                panic!("slot {id} leans right without a right child");
            };
            if self.bal(rt) < 0 {
                self.rot_rt(rt);
            }
            self.rot_lf(id);
        }
    }

    // Rebalances every node from start up to the root.
    fn rebalance_from(&mut self, start: Option<NodeId>) {
        let mut curr = start;
        while let Some(id) = curr {
            // read first: rotating moves id below its old position
            curr = self.nodes[id].parent;
            self.rebalance(id);
        }
    }

    // Moves the entry and subtrees of child c into slot id and frees c.
    // Returns the entry id held before.
    fn splice(&mut self, id: NodeId, c: NodeId) -> (K, V) {
        let donor = self.nodes.free(c);
        for gc in [donor.left, donor.right].into_iter().flatten() {
            self.nodes[gc].parent = Some(id);
        }

        let n = &mut self.nodes[id];
        n.left = donor.left;
        n.right = donor.right;
        n.ht = donor.ht;
        (replace(&mut n.key, donor.key), replace(&mut n.val, donor.val))
    }

    // Removes the entry in slot id from the tree, rebalances up to the root
    // and returns the entry.  The slot freed is not necessarily id.
    fn unlink(&mut self, id: NodeId) -> (K, V) {
        let n = &self.nodes[id];
        match (n.left, n.right) {
            (None, None) => {
                log::trace!("erase leaf slot {id}");
                let old = self.nodes.free(id);
                self.relink(old.parent, id, None);
                self.rebalance_from(old.parent);
                (old.key, old.val)
            }

            (Some(c), None) | (None, Some(c)) => {
                log::trace!("erase slot {id} by splicing up child {c}");
                let old = self.splice(id, c);
                self.rebalance_from(Some(id));
                old
            }

            (Some(_), Some(rt)) if self.nodes[rt].left.is_none() => {
                // rt is the in-order successor; promote it
                log::trace!("erase slot {id} by promoting right child {rt}");
                let donor = self.nodes.free(rt);
                if let Some(z) = donor.right {
                    self.nodes[z].parent = Some(id);
                }

                let n = &mut self.nodes[id];
                n.right = donor.right;
                let key = replace(&mut n.key, donor.key);
                let val = replace(&mut n.val, donor.val);

                self.rebalance_from(Some(id));
                (key, val)
            }

            (Some(_), Some(rt)) => {
                // the successor has no left child, so removing it is one of
                // the simpler cases above
                let succ = self.leftmost(rt);
                log::trace!("erase slot {id} via successor slot {succ}");
                self.nodes.swap_entries(id, succ);
                self.unlink(succ)
            }
        }
    }

    fn fmt_node(&self, id: NodeId, f: &mut Formatter<'_>) -> std::fmt::Result
    where
        K: Debug,
        V: Debug,
    {
        let n = &self.nodes[id];
        f.write_fmt(format_args!(
            "(ht: {} {{{:?}: {:?}}} ",
            n.ht, n.key, n.val
        ))?;

        match n.left {
            None => f.write_str(".")?,
            Some(lf) => self.fmt_node(lf, f)?,
        }

        f.write_str(" ")?;

        match n.right {
            None => f.write_str(".")?,
            Some(rt) => self.fmt_node(rt, f)?,
        }

        f.write_str(")")
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    fn locate<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(id) = curr {
            let n = &self.nodes[id];
            match key.cmp(n.key.borrow()) {
                Less => curr = n.left,
                Equal => return Some(id),
                Greater => curr = n.right,
            }
        }

        None
    }

    /// Returns a reference to the value associated with key, or `None` if
    /// the key is absent.
    ///
    /// # Example
    /// ```
    /// use arena_avl::AvlMap;
    ///
    /// let mut m = AvlMap::new();
    /// m.insert(0, 100);
    ///
    /// assert_eq!(m.find(&0), Some(&100));
    /// assert_eq!(m.find(&1), None);
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).map(|id| &self.nodes[id].val)
    }

    /// Returns a mutable reference to the value associated with key.
    ///
    /// # Example
    /// ```
    /// use arena_avl::AvlMap;
    ///
    /// let mut m = AvlMap::new();
    /// m.insert(1, 7);
    ///
    /// *m.find_mut(&1).unwrap() = 2;
    /// assert_eq!(m.find(&1), Some(&2));
    /// ```
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.locate(key)?;
        Some(&mut self.nodes[id].val)
    }

    /// Tests if self contains an entry for the given key.
    pub fn count<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).is_some()
    }

    /// Inserts a key-value pair in the map.
    ///
    /// If the key was already present, its value is overwritten in place and
    /// the old value returned; the shape of the tree does not change.
    ///
    /// # Examples
    /// ```
    /// use arena_avl::AvlMap;
    ///
    /// let mut m = AvlMap::new();
    /// assert_eq!(m.insert(0, "a"), None);
    /// assert_eq!(m.insert(0, "b"), Some("a"));
    /// assert_eq!(m.find(&0), Some(&"b"));
    /// assert_eq!(m.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        let mut curr = match self.root {
            None => {
                self.root = Some(self.nodes.alloc(Node::leaf(key, val, None)));
                self.len = 1;
                return None; // *** EARLY RETURN ***
            }

            Some(id) => id,
        };

        let go_left = loop {
            let n = &mut self.nodes[curr];
            let (go_left, next) = match key.cmp(&n.key) {
                Equal => return Some(replace(&mut n.val, val)),
                Less => (true, n.left),
                Greater => (false, n.right),
            };

            match next {
                Some(child) => curr = child,
                None => break go_left,
            }
        };

        let leaf = self.nodes.alloc(Node::leaf(key, val, Some(curr)));
        if go_left {
            self.nodes[curr].left = Some(leaf);
        } else {
            self.nodes[curr].right = Some(leaf);
        }
        self.len += 1;

        self.rebalance_from(Some(curr));
        chk_map!(&*self);
        None
    }

    /// Removes a key from a map and returns the unmapped value.
    ///
    /// # Examples
    /// ```
    /// use arena_avl::AvlMap;
    ///
    /// let mut m = AvlMap::new();
    /// m.insert(1, 2);
    /// m.insert(2, 3);
    /// assert_eq!(m.remove(&2), Some(3));
    /// assert_eq!(m.remove(&2), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.locate(key)?;
        let (_, val) = self.unlink(id);
        self.len -= 1;
        chk_map!(&*self);
        Some(val)
    }

    /// Removes the entry for key, if there is one.
    ///
    /// Erasing an absent key does nothing.
    pub fn erase<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove(key);
    }

    /// Returns the entry with the least key greater than or equal to key.
    ///
    /// # Examples
    /// ```
    /// use arena_avl::AvlMap;
    ///
    /// let m: AvlMap<_, _> = [(1, 'a'), (3, 'c')].into_iter().collect();
    /// assert_eq!(m.succ(&1), Some((&1, &'a')));
    /// assert_eq!(m.succ(&2), Some((&3, &'c')));
    /// assert_eq!(m.succ(&4), None);
    /// ```
    pub fn succ<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = None;
        let mut curr = self.root;
        while let Some(id) = curr {
            let n = &self.nodes[id];
            match key.cmp(n.key.borrow()) {
                Equal => return Some((&n.key, &n.val)),
                Less => {
                    best = Some(id);
                    curr = n.left;
                }
                Greater => curr = n.right,
            }
        }

        best.map(|id| self.entry(id))
    }

    /// Returns the entry with the greatest key less than or equal to key.
    ///
    /// # Examples
    /// ```
    /// use arena_avl::AvlMap;
    ///
    /// let m: AvlMap<_, _> = [(1, 'a'), (3, 'c')].into_iter().collect();
    /// assert_eq!(m.prec(&3), Some((&3, &'c')));
    /// assert_eq!(m.prec(&2), Some((&1, &'a')));
    /// assert_eq!(m.prec(&0), None);
    /// ```
    pub fn prec<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = None;
        let mut curr = self.root;
        while let Some(id) = curr {
            let n = &self.nodes[id];
            match key.cmp(n.key.borrow()) {
                Equal => return Some((&n.key, &n.val)),
                Less => curr = n.left,
                Greater => {
                    best = Some(id);
                    curr = n.right;
                }
            }
        }

        best.map(|id| self.entry(id))
    }

    /// Verifies the structure of the tree.
    ///
    /// Checks that keys are in strictly ascending order, that every cached
    /// height is accurate, that every node is balanced, that parent links
    /// mirror child links, and that [`len`](AvlMap::len) counts the
    /// reachable nodes.  The map maintains all of this on its own, so an
    /// error indicates a bug in this crate.
    ///
    /// # Examples
    /// ```
    /// use arena_avl::AvlMap;
    ///
    /// let m: AvlMap<_, _> = (0..100).map(|i| (i, i * i)).collect();
    /// assert_eq!(m.check(), Ok(()));
    /// ```
    pub fn check(&self) -> Result<(), InvariantError> {
        let mut prev = None;
        let mut reachable = 0;
        if let Some(root) = self.root {
            self.chk_node(root, None, &mut prev, &mut reachable)?;
        }

        if reachable != self.len {
            return Err(InvariantError::LenMismatch {
                recorded: self.len,
                reachable,
            });
        }

        Ok(())
    }

    // Checks the subtree at id, which hangs from holder, and returns its
    // height.  prev is the greatest key visited so far.
    fn chk_node<'a>(
        &'a self,
        id: NodeId,
        holder: Option<NodeId>,
        prev: &mut Option<&'a K>,
        reachable: &mut usize,
    ) -> Result<i8, InvariantError> {
        let n = &self.nodes[id];

        match (holder, n.parent) {
            (None, Some(parent)) => {
                return Err(InvariantError::RootHasParent { slot: id, parent });
            }
            (Some(holder), parent) if parent != Some(holder) => {
                return Err(InvariantError::ParentMismatch {
                    child: id,
                    holder,
                    parent,
                });
            }
            _ => (),
        }

        let lf_ht = match n.left {
            Some(lf) => self.chk_node(lf, Some(id), prev, reachable)?,
            None => 0,
        };

        if prev.map_or(false, |p| p >= &n.key) {
            return Err(InvariantError::OutOfOrder { slot: id });
        }
        *prev = Some(&n.key);
        *reachable += 1;

        let rt_ht = match n.right {
            Some(rt) => self.chk_node(rt, Some(id), prev, reachable)?,
            None => 0,
        };

        let actual = lf_ht.max(rt_ht) + 1;
        if n.ht != actual {
            return Err(InvariantError::StaleHeight {
                slot: id,
                stored: n.ht,
                actual,
            });
        }

        let bal = rt_ht - lf_ht;
        if !(-1..=1).contains(&bal) {
            return Err(InvariantError::Unbalanced { slot: id, bal });
        }

        Ok(actual)
    }
}

impl<K: Debug, V: Debug> Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.root {
            None => f.write_str("AvlMap(EMPTY)"),
            Some(id) => {
                f.write_fmt(format_args!("AvlMap(#{}, ", self.len))?;
                self.fmt_node(id, f)?;
                f.write_str(")")
            }
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlMap<K, V> {}

impl<K, Q, V> std::ops::Index<&Q> for AvlMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, index: &Q) -> &Self::Output {
        match self.find(index) {
            Some(v) => v,
            None => panic!("Key not found in AvlMap"),
        }
    }
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut m = AvlMap::new();
        m.extend(iter);
        m
    }
}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
