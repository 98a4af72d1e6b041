//! # An ordered map on an arena-allocated AVL tree
//!
//! `arena-avl` provides [`AvlMap`], a map sorted by key and kept balanced
//! with the classic AVL height rule.  It offers exact lookup, insertion,
//! removal and inclusive successor/predecessor queries, each in `O(log n)`.
//!
//! Tree nodes are stored in a slot arena owned by the map and link to their
//! children and their parent by index.  Nothing is reference counted and no
//! `unsafe` code is involved.
//!
//! ```
//! use arena_avl::AvlMap;
//!
//! let mut m: AvlMap<_, _> = [(1, "one"), (3, "three"), (5, "five")]
//!     .into_iter()
//!     .collect();
//!
//! assert_eq!(m.succ(&4), Some((&5, &"five")));
//! assert_eq!(m.prec(&4), Some((&3, &"three")));
//! assert_eq!(m.succ(&6), None);
//!
//! m.erase(&3);
//! assert_eq!(m.prec(&4), Some((&1, &"one")));
//! ```

mod avl;
pub use avl::AvlMap;
pub use avl::Iter;

mod error;
pub use error::InvariantError;
