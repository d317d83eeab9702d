//! A red-black tree based ordered set.
//!
//! [`RedBlackTree`] stores unique keys ordered by a [`Comparator`] and keeps
//! `insert`, `find` and `delete` at `O(log n)` regardless of insertion order.
//!
//! ```
//! use rbtree::RedBlackTree;
//!
//! let mut tree = RedBlackTree::new();
//! assert!(tree.insert(3));
//! assert!(tree.insert(1));
//! assert!(!tree.insert(3));
//! assert_eq!(tree.len(), 2);
//! assert!(tree.contains(&1));
//! assert!(tree.delete(&1));
//! assert!(!tree.delete(&1));
//! assert_eq!(tree.min(), Some(&3));
//! ```

#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

mod compare;
mod node;
mod tree;
mod validate;

#[cfg(test)]
mod metrics;

pub use compare::Comparator;
pub use node::Color;
pub use tree::RedBlackTree;
pub use validate::InvariantViolation;
