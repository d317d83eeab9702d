use core::cmp::Ordering;

use thiserror::Error;

use crate::node::RawNode;
use crate::tree::RedBlackTree;

/// A broken red-black or search tree property found by [`RedBlackTree::validate`].
///
/// Depths count edges from the root, so the root is at depth 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root node is red")]
    RootNotBlack,
    #[error("root node has a parent link")]
    RootHasParent,
    #[error("red node at depth {depth} has a red child")]
    RedNodeWithRedChild { depth: usize },
    #[error("subtrees of the node at depth {depth} have black heights {left} and {right}")]
    BlackHeightMismatch {
        depth: usize,
        left: usize,
        right: usize,
    },
    #[error("key at in-order position {position} is not greater than the one before it")]
    OutOfOrder { position: usize },
    #[error("node at depth {depth} does not link back to its parent")]
    BrokenParentLink { depth: usize },
    #[error("tree records {recorded} nodes but {counted} are reachable")]
    LenMismatch { recorded: usize, counted: usize },
}

impl<K> RedBlackTree<K> {
    /// Walks the whole tree and checks every structural invariant.
    ///
    /// This is `O(n)` and intended for tests and debugging. A tree that is only
    /// modified through its public methods always passes.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return match self.len {
                0 => Ok(()),
                recorded => Err(InvariantViolation::LenMismatch {
                    recorded,
                    counted: 0,
                }),
            };
        };

        unsafe {
            if root.color().is_red() {
                return Err(InvariantViolation::RootNotBlack);
            }
            if root.parent().is_some() {
                return Err(InvariantViolation::RootHasParent);
            }
        }

        let mut counted = 0;
        unsafe { black_height(Some(root), 0, self.len, &mut counted)? };
        if counted != self.len {
            return Err(InvariantViolation::LenMismatch {
                recorded: self.len,
                counted,
            });
        }

        let keys = self.colored_inorder();
        let cmp = self.comparator();
        match keys
            .windows(2)
            .position(|w| cmp.compare(w[0].0, w[1].0) != Ordering::Less)
        {
            Some(i) => Err(InvariantViolation::OutOfOrder { position: i + 1 }),
            None => Ok(()),
        }
    }
}

/// Black height of the subtree at `node`, counting the missing leaves.
///
/// Stops with `LenMismatch` once more than `limit` nodes have been seen, so a
/// corrupted tree with a cycle still terminates.
unsafe fn black_height<K>(
    node: Option<RawNode<K>>,
    depth: usize,
    limit: usize,
    counted: &mut usize,
) -> Result<usize, InvariantViolation> {
    let Some(node) = node else {
        return Ok(1);
    };

    *counted += 1;
    if *counted > limit {
        return Err(InvariantViolation::LenMismatch {
            recorded: limit,
            counted: *counted,
        });
    }

    let (left, right) = unsafe { (node.left(), node.right()) };
    for child in [left, right].into_iter().flatten() {
        unsafe {
            if child.parent() != Some(node) {
                return Err(InvariantViolation::BrokenParentLink { depth: depth + 1 });
            }
            if node.color().is_red() && child.color().is_red() {
                return Err(InvariantViolation::RedNodeWithRedChild { depth });
            }
        }
    }

    let left = unsafe { black_height(left, depth + 1, limit, counted)? };
    let right = unsafe { black_height(right, depth + 1, limit, counted)? };
    if left != right {
        return Err(InvariantViolation::BlackHeightMismatch { depth, left, right });
    }

    Ok(left + unsafe { node.color() }.is_black() as usize)
}
