use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem;

use log::{debug, trace};

use crate::compare::Comparator;
use crate::node::{color_of, Color, Node, NodePos, RawNode};

/// An ordered set of keys, balanced as a red-black tree.
///
/// Every path from the root to a missing child passes through the same number
/// of black nodes and no red node has a red child, which keeps the height below
/// `2 * log2(len + 1)` whatever the insertion order.
///
/// Keys are ordered by a [`Comparator`] chosen at construction time. Keys that
/// compare equal are duplicates and are never stored twice.
pub struct RedBlackTree<K> {
    // INVARIANTS:
    //  * `root` is `None` iff `len == 0`
    //  * every node reachable from `root` was created by `RawNode::from_node`
    //    and is reachable through exactly one child link
    pub(crate) root: Option<RawNode<K>>,
    pub(crate) len: usize,
    cmp: Comparator<K>,
    marker: PhantomData<Box<Node<K>>>,
}

// SAFETY: every node is owned by the tree as if through `Box<Node<K>>`, and
// the comparator is `Send + Sync`.
unsafe impl<K: Send> Send for RedBlackTree<K> {}
unsafe impl<K: Sync> Sync for RedBlackTree<K> {}

impl<K> Drop for RedBlackTree<K> {
    fn drop(&mut self) {
        // TODO: handle panics in `K::drop`, currently the remaining nodes leak
        if let Some(root) = self.root.take() {
            self.len = 0;
            unsafe { Self::free_subtree(root) }
        }
    }
}

impl<K> fmt::Debug for RedBlackTree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct TreeDebug<'a, K> {
            root: RawNode<K>,
            marker: PhantomData<&'a Node<K>>,
        }

        impl<K> fmt::Debug for TreeDebug<'_, K>
        where
            K: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut f = f.debug_list();

                let mut func = |node: RawNode<K>| {
                    let node = unsafe { node.as_ref() };
                    f.entry(&node);
                };

                unsafe { RedBlackTree::inorder_for_each_core(self.root, &mut func) };
                f.finish()
            }
        }

        let mut f = f.debug_struct("RedBlackTree");
        f.field("len", &self.len).field("cmp", &self.cmp);

        match self.root {
            None => {
                f.field("root", &None::<K>);
                let nodes: &[K] = &[];
                f.field("nodes", &nodes);
            }
            Some(root) => {
                f.field("root", &Some(unsafe { root.as_ref() }));
                f.field(
                    "nodes",
                    &TreeDebug {
                        root,
                        marker: PhantomData,
                    },
                );
            }
        }

        f.finish()
    }
}

impl<K> Default for RedBlackTree<K>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RedBlackTree<K>
where
    K: Ord,
{
    /// Creates an empty tree ordered by `K`'s [`Ord`] implementation.
    pub fn new() -> Self {
        Self::with_comparator(Comparator::natural())
    }
}

impl<K> RedBlackTree<K> {
    /// Creates an empty tree ordered by `cmp`.
    pub fn with_comparator(cmp: Comparator<K>) -> Self {
        Self {
            root: None,
            len: 0,
            cmp,
            marker: PhantomData,
        }
    }

    /// Creates an empty tree ordered by the three-way comparison `f`.
    pub fn with_compare_fn<F>(f: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        Self::with_comparator(Comparator::new(f))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn comparator(&self) -> &Comparator<K> {
        &self.cmp
    }

    /// Removes and drops every key.
    pub fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            debug!("clearing red-black tree of {} nodes", self.len);
            self.len = 0;
            unsafe { Self::free_subtree(root) }
        }
    }

    unsafe fn free_subtree(node: RawNode<K>) {
        if let Some(l) = unsafe { node.left() } {
            unsafe { Self::free_subtree(l) };
        }
        if let Some(r) = unsafe { node.right() } {
            unsafe { Self::free_subtree(r) };
        }
        let _: Box<Node<K>> = unsafe { node.into_box() };
    }

    /// Calls `f` on every key in ascending order.
    pub fn inorder_for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K),
    {
        if let Some(root) = self.root {
            let mut f = |node: RawNode<K>| f(unsafe { node.key() });
            unsafe { Self::inorder_for_each_core(root, &mut f) }
        }
    }

    pub(crate) unsafe fn inorder_for_each_core<F>(node: RawNode<K>, f: &mut F)
    where
        F: FnMut(RawNode<K>),
    {
        if let Some(l) = unsafe { node.left() } {
            unsafe { Self::inorder_for_each_core(l, f) };
        }
        f(node);
        if let Some(r) = unsafe { node.right() } {
            unsafe { Self::inorder_for_each_core(r, f) };
        }
    }

    /// Every key in ascending order together with the color of its node.
    ///
    /// Meant for debugging and tests, the colors are an implementation detail.
    pub fn colored_inorder(&self) -> Vec<(&K, Color)> {
        let mut items = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            let mut f = |node: RawNode<K>| unsafe { items.push((node.key(), node.color())) };
            unsafe { Self::inorder_for_each_core(root, &mut f) }
        }
        items
    }

    /// Number of nodes on the longest path from the root down to a leaf.
    pub fn height(&self) -> usize {
        unsafe fn inner<K>(node: Option<RawNode<K>>) -> usize {
            match node {
                Some(node) => unsafe { 1 + inner(node.left()).max(inner(node.right())) },
                None => 0,
            }
        }

        unsafe { inner(self.root) }
    }

    /// Returns the stored key that compares equal to `key`.
    pub fn find(&self, key: &K) -> Option<&K> {
        self.find_raw(key).map(|node| unsafe { node.key() })
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find_raw(key).is_some()
    }

    pub(crate) fn find_raw(&self, key: &K) -> Option<RawNode<K>> {
        let mut x = self.root;
        while let Some(node) = x {
            match self.cmp.compare(key, unsafe { node.key() }) {
                Ordering::Less => x = unsafe { node.left() },
                Ordering::Equal => return Some(node),
                Ordering::Greater => x = unsafe { node.right() },
            }
        }

        None
    }

    pub fn min(&self) -> Option<&K> {
        self.root.map(|root| unsafe { Self::min_of(root).key() })
    }

    unsafe fn min_of(root: RawNode<K>) -> RawNode<K> {
        let mut x = root;
        while let Some(left) = unsafe { x.left() } {
            x = left;
        }

        x
    }

    pub fn max(&self) -> Option<&K> {
        self.root.map(|root| unsafe { Self::max_of(root).key() })
    }

    unsafe fn max_of(root: RawNode<K>) -> RawNode<K> {
        let mut x = root;
        while let Some(right) = unsafe { x.right() } {
            x = right;
        }

        x
    }

    /// The smallest key greater than `key`, `None` if `key` is not in the tree
    /// or is its maximum.
    pub fn successor(&self, key: &K) -> Option<&K> {
        let node = self.find_raw(key)?;
        unsafe { Self::successor_core(node).map(|node| node.key()) }
    }

    unsafe fn successor_core(mut node: RawNode<K>) -> Option<RawNode<K>> {
        match unsafe { node.right() } {
            // Everything in the right subtree is larger than `node` and smaller
            // than any larger ancestor, so the successor is its minimum.
            Some(right) => unsafe { Some(Self::min_of(right)) },
            None => {
                // Otherwise climb until we leave a left subtree, that parent is
                // the first ancestor larger than `node`.
                let mut node_parent = unsafe { node.parent() };
                while let Some(parent) = node_parent {
                    if unsafe { parent.left() } == Some(node) {
                        break;
                    }
                    node = parent;
                    node_parent = unsafe { node.parent() };
                }

                node_parent
            }
        }
    }

    /// The largest key smaller than `key`, `None` if `key` is not in the tree
    /// or is its minimum.
    pub fn predecessor(&self, key: &K) -> Option<&K> {
        let node = self.find_raw(key)?;
        unsafe { Self::predecessor_core(node).map(|node| node.key()) }
    }

    unsafe fn predecessor_core(mut node: RawNode<K>) -> Option<RawNode<K>> {
        match unsafe { node.left() } {
            Some(left) => unsafe { Some(Self::max_of(left)) },
            None => {
                let mut node_parent = unsafe { node.parent() };
                while let Some(parent) = node_parent {
                    if unsafe { parent.right() } == Some(node) {
                        break;
                    }
                    node = parent;
                    node_parent = unsafe { node.parent() };
                }

                node_parent
            }
        }
    }

    pub(crate) fn rotate_left(&mut self, mut node: RawNode<K>) {
        //    p                       p
        //    |                       |
        // +-node-+               +-right-+
        // |      |      -->      |       |
        // a  +-right-+       +-node-+    c
        //    |       |       |      |
        //    b       c       a      b
        unsafe {
            if let Some(mut right) = node.right() {
                let b = right.left();
                node.set_right(b);
                if let Some(mut b) = b {
                    b.set_parent(Some(node));
                }

                self.replace_subtree(node, Some(right));

                right.set_left(Some(node));
                node.set_parent(Some(right));
            }
        }
    }

    pub(crate) fn rotate_right(&mut self, mut node: RawNode<K>) {
        //         p              p
        //         |              |
        //     +-node-+       +-left-+
        //     |      |       |      |
        // +-left-+   c  -->  a  +-node-+
        // |      |              |      |
        // a      b              b      c
        unsafe {
            if let Some(mut left) = node.left() {
                let b = left.right();
                node.set_left(b);
                if let Some(mut b) = b {
                    b.set_parent(Some(node));
                }

                self.replace_subtree(node, Some(left));

                left.set_right(Some(node));
                node.set_parent(Some(left));
            }
        }
    }

    /// Makes the slot that holds `old` (a child slot of its parent, or the
    /// root) hold `new` instead. `old`'s own links are left untouched.
    unsafe fn replace_subtree(&mut self, old: RawNode<K>, new: Option<RawNode<K>>) {
        unsafe {
            let parent = old.parent();
            match old.pos() {
                NodePos::Root => self.root = new,
                NodePos::Left => {
                    if let Some(mut parent) = parent {
                        parent.set_left(new)
                    }
                }
                NodePos::Right => {
                    if let Some(mut parent) = parent {
                        parent.set_right(new)
                    }
                }
            }

            if let Some(mut new) = new {
                new.set_parent(parent);
            }
        }
    }

    /// Adds `key` to the tree.
    ///
    /// Returns `false` and drops `key` if an equal key is already present, in
    /// which case the tree is not modified.
    pub fn insert(&mut self, key: K) -> bool {
        // Move left/right down the tree until we find an empty slot
        let mut parent = None;
        let mut slot = NodePos::Root;
        let mut maybe_node = self.root;
        while let Some(node) = maybe_node {
            parent = Some(node);
            match self.cmp.compare(&key, unsafe { node.key() }) {
                Ordering::Less => {
                    slot = NodePos::Left;
                    maybe_node = unsafe { node.left() };
                }
                Ordering::Equal => return false,
                Ordering::Greater => {
                    slot = NodePos::Right;
                    maybe_node = unsafe { node.right() };
                }
            }
        }

        let mut new_node = RawNode::from_node(Node::new(key, Color::Red, parent));
        self.len += 1;

        match (parent, slot) {
            (Some(mut parent), NodePos::Left) => unsafe { parent.set_left(Some(new_node)) },
            (Some(mut parent), _) => unsafe { parent.set_right(Some(new_node)) },
            (None, _) => {
                // single node, nothing to fix
                unsafe { new_node.set_color(Color::Black) };
                self.root = Some(new_node);
                return true;
            }
        }

        self.insert_fixup(new_node);
        true
    }

    fn insert_fixup(&mut self, new_node: RawNode<K>) {
        let mut node = new_node;
        unsafe {
            loop {
                match node.parent() {
                    Some(mut parent) if parent.color().is_red() => {
                        debug_assert!(node.color().is_red());
                        // The only violation is the red `node` under the red `parent`.
                        // A red parent is never the root, so the grand parent exists.
                        match parent.pos() {
                            NodePos::Root => unreachable!("red node at the root"),
                            NodePos::Left => {
                                let mut grand_parent = parent.parent().unwrap();
                                let uncle = grand_parent.right();
                                debug_assert!(grand_parent.color().is_black());

                                match uncle {
                                    Some(mut uncle) if uncle.color().is_red() => {
                                        //     +--- gp:b ---+               +--- gp:r ---+
                                        //     |            |               |            |
                                        //  + p:r +      + u:r +   -->   + p:b +      + u:b +
                                        //  |     |                      |     |
                                        // n:r    a                     n:r    a
                                        //
                                        // Black heights are unchanged, but gp may now
                                        // sit under a red parent, so continue from there.
                                        trace!("insert fixup: red uncle, recolor and move up");
                                        parent.set_color(Color::Black);
                                        uncle.set_color(Color::Black);
                                        grand_parent.set_color(Color::Red);
                                        node = grand_parent;
                                    }
                                    _ => {
                                        if let NodePos::Right = node.pos() {
                                            //       +-- gp:b --+                 +-- gp:b --+
                                            //       |          |                 |          |
                                            //  +-- p:r --+    u:b  -->       +- n:r --+    u:b
                                            //  |         |                   |        |
                                            //  a      +- n:r                p:r       c
                                            //
                                            // straighten the zig-zag, then n and p swap roles
                                            trace!("insert fixup: black uncle, zig-zag");
                                            self.rotate_left(parent);
                                            mem::swap(&mut parent, &mut node);
                                        }

                                        //           +-- gp:b --+            +----- p:b -----+
                                        //           |          |            |               |
                                        //      +-- p:r --+    u:b  -->    n:r          +- gp:r -+
                                        //      |         |                             |        |
                                        //     n:r        c                             c       u:b
                                        trace!("insert fixup: black uncle, straight line");
                                        parent.set_color(Color::Black);
                                        grand_parent.set_color(Color::Red);
                                        self.rotate_right(grand_parent);
                                        break;
                                    }
                                }
                            }
                            NodePos::Right => {
                                // mirror of the Left branch, uncle hangs on the left
                                let mut grand_parent = parent.parent().unwrap();
                                let uncle = grand_parent.left();
                                debug_assert!(grand_parent.color().is_black());

                                match uncle {
                                    Some(mut uncle) if uncle.color().is_red() => {
                                        // push the red up to gp and retry from there
                                        trace!("insert fixup: red uncle, recolor and move up");
                                        parent.set_color(Color::Black);
                                        uncle.set_color(Color::Black);
                                        grand_parent.set_color(Color::Red);
                                        node = grand_parent;
                                    }
                                    _ => {
                                        if let NodePos::Left = node.pos() {
                                            // gp -> p -> n bends right-left, straighten it
                                            trace!("insert fixup: black uncle, zig-zag");
                                            self.rotate_right(parent);
                                            mem::swap(&mut parent, &mut node);
                                        }

                                        // right-right line: p becomes the black subtree root
                                        // with n and gp as its red children
                                        trace!("insert fixup: black uncle, straight line");
                                        parent.set_color(Color::Black);
                                        grand_parent.set_color(Color::Red);
                                        self.rotate_left(grand_parent);
                                        break;
                                    }
                                }
                            }
                        }
                    }
                    _ => break,
                }
            }

            if let Some(mut root) = self.root {
                root.set_color(Color::Black);
            }
        }
    }

    /// Removes the key equal to `key`, returns whether there was one.
    pub fn delete(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Removes the key equal to `key` and returns the stored key.
    pub fn take(&mut self, key: &K) -> Option<K> {
        let node = self.find_raw(key)?;
        Some(unsafe { self.delete_core(node) })
    }

    unsafe fn delete_core(&mut self, node: RawNode<K>) -> K {
        //       +---------- 34 ---------+
        //       |                       |
        // +---- 2 ----+                 58 ----+
        // |           |                        |
        // 1      +--- 9 ----+              +-- 77 --+
        //        |          |              |        |
        //     +- 6       +- 20 -+      +- 71 -+     82
        //     |          |      |      |      |
        //     5         12 -+   24    67      75
        //                   |
        //                   13
        //
        // Only nodes without children are ever unlinked. The doomed key is
        // pushed down by swapping it with a substitute until it reaches one:
        //  * two children: swap with the successor, the minimum of the right
        //    subtree, which has no left child (delete 9 -> swap with 12)
        //  * one child: swap with that child, which must be a red leaf
        //    (delete 12 -> swap with 13)
        // Swapping keys keeps every color where it was, so balancing only has
        // to deal with the node that finally gets unlinked.
        let mut to_remove = node;
        unsafe {
            loop {
                match (to_remove.left(), to_remove.right()) {
                    (Some(_), Some(right)) => {
                        let successor = Self::min_of(right);
                        RawNode::swap_keys(to_remove, successor);
                        to_remove = successor;
                    }
                    (Some(child), None) | (None, Some(child)) => {
                        debug_assert!(child.color().is_red());
                        RawNode::swap_keys(to_remove, child);
                        to_remove = child;
                    }
                    (None, None) => break,
                }
            }

            // Unlinking a red leaf cannot change any black height. A black leaf
            // must be compensated for while it still holds its position.
            if to_remove.color().is_black() {
                self.delete_fixup(to_remove);
            }

            debug_assert!(to_remove.left().is_none() && to_remove.right().is_none());
            self.replace_subtree(to_remove, None);
            self.len -= 1;
            let node = *to_remove.into_box();
            node.key
        }
    }

    fn delete_fixup(&mut self, mut x: RawNode<K>) {
        // `x` is black and every path through it is about to lose one black
        // node. The loop moves that deficit up the tree until it can be paid
        // for by a recolor or a rotation.
        //
        // A black non-root node always has a sibling, otherwise the black
        // heights through its parent would already differ.
        unsafe {
            loop {
                let mut x_parent = match x.parent() {
                    Some(parent) => parent,
                    // the root is on every path, losing it changes nothing
                    None => break,
                };

                match x.pos() {
                    NodePos::Root => unreachable!(),
                    NodePos::Left => {
                        let mut x_sibling = x_parent.right().expect("black node without sibling");

                        if x_sibling.color().is_red() {
                            //     +--- p:b ---+                    +--- s:b ---+
                            //     |           |                    |           |
                            //    x:b     +- s:r -+   -->       +- p:r -+      d:b
                            //            |       |             |       |
                            //           c:b     d:b           x:b     c:b
                            //
                            // x keeps its deficit but now has a red parent and
                            // a black sibling, which the cases below handle.
                            trace!("delete fixup: red sibling, rotate toward x");
                            debug_assert!(x_parent.color().is_black());
                            x_sibling.set_color(Color::Black);
                            x_parent.set_color(Color::Red);
                            self.rotate_left(x_parent);
                            x_sibling = x_parent.right().expect("black node without sibling");
                        }

                        let near = x_sibling.left();
                        let far = x_sibling.right();

                        if color_of(near).is_black() && color_of(far).is_black() {
                            //     +--- p:? ---+              +--- p:? ---+
                            //     |           |              |           |
                            //    x:b     +- s:b -+   -->    x:b     +- s:r -+
                            //            |       |                  |       |
                            //           c:b     d:b                c:b     d:b
                            //
                            // Both sides of p are now short by one. A red p
                            // absorbs it by turning black, otherwise p carries
                            // the deficit upwards.
                            trace!("delete fixup: black nephews, recolor sibling");
                            x_sibling.set_color(Color::Red);
                            if x_parent.color().is_red() {
                                x_parent.set_color(Color::Black);
                                break;
                            }
                            x = x_parent;
                            continue;
                        }

                        if color_of(far).is_black() {
                            //    +--- p:? ---+                  +--- p:? ---+
                            //    |           |                  |           |
                            //   x:b     +- s:b -+    -->       x:b     +- c:b -+
                            //           |       |                      |       |
                            //          c:r     d:b                     e    +- s:r -+
                            //          |  |                                 |       |
                            //          e  f                                 f      d:b
                            trace!("delete fixup: red near nephew, rotate sibling");
                            if let Some(mut near) = near {
                                near.set_color(Color::Black);
                            }
                            x_sibling.set_color(Color::Red);
                            self.rotate_right(x_sibling);
                            x_sibling = x_parent.right().expect("black node without sibling");
                        }

                        //     +--- p:c ---+                       +--- s:c ---+
                        //     |           |                       |           |
                        //    x:b     +- s:b -+     -->        +- p:b -+      d:b
                        //            |       |                |       |
                        //            c      d:r              x:b      c
                        //
                        // x gains a black ancestor, d makes up for the one s
                        // took away from its side and the subtree root keeps
                        // p's old color.
                        trace!("delete fixup: red far nephew, rotate parent");
                        x_sibling.set_color(x_parent.color());
                        x_parent.set_color(Color::Black);
                        if let Some(mut far) = x_sibling.right() {
                            far.set_color(Color::Black);
                        }
                        self.rotate_left(x_parent);
                        break;
                    }
                    NodePos::Right => {
                        // mirror of the Left branch
                        let mut x_sibling = x_parent.left().expect("black node without sibling");

                        if x_sibling.color().is_red() {
                            trace!("delete fixup: red sibling, rotate toward x");
                            debug_assert!(x_parent.color().is_black());
                            x_sibling.set_color(Color::Black);
                            x_parent.set_color(Color::Red);
                            self.rotate_right(x_parent);
                            x_sibling = x_parent.left().expect("black node without sibling");
                        }

                        let near = x_sibling.right();
                        let far = x_sibling.left();

                        if color_of(near).is_black() && color_of(far).is_black() {
                            trace!("delete fixup: black nephews, recolor sibling");
                            x_sibling.set_color(Color::Red);
                            if x_parent.color().is_red() {
                                x_parent.set_color(Color::Black);
                                break;
                            }
                            x = x_parent;
                            continue;
                        }

                        if color_of(far).is_black() {
                            trace!("delete fixup: red near nephew, rotate sibling");
                            if let Some(mut near) = near {
                                near.set_color(Color::Black);
                            }
                            x_sibling.set_color(Color::Red);
                            self.rotate_left(x_sibling);
                            x_sibling = x_parent.left().expect("black node without sibling");
                        }

                        trace!("delete fixup: red far nephew, rotate parent");
                        x_sibling.set_color(x_parent.color());
                        x_parent.set_color(Color::Black);
                        if let Some(mut far) = x_sibling.left() {
                            far.set_color(Color::Black);
                        }
                        self.rotate_right(x_parent);
                        break;
                    }
                }
            }
        }
    }
}
