use core::fmt;
use core::ptr::{self, NonNull};

/// Color of a tree node.
///
/// Missing children are always considered to be [`Black`].
///
/// [`Black`]: Color::Black
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    pub fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    pub fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) color: Color,
    pub(crate) parent: Option<RawNode<K>>,
    pub(crate) left: Option<RawNode<K>>,
    pub(crate) right: Option<RawNode<K>>,
}

impl<K> Node<K> {
    pub(crate) fn new(key: K, color: Color, parent: Option<RawNode<K>>) -> Self {
        Self {
            key,
            color,
            parent,
            left: None,
            right: None,
        }
    }
}

impl<K> fmt::Debug for Node<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("Node");
        f.field("key", &self.key).field("color", &self.color);

        let mut dbg_opt_node = |name: &str, node: &Option<RawNode<K>>| match node {
            Some(node) => {
                let node = unsafe { node.as_ref() };
                f.field(name, &(&node.key, &node.color));
            }
            None => {
                f.field(name, &None::<K>);
            }
        };
        dbg_opt_node("parent", &self.parent);
        dbg_opt_node("left", &self.left);
        dbg_opt_node("right", &self.right);

        f.finish()
    }
}

/// Wrapper around `NonNull<Node<K>>` so that the balancing algorithms read as
/// plain tree manipulations.
///
/// A `RawNode` is a handle, not an owner. The tree owns every node through the
/// downward `left`/`right` links, `parent` links are never freed through.
#[repr(transparent)]
pub(crate) struct RawNode<K> {
    ptr: NonNull<Node<K>>,
}

impl<K> Clone for RawNode<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for RawNode<K> {}

impl<K> PartialEq for RawNode<K> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.as_ptr(), other.as_ptr())
    }
}

impl<K> Eq for RawNode<K> {}

impl<K> fmt::Debug for RawNode<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawNode").field(&self.ptr).finish()
    }
}

impl<K> RawNode<K> {
    /// Moves `node` to the heap. The allocation is released by [`into_box`].
    ///
    /// [`into_box`]: RawNode::into_box
    pub(crate) fn from_node(node: Node<K>) -> Self {
        Self {
            ptr: NonNull::from(Box::leak(Box::new(node))),
        }
    }

    /// # Safety
    ///
    /// `self` must come from [`RawNode::from_node`], must not have been
    /// released already and must not be used afterwards.
    pub(crate) unsafe fn into_box(self) -> Box<Node<K>> {
        unsafe { Box::from_raw(self.as_ptr()) }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut Node<K> {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) unsafe fn as_ref<'a>(&self) -> &'a Node<K> {
        unsafe { self.ptr.as_ref() }
    }

    #[inline]
    pub(crate) unsafe fn key<'a>(&self) -> &'a K {
        unsafe { &(*self.as_ptr()).key }
    }

    /// Exchanges the keys of two nodes, leaving their links and colors in place.
    #[inline]
    pub(crate) unsafe fn swap_keys(a: RawNode<K>, b: RawNode<K>) {
        if a != b {
            unsafe { ptr::swap(&mut (*a.as_ptr()).key, &mut (*b.as_ptr()).key) }
        }
    }

    #[inline]
    pub(crate) unsafe fn parent(&self) -> Option<RawNode<K>> {
        unsafe { (*self.as_ptr()).parent }
    }

    #[inline]
    pub(crate) unsafe fn set_parent(&mut self, new_parent: Option<RawNode<K>>) {
        unsafe {
            (*self.as_ptr()).parent = new_parent;
        }
    }

    #[inline]
    pub(crate) unsafe fn left(&self) -> Option<RawNode<K>> {
        unsafe { (*self.as_ptr()).left }
    }

    #[inline]
    pub(crate) unsafe fn set_left(&mut self, new_left: Option<RawNode<K>>) {
        unsafe {
            (*self.as_ptr()).left = new_left;
        }
    }

    #[inline]
    pub(crate) unsafe fn right(&self) -> Option<RawNode<K>> {
        unsafe { (*self.as_ptr()).right }
    }

    #[inline]
    pub(crate) unsafe fn set_right(&mut self, new_right: Option<RawNode<K>>) {
        unsafe {
            (*self.as_ptr()).right = new_right;
        }
    }

    #[inline]
    pub(crate) unsafe fn color(&self) -> Color {
        unsafe { (*self.as_ptr()).color }
    }

    #[inline]
    pub(crate) unsafe fn set_color(&mut self, new_color: Color) {
        unsafe { (*self.as_ptr()).color = new_color }
    }

    /// Which child slot of its parent `self` occupies.
    #[inline]
    pub(crate) unsafe fn pos(&self) -> NodePos {
        match unsafe { self.parent() } {
            Some(parent) => {
                if unsafe { parent.left() } == Some(*self) {
                    NodePos::Left
                } else {
                    debug_assert!(
                        unsafe { parent.right() } == Some(*self),
                        "parent link does not match any child slot"
                    );
                    NodePos::Right
                }
            }
            None => NodePos::Root,
        }
    }
}

/// Color of a possibly missing node, missing nodes are black.
#[inline]
pub(crate) unsafe fn color_of<K>(node: Option<RawNode<K>>) -> Color {
    match node {
        Some(node) => unsafe { node.color() },
        None => Color::Black,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodePos {
    Root,
    Left,
    Right,
}
