use core::cmp::Ordering;
use core::fmt;

/// Three-way ordering used by [`RedBlackTree`] to place and find keys.
///
/// The ordering must be total and consistent for the lifetime of the tree.
/// Nothing checks that, a comparator that changes its mind produces a tree
/// that is still memory safe but no longer finds what was inserted.
///
/// [`RedBlackTree`]: crate::RedBlackTree
pub struct Comparator<K> {
    inner: Inner<K>,
}

enum Inner<K> {
    Natural(fn(&K, &K) -> Ordering),
    Custom(Box<dyn Fn(&K, &K) -> Ordering + Send + Sync>),
}

impl<K> Comparator<K> {
    /// Wraps an arbitrary comparison function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        Self {
            inner: Inner::Custom(Box::new(f)),
        }
    }

    /// Orders keys by their [`Ord`] implementation.
    pub fn natural() -> Self
    where
        K: Ord,
    {
        Self {
            inner: Inner::Natural(<K as Ord>::cmp),
        }
    }

    /// Returns a comparator with the opposite order.
    pub fn reverse(self) -> Self
    where
        K: 'static,
    {
        Self::new(move |a, b| self.compare(b, a))
    }

    #[inline]
    pub fn compare(&self, a: &K, b: &K) -> Ordering {
        match &self.inner {
            Inner::Natural(f) => f(a, b),
            Inner::Custom(f) => f(a, b),
        }
    }

    pub fn is_natural(&self) -> bool {
        matches!(self.inner, Inner::Natural(_))
    }
}

impl<K> Default for Comparator<K>
where
    K: Ord,
{
    fn default() -> Self {
        Self::natural()
    }
}

impl<K> fmt::Debug for Comparator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.inner {
            Inner::Natural(_) => "natural",
            Inner::Custom(_) => "custom",
        };
        f.debug_tuple("Comparator").field(&kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order() {
        let cmp = Comparator::<i32>::default();
        assert!(cmp.is_natural());
        assert_eq!(cmp.compare(&1, &2), Ordering::Less);
        assert_eq!(cmp.compare(&2, &2), Ordering::Equal);
        assert_eq!(cmp.compare(&3, &2), Ordering::Greater);
    }

    #[test]
    fn custom_and_reverse() {
        let by_len = Comparator::new(|a: &&str, b: &&str| a.len().cmp(&b.len()));
        assert!(!by_len.is_natural());
        assert_eq!(by_len.compare(&"ab", &"xyz"), Ordering::Less);
        assert_eq!(by_len.compare(&"ab", &"xy"), Ordering::Equal);

        let rev = Comparator::<i32>::natural().reverse();
        assert_eq!(rev.compare(&1, &2), Ordering::Greater);
        assert_eq!(rev.compare(&2, &1), Ordering::Less);
        assert_eq!(format!("{rev:?}"), "Comparator(\"custom\")");
    }
}
