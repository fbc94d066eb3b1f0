//! Arc wrapper with a factory-only constructor.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A reference-counted heap allocation.
///
/// The constructor is `pub(crate)`, so heap values can only be created
/// through the factory methods on [`crate::value::Value`] and its
/// composites. All heap types share ownership via `Arc`, which is what
/// makes a produced callable reusable across concurrent invocations.
pub struct Heap<T>(Arc<T>);

impl<T> Heap<T> {
    /// Allocate a new heap value.
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }

    /// Reference identity of two heap values.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
