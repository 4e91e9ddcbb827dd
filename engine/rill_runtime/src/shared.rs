//! Thread-safe shared mutable cell.
//!
//! Scope binding cells use `SharedCell<T>` so a closure's captured chain
//! observes later mutations, and so values stay `Send + Sync`.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared mutable cell (`Arc<RwLock<T>>` newtype).
///
/// The lock makes cross-thread sharing memory-safe; it does not provide any
/// transaction-level synchronization between script-visible operations.
pub struct SharedCell<T>(Arc<RwLock<T>>);

impl<T> SharedCell<T> {
    /// Create a new cell wrapping the given value.
    pub fn new(value: T) -> Self {
        SharedCell(Arc::new(RwLock::new(value)))
    }

    /// Get read access to the contents.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Get write access to the contents.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Whether two cells are the same allocation.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl<T: Clone> SharedCell<T> {
    /// Clone the current contents out of the cell.
    #[inline]
    pub fn get(&self) -> T {
        self.0.read().clone()
    }

    /// Replace the contents.
    #[inline]
    pub fn set(&self, value: T) {
        *self.0.write() = value;
    }
}

impl<T> Clone for SharedCell<T> {
    #[inline]
    fn clone(&self) -> Self {
        SharedCell(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedCell({:?})", &*self.0.read())
    }
}

impl<T: Default> Default for SharedCell<T> {
    fn default() -> Self {
        SharedCell::new(T::default())
    }
}
