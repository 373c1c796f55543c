//! Busy flags with scoped release.
//!
//! A [`BusyFlag`] is acquired by compare-exchange, so only one caller per
//! category can hold it even on a multi-threaded runtime. The returned
//! [`BusyGuard`] clears the flag when dropped: on success, on failure, on
//! panic, and when the owning future is dropped mid-flight.

use std::sync::atomic::{AtomicBool, Ordering};

/// Boolean gate for one operation category.
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: AtomicBool,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag if it is down.
    ///
    /// Returns `None` when the flag is already raised; the caller must not
    /// issue its request in that case.
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard { busy: &self.busy })
    }

    pub fn is_set(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

/// Holds a [`BusyFlag`] raised until dropped.
#[derive(Debug)]
#[must_use = "dropping the guard immediately releases the flag"]
pub struct BusyGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}
