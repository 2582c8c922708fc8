//! Busy-wait mutual exclusion used by the spinlock strategy.
//!
//! [`SpinLock`] never parks the calling thread. A waiter re-reads the lock
//! word with a relaxed load until it looks free and only then retries the
//! acquiring swap (test-and-test-and-set), pausing with
//! [`crossbeam_utils::Backoff::spin`] between reads. `Backoff::spin` only
//! issues CPU pause hints and never yields to the scheduler, so the lock
//! keeps the cost profile of a spinning lock under heavy contention.
//!
//! The lock guards no data of its own: the counter it protects lives in a
//! separate cache line (see [`crate::cell::CounterCell`]).
//!
//! # Example
//!
//! ```rust
//! use htmref::spinlock::SpinLock;
//!
//! let lock = SpinLock::new();
//! {
//!     let _guard = lock.lock();
//!     assert!(lock.is_locked());
//! }
//! assert!(!lock.is_locked());
//! ```

use std::sync::atomic::{
    AtomicBool,
    Ordering::{Acquire, Relaxed, Release},
};

use crossbeam_utils::Backoff;

/// A test-and-test-and-set spinlock.
///
/// Not fair and not reentrant. Locking twice from the same thread spins
/// forever.
#[derive(Debug, Default)]
pub struct SpinLock {
    locked: AtomicBool,
}

/// Releases the [`SpinLock`] when dropped.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl Drop for SpinGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.lock.locked.store(false, Release);
    }
}

impl SpinLock {
    /// Creates an unlocked spinlock.
    pub const fn new() -> Self {
        SpinLock {
            locked: AtomicBool::new(false),
        }
    }

    /// Acquires the lock, spinning until it becomes available.
    #[inline]
    pub fn lock(&self) -> SpinGuard<'_> {
        let backoff = Backoff::new();
        while self.locked.swap(true, Acquire) {
            while self.locked.load(Relaxed) {
                backoff.spin();
            }
        }
        SpinGuard { lock: self }
    }

    /// Acquires the lock only if it is free right now.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinGuard<'_>> {
        if self.locked.swap(true, Acquire) {
            None
        } else {
            Some(SpinGuard { lock: self })
        }
    }

    /// Checks whether the lock is currently held.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Relaxed)
    }

    /// Runs `f` while holding the lock.
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.lock();
        f()
    }
}
