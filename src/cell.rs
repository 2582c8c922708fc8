//! The shared counter every worker increments.
//!
//! # Layout
//!
//! ```text
//!   ┌──────────────────────────── CounterCell ────────────────────────────┐
//!   │ value: CachePadded<AtomicI64>   one cache line, nothing else on it  │
//!   │ lock:  CachePadded<SpinLock>    one cache line, spinlock strategy   │
//!   └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both fields are wrapped in [`crossbeam_utils::CachePadded`], which aligns
//! and pads them to the target's cache-line size: 64 bytes on most targets,
//! 128 bytes on x86_64 and aarch64, where the hardware prefetches adjacent
//! lines in pairs. Contention measured on the counter is therefore contention
//! on the counter alone, never false sharing with the lock word or with
//! unrelated memory.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicI64, Ordering};

use crossbeam_utils::CachePadded;

use crate::spinlock::SpinLock;

/// A cache-line-isolated 64-bit counter plus the spinlock that may guard it.
///
/// The value is stored in an [`AtomicI64`] so that every strategy, including
/// the deliberately racy one, stays free of undefined behaviour. How the
/// value is updated is entirely up to the [`Strategy`](crate::Strategy).
///
/// # Examples
///
/// ```rust
/// use htmref::cell::CounterCell;
///
/// let cell = CounterCell::new();
/// assert_eq!(cell.value(), 0);
///
/// cell.atomic().fetch_add(3, std::sync::atomic::Ordering::Relaxed);
/// assert_eq!(cell.value(), 3);
/// ```
#[derive(Default)]
pub struct CounterCell {
    value: CachePadded<AtomicI64>,
    lock: CachePadded<SpinLock>,
}

impl CounterCell {
    /// Creates a zeroed cell.
    pub const fn new() -> Self {
        CounterCell {
            value: CachePadded::new(AtomicI64::new(0)),
            lock: CachePadded::new(SpinLock::new()),
        }
    }

    /// Reads the current value.
    ///
    /// Meant to be called once all writers have been joined, at which point
    /// the join has already synchronized their stores with this thread.
    #[inline]
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// The atomic holding the counter.
    #[inline]
    pub fn atomic(&self) -> &AtomicI64 {
        &self.value
    }

    /// The spinlock that guards the counter under the spinlock strategy.
    #[inline]
    pub fn lock(&self) -> &SpinLock {
        &self.lock
    }

    /// Raw address of the counter, for code that updates it from assembly.
    #[inline]
    pub fn as_ptr(&self) -> *mut i64 {
        self.value.as_ptr()
    }
}

impl Debug for CounterCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterCell")
            .field("value", &self.value())
            .field("locked", &self.lock.is_locked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    #[test]
    fn test_new_is_zero() {
        let cell = CounterCell::new();
        assert_eq!(cell.value(), 0);
        assert!(!cell.lock().is_locked());
    }

    #[test]
    fn test_value_sits_alone_on_its_cache_line() {
        let line = align_of::<CachePadded<AtomicI64>>();
        assert!(line >= 64);
        assert_eq!(size_of::<CachePadded<AtomicI64>>(), line);
        assert_eq!(align_of::<CounterCell>(), line);

        let cell = CounterCell::new();
        let value_addr = cell.as_ptr() as usize;
        let lock_addr = cell.lock() as *const SpinLock as usize;
        assert_eq!(value_addr % line, 0);
        assert_eq!(lock_addr % line, 0);
        assert!(value_addr.abs_diff(lock_addr) >= line);
    }

    #[test]
    fn test_as_ptr_aliases_value() {
        let cell = CounterCell::new();
        // SAFETY: no other thread can see `cell`.
        unsafe { *cell.as_ptr() = 7 };
        assert_eq!(cell.value(), 7);
    }

    #[test]
    fn test_debug() {
        let cell = CounterCell::new();
        cell.atomic().store(5, Ordering::Relaxed);
        let debug_str = format!("{:?}", cell);
        assert!(debug_str.contains("value: 5"));
        assert!(debug_str.contains("locked: false"));
    }
}
