//! The negative control: increments with no coordination at all.
//!
//! Each increment is a relaxed load followed by a relaxed store of the
//! loaded value plus one. Both accesses are individually atomic, so there is
//! no undefined behaviour, but the pair is not: two threads that load the
//! same value both store `value + 1`, and one increment is lost.
//!
//! The compiler does not fuse relaxed atomic accesses across loop
//! iterations, so the loop performs one load and one store per increment.

use std::sync::atomic::Ordering;

use crate::cell::CounterCell;

/// Performs `iterations` racy increments.
#[inline]
pub fn run(cell: &CounterCell, iterations: u64) {
    let value = cell.atomic();
    for _ in 0..iterations {
        let current = value.load(Ordering::Relaxed);
        value.store(current.wrapping_add(1), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_single_thread_is_exact() {
        let cell = CounterCell::new();
        run(&cell, 100_000);
        assert_eq!(cell.value(), 100_000);
    }

    #[test]
    fn test_never_exceeds_expected() {
        let cell = CounterCell::new();
        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| run(&cell, 50_000));
            }
        });
        assert!(cell.value() <= 4 * 50_000);
        assert!(cell.value() > 0);
    }
}
