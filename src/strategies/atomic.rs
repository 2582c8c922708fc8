//! Hardware fetch-and-add.

use std::sync::atomic::Ordering;

use crate::cell::CounterCell;

/// Performs `iterations` atomic increments.
///
/// `Relaxed` is enough: every increment is indivisible on its own, and the
/// final read happens after the workers are joined.
#[inline]
pub fn run(cell: &CounterCell, iterations: u64) {
    let value = cell.atomic();
    for _ in 0..iterations {
        value.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_increments_are_exact() {
        let cell = CounterCell::new();
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| run(&cell, 25_000));
            }
        });
        assert_eq!(cell.value(), 8 * 25_000);
    }
}
