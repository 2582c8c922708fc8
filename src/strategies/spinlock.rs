//! Increments serialized by the cell's busy-wait lock.

use std::sync::atomic::Ordering;

use crate::cell::CounterCell;

/// Performs `iterations` increments, taking and releasing the spinlock
/// around each one.
///
/// Inside the critical section the increment is a plain load and store; the
/// lock's acquire/release pair orders it against the previous holder.
#[inline]
pub fn run(cell: &CounterCell, iterations: u64) {
    let value = cell.atomic();
    let lock = cell.lock();
    for _ in 0..iterations {
        let _guard = lock.lock();
        let current = value.load(Ordering::Relaxed);
        value.store(current.wrapping_add(1), Ordering::Relaxed);
    }
}
