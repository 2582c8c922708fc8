//! Start barrier that launches all workers at the same instant.
//!
//! Workers call [`StartBarrier::register_ready`], which counts them in and
//! parks them. The orchestrator calls [`StartBarrier::wait_until_ready`],
//! which returns once every party has registered, and then
//! [`StartBarrier::release_with`], which takes the begin timestamp and wakes
//! every worker with a single broadcast.
//!
//! ```text
//!   worker 0 ── register_ready ──┐ parked
//!   worker 1 ── register_ready ──┤ parked
//!        ...                     │
//!   worker N ── register_ready ──┤ parked ── last arrival notifies
//!                                ▼
//!   orchestrator ── wait_until_ready ── release_with(stamp) ── broadcast
//!                                                               │
//!                              all workers start incrementing ◄─┘
//! ```
//!
//! The begin timestamp is taken by the orchestrator under the lock,
//! immediately before the broadcast. The last arriving worker notifies the
//! orchestrator; nobody polls the ready count.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct State {
    ready: usize,
    released: bool,
}

/// A one-shot start barrier for a fixed number of worker threads.
///
/// # Examples
///
/// ```rust
/// use htmref::barrier::StartBarrier;
/// use std::thread;
///
/// let barrier = StartBarrier::new(2);
/// thread::scope(|s| {
///     for _ in 0..2 {
///         s.spawn(|| barrier.register_ready());
///     }
///     barrier.wait_until_ready();
///     assert_eq!(barrier.ready(), 2);
///     barrier.release_with(|| ());
/// });
/// assert!(barrier.is_released());
/// ```
#[derive(Debug)]
pub struct StartBarrier {
    parties: usize,
    state: Mutex<State>,
    all_ready: Condvar,
    release: Condvar,
}

impl StartBarrier {
    /// Creates a barrier for `parties` workers.
    pub fn new(parties: usize) -> Self {
        StartBarrier {
            parties,
            state: Mutex::new(State::default()),
            all_ready: Condvar::new(),
            release: Condvar::new(),
        }
    }

    /// Number of workers the barrier waits for.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Number of workers registered so far.
    pub fn ready(&self) -> usize {
        self.lock().ready
    }

    /// Whether the workers have been released.
    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    /// Registers the calling worker and blocks until the orchestrator
    /// releases the barrier.
    ///
    /// Returns immediately if the barrier was already released.
    pub fn register_ready(&self) {
        let mut state = self.lock();
        state.ready += 1;
        if state.ready == self.parties {
            self.all_ready.notify_one();
        }
        while !state.released {
            state = self
                .release
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Blocks the orchestrator until every party has registered.
    pub fn wait_until_ready(&self) {
        let mut state = self.lock();
        while state.ready < self.parties {
            state = self
                .all_ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        tracing::debug!(ready = state.ready, "all workers parked at the start barrier");
    }

    /// Runs `stamp` and then wakes every registered worker.
    ///
    /// `stamp` runs under the barrier lock after all parties are known to be
    /// parked, so nothing it records can be preceded by any worker's first
    /// step past the barrier. Call only after
    /// [`wait_until_ready`](Self::wait_until_ready) has returned.
    pub fn release_with<R>(&self, stamp: impl FnOnce() -> R) -> R {
        let mut state = self.lock();
        debug_assert_eq!(state.ready, self.parties, "released before all workers were ready");
        let stamped = stamp();
        state.released = true;
        self.release.notify_all();
        stamped
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // The state is a counter and a flag; a panic elsewhere cannot leave
        // it half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
