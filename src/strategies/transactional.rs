//! Increments inside hardware transactions (Intel TSX / RTM).
//!
//! Each iteration opens a restricted transactional memory region with
//! `xbegin`, adds one to the counter with an ordinary (non-locked) `add`, and
//! commits with `xend`. If the transaction aborts for any reason, the CPU
//! rolls back the `add` and resumes at the fallback label, where the
//! increment is redone once with an atomic fetch-and-add. There is no retry
//! loop: one abort means one fallback.
//!
//! RTM is optional hardware. It is detected once per process from CPUID
//! leaf 7 (EBX bit 11). When it is missing, or on any architecture other
//! than x86_64, every iteration takes the fallback path, so the strategy
//! behaves exactly like [`atomic`](super::atomic).

use std::sync::atomic::Ordering;
use std::sync::OnceLock;

use crate::cell::CounterCell;

/// Returns `true` if this CPU executes RTM transactions.
///
/// Microcode that force-aborts every transaction still reports RTM; those
/// machines run the strategy entirely on the fallback path.
pub fn is_supported() -> bool {
    static SUPPORTED: OnceLock<bool> = OnceLock::new();
    *SUPPORTED.get_or_init(|| {
        let supported = detect();
        tracing::info!(supported, "restricted transactional memory detection");
        supported
    })
}

// The cpuid intrinsics are safe functions on newer toolchains and unsafe on
// older ones.
#[cfg(target_arch = "x86_64")]
#[allow(unused_unsafe)]
fn detect() -> bool {
    use std::arch::x86_64::{__cpuid_count, __get_cpuid_max};

    const RTM_BIT: u32 = 1 << 11;

    // SAFETY: `cpuid` is always present on x86_64.
    let (max_leaf, _) = unsafe { __get_cpuid_max(0) };
    if max_leaf < 7 {
        return false;
    }
    // SAFETY: leaf 7 is within the range reported above.
    let features = unsafe { __cpuid_count(7, 0) };
    features.ebx & RTM_BIT != 0
}

#[cfg(not(target_arch = "x86_64"))]
fn detect() -> bool {
    false
}

/// Performs `iterations` increments, each one transactional if possible.
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn run(cell: &CounterCell, iterations: u64) {
    if is_supported() {
        // SAFETY: RTM support was just checked.
        unsafe { run_rtm(cell, iterations) }
    } else {
        run_fallback(cell, iterations)
    }
}

/// Performs `iterations` increments, each one transactional if possible.
#[cfg(not(target_arch = "x86_64"))]
#[inline]
pub fn run(cell: &CounterCell, iterations: u64) {
    run_fallback(cell, iterations)
}

fn run_fallback(cell: &CounterCell, iterations: u64) {
    let value = cell.atomic();
    for _ in 0..iterations {
        value.fetch_add(1, Ordering::Relaxed);
    }
}

/// # Safety
///
/// The CPU must support RTM.
#[cfg(target_arch = "x86_64")]
unsafe fn run_rtm(cell: &CounterCell, iterations: u64) {
    let ptr = cell.as_ptr();
    let value = cell.atomic();
    for _ in 0..iterations {
        // SAFETY: forwarded from the caller; `ptr` points into `cell`.
        if !unsafe { rtm::try_increment(ptr) } {
            value.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(target_arch = "x86_64")]
mod rtm {
    use std::arch::asm;

    /// Value left in `eax` by `xbegin` when the transaction started.
    const XBEGIN_STARTED: u32 = !0;

    /// Adds one to `*ptr` inside a transaction.
    ///
    /// Returns `false` if the transaction aborted, in which case `*ptr` is
    /// left untouched.
    ///
    /// # Safety
    ///
    /// The CPU must support RTM and `ptr` must be valid for reads and writes.
    #[inline(always)]
    pub(super) unsafe fn try_increment(ptr: *mut i64) -> bool {
        let status: u32;
        // On abort the CPU writes the abort code to eax and jumps to `2:`;
        // on commit eax still holds XBEGIN_STARTED.
        unsafe {
            asm!(
                "mov eax, 0xffffffff",
                "xbegin 2f",
                "add qword ptr [{ptr}], 1",
                "xend",
                "2:",
                ptr = in(reg) ptr,
                out("eax") status,
                options(nostack),
            );
        }
        status == XBEGIN_STARTED
    }
}
