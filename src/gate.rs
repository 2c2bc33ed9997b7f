//! Wait gate and cancellation - how the consumer sleeps and wakes

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, MutexGuard};

use crate::buffer::SharedBuffer;

// ============================================================================
// WAIT GATE - Notification channel between producer and consumers
// ============================================================================

/// Condition-style notification channel. Consumers block on it while holding
/// the buffer mutex (the wait releases the lock and re-acquires it on wake);
/// the producer broadcasts after every firing. No payload crosses the gate,
/// it only means "recheck the buffer".
#[derive(Clone)]
pub struct WaitGate {
    cv: Arc<Condvar>,
}

impl WaitGate {
    pub fn new() -> Self {
        Self {
            cv: Arc::new(Condvar::new()),
        }
    }

    /// Blocks the calling task until the next broadcast. The guard is
    /// released for the duration of the wait and held again on return.
    pub fn wait(&self, guard: &mut MutexGuard<'_, SharedBuffer>) {
        self.cv.wait(guard);
    }

    /// Wakes every blocked consumer.
    pub fn notify_all(&self) {
        self.cv.notify_all();
    }
}

impl Default for WaitGate {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CANCEL TOKEN - Per-task interruption of a blocked wait
// ============================================================================

/// Cancellation handle for one reader task. `cancel` flags the token and
/// broadcasts on the gate so the addressed waiter observes the flag at
/// wake-up; every other waiter treats the broadcast as a spurious wakeup and
/// re-blocks. A token can only interrupt the task that waits with it.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

struct TokenInner {
    cancelled: AtomicBool,
    gate: WaitGate,
}

impl CancelToken {
    pub(crate) fn new(gate: WaitGate) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                gate,
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.gate.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}
