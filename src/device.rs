//! Device state and the blocking read path

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

use crate::buffer::SharedBuffer;
use crate::config::RuntimeConfig;
use crate::error::DeviceError;
use crate::gate::{CancelToken, WaitGate};
use crate::metrics::DeviceMetrics;
use crate::timer::TimerHandle;
use crate::trace::TraceLog;

const TRACE_CAPACITY: usize = 512;

/// State shared between the device front-end, the timer thread, and any
/// number of reader tasks. One mutex guards the buffer bytes and the
/// available length; the sequence counters are read lock-free on the read
/// fast path and bumped under the lock.
pub(crate) struct DeviceShared {
    pub(crate) buffer: Mutex<SharedBuffer>,
    pub(crate) gate: WaitGate,
    /// Monotonic count of producer firings, persists across open/release.
    pub(crate) firing_seq: AtomicU64,
    /// Bumped once per drain; readers snapshot it on entry to detect a
    /// competing consumer winning the race for the same firing.
    pub(crate) drain_seq: AtomicU64,
    pub(crate) started: Instant,
    pub(crate) delay: Duration,
    pub(crate) trace: TraceLog,
    pub(crate) metrics: DeviceMetrics,
}

/// The device instance: one buffer, one lock, one wait gate, one timer slot.
///
/// Long-lived and explicitly owned; the buffer and the tick count persist
/// across open/release cycles of the same instance.
pub struct StatusDevice {
    shared: Arc<DeviceShared>,
    timer: Mutex<Option<TimerHandle>>,
}

impl StatusDevice {
    pub fn new(delay: Duration) -> Self {
        Self {
            shared: Arc::new(DeviceShared {
                buffer: Mutex::new(SharedBuffer::new()),
                gate: WaitGate::new(),
                firing_seq: AtomicU64::new(0),
                drain_seq: AtomicU64::new(0),
                started: Instant::now(),
                delay,
                trace: TraceLog::new(TRACE_CAPACITY),
                metrics: DeviceMetrics::new(),
            }),
            timer: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.delay())
    }

    /// Creates a cancellation token bound to this device's wait gate.
    /// Cancelling it interrupts only the task that waits with it.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken::new(self.shared.gate.clone())
    }

    /// Arms the timer for a first firing after the configured delay. A
    /// reopen while armed cancels the stale timer and arms a fresh one;
    /// waiters carried over from a previous session are flushed through the
    /// gate so none of them sleeps past the re-initialization.
    pub fn on_open(&self) -> Result<(), DeviceError> {
        let mut slot = self.timer.lock();
        if let Some(stale) = slot.take() {
            self.shared.trace.write("open: cancelling stale timer".to_string());
            stale.cancel();
        }
        self.shared.gate.notify_all();
        *slot = Some(TimerHandle::arm(self.shared.clone()));
        self.shared.trace.write(format!(
            "open: timer armed, first firing in {:?}",
            self.shared.delay
        ));
        Ok(())
    }

    /// Cancels the timer; no firing can land after this returns. A consumer
    /// still blocked at release time keeps its ability to be interrupted
    /// through its own token.
    pub fn on_release(&self) {
        if let Some(handle) = self.timer.lock().take() {
            handle.cancel();
            self.shared.trace.write("release: timer cancelled".to_string());
        }
    }

    /// Blocking read. Waits until the producer publishes a record, then
    /// drains the whole buffer and returns at most `want` bytes of it.
    ///
    /// A negative `want` is rejected up front. A read that raced another
    /// consumer for the same firing returns an empty result instead of
    /// re-blocking. `want == 0` still waits for data and still drains the
    /// buffer, returning nothing; that quirk of the original single-slot
    /// semantics is preserved deliberately.
    pub fn read(&self, want: i64, token: &CancelToken) -> Result<Vec<u8>, DeviceError> {
        if want < 0 {
            return Err(DeviceError::InvalidArgument(want));
        }
        let mut buf = match self.lock_when_ready(token)? {
            Some(guard) => guard,
            None => return Ok(Vec::new()),
        };
        let out = buf.take(want as usize);
        self.finish_drain(buf);
        Ok(out)
    }

    /// Copy-out variant of [`read`](Self::read). A sink failure surfaces as
    /// `Fault`, but the record is already consumed by then and is not
    /// redelivered.
    pub fn read_into<W: Write>(
        &self,
        want: i64,
        token: &CancelToken,
        sink: &mut W,
    ) -> Result<usize, DeviceError> {
        if want < 0 {
            return Err(DeviceError::InvalidArgument(want));
        }
        let mut buf = match self.lock_when_ready(token)? {
            Some(guard) => guard,
            None => return Ok(0),
        };
        let out = buf.take(want as usize);
        self.finish_drain(buf);
        if let Err(e) = sink.write_all(&out) {
            self.shared
                .trace
                .write(format!("read: copy-out fault after drain: {}", e));
            return Err(DeviceError::Fault(e));
        }
        Ok(out.len())
    }

    /// Waits until the buffer holds data. `Ok(Some(guard))` hands the locked
    /// buffer to the caller for draining; `Ok(None)` means a competing
    /// consumer drained the firing this call raced with, so the caller
    /// returns an empty read rather than sleeping until the next period.
    fn lock_when_ready(
        &self,
        token: &CancelToken,
    ) -> Result<Option<MutexGuard<'_, SharedBuffer>>, DeviceError> {
        if token.is_cancelled() {
            self.shared
                .trace
                .write("read: cancelled before wait".to_string());
            return Err(DeviceError::Interrupted);
        }

        // Snapshot before acquiring the lock: a drain that happens while we
        // queue for the mutex must count as "raced", not as "keep sleeping".
        let entry_drains = self.shared.drain_seq.load(Ordering::Acquire);
        let mut buf = self.shared.buffer.lock();
        let wait_start = Instant::now();

        while !buf.has_data() {
            if self.shared.drain_seq.load(Ordering::Acquire) != entry_drains {
                self.shared.metrics.incr_raced_read();
                return Ok(None);
            }
            self.shared.gate.wait(&mut buf);
            if token.is_cancelled() {
                drop(buf);
                self.shared.metrics.incr_interrupted();
                self.shared
                    .trace
                    .write("read: wait interrupted".to_string());
                return Err(DeviceError::Interrupted);
            }
            // Loop: a wakeup may be spurious, or a late firing may already
            // have been drained by a competing consumer.
        }

        self.shared.metrics.record_wait(wait_start.elapsed());
        Ok(Some(buf))
    }

    fn finish_drain(&self, guard: MutexGuard<'_, SharedBuffer>) {
        self.shared.drain_seq.fetch_add(1, Ordering::Release);
        drop(guard);
        self.shared.metrics.incr_drain();
    }

    pub fn available_len(&self) -> usize {
        self.shared.buffer.lock().available_len()
    }

    pub fn is_armed(&self) -> bool {
        self.timer.lock().is_some()
    }

    pub fn delay(&self) -> Duration {
        self.shared.delay
    }

    pub fn firings(&self) -> u64 {
        self.shared.firing_seq.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> DeviceMetrics {
        self.shared.metrics.clone()
    }

    pub fn trace(&self) -> TraceLog {
        self.shared.trace.clone()
    }
}

impl Drop for StatusDevice {
    fn drop(&mut self) {
        // A dropped device must not leave its timer thread running.
        if let Some(handle) = self.timer.lock().take() {
            handle.cancel();
        }
    }
}
