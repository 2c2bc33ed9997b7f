//! Periodic producer - one firing publishes a fresh status record

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::device::DeviceShared;

/// Formats the status record for one firing: identity of the worker running
/// the producer, the monotonic tick count, and uptime. Bounded fixed-format
/// text, so formatting never fails; the buffer truncates if it ever had to.
pub fn format_status(tick: u64, uptime: Duration) -> String {
    let thread = std::thread::current();
    let worker = thread.name().unwrap_or("unnamed");
    format!(
        "worker: {}, tick: {}\nuptime_ms: {}\n",
        worker,
        tick,
        uptime.as_millis()
    )
}

/// Runs one producer firing: publish a record under the lock, then wake the
/// consumers. Notification happens strictly after the lock is released so a
/// woken consumer never contends with the producer's own critical section.
pub(crate) fn fire(shared: &DeviceShared) {
    let tick = shared.firing_seq.fetch_add(1, Ordering::AcqRel) + 1;
    let record = format_status(tick, shared.started.elapsed());

    let written;
    {
        let mut buf = shared.buffer.lock();
        written = buf.write(record.as_bytes());
    }
    shared.gate.notify_all();

    shared.metrics.record_firing();
    shared
        .trace
        .write(format!("firing {}: published {} bytes", tick, written));
}
