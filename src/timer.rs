//! Self-rearming timer - a dedicated thread that fires the producer

use std::sync::Arc;
use std::thread;

use crossbeam::channel::{bounded, RecvTimeoutError, Sender};

use crate::device::DeviceShared;
use crate::producer;

/// Handle to an armed timer. One thread waits out the delay on a stop
/// channel: a timeout is a firing, a message (or a dropped sender) is a
/// cancellation. The rearm is the loop continuing after the callback
/// returns, so firings of the same timer can never overlap.
pub(crate) struct TimerHandle {
    stop_tx: Sender<()>,
    thread: thread::JoinHandle<()>,
}

impl TimerHandle {
    pub(crate) fn arm(shared: Arc<DeviceShared>) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let delay = shared.delay;

        let thread = thread::Builder::new()
            .name("status-producer".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(delay) {
                    Err(RecvTimeoutError::Timeout) => producer::fire(&shared),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .expect("failed to spawn timer thread");

        Self { stop_tx, thread }
    }

    /// Stops the timer and waits for the thread to exit, so no firing can
    /// land after this returns.
    pub(crate) fn cancel(self) {
        let _ = self.stop_tx.send(());
        let _ = self.thread.join();
    }
}
