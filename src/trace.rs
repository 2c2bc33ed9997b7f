use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Bounded in-process trace log. Every lifecycle transition and error path
/// writes one entry; old entries fall off the front once the cap is reached.
#[derive(Clone)]
pub struct TraceLog {
    entries: Arc<RwLock<VecDeque<String>>>,
    max_size: usize,
}

impl TraceLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_size))),
            max_size,
        }
    }

    pub fn write(&self, message: String) {
        let mut log = self.entries.write();
        log.push_back(message);
        if log.len() > self.max_size {
            log.pop_front();
        }
    }

    pub fn read_all(&self) -> Vec<String> {
        self.entries.read().iter().cloned().collect()
    }

    /// Most recent `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let log = self.entries.read();
        log.iter().rev().take(n).rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
