//! Device registry - maps identifier pairs to device instances
//!
//! Thin collaborator surface: the host environment owns real device-node
//! plumbing, this only keeps a process-local namespace of (major, minor)
//! pairs so a pair cannot be claimed twice.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::device::StatusDevice;
use crate::error::DeviceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    pub major: u32,
    pub minor: u32,
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

pub struct DeviceRegistry {
    entries: Mutex<HashMap<DeviceId, Arc<StatusDevice>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, id: DeviceId, device: Arc<StatusDevice>) -> Result<(), DeviceError> {
        let mut entries = self.entries.lock();
        if entries.contains_key(&id) {
            return Err(DeviceError::AlreadyRegistered {
                major: id.major,
                minor: id.minor,
            });
        }
        entries.insert(id, device);
        Ok(())
    }

    pub fn unregister(&self, id: DeviceId) -> Option<Arc<StatusDevice>> {
        self.entries.lock().remove(&id)
    }

    pub fn lookup(&self, id: DeviceId) -> Option<Arc<StatusDevice>> {
        self.entries.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
