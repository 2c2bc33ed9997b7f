//! Shared buffer - the single-slot byte buffer both sides contend for

/// Fixed capacity of the status buffer, in bytes.
pub const CAPACITY: usize = 1024;

/// Fixed-size byte buffer with an "available length" marker.
///
/// `available_len == 0` means no unread data; otherwise the first
/// `available_len` bytes of `data` are the current status record. The buffer
/// carries no locking of its own: the owning device guards every access with
/// its mutex.
pub struct SharedBuffer {
    data: [u8; CAPACITY],
    available_len: usize,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self {
            data: [0u8; CAPACITY],
            available_len: 0,
        }
    }

    /// Overwrites the buffer from offset 0 and publishes the new length.
    /// Oversized input is truncated to capacity, never rejected.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let len = bytes.len().min(CAPACITY);
        self.data[..len].copy_from_slice(&bytes[..len]);
        self.available_len = len;
        len
    }

    /// Destructive read: returns up to `max_len` bytes from the front and
    /// resets the available length to zero. The whole record is consumed
    /// even when the caller asked for fewer bytes than are present.
    pub fn take(&mut self, max_len: usize) -> Vec<u8> {
        let effective = max_len.min(self.available_len);
        let out = self.data[..effective].to_vec();
        self.available_len = 0;
        out
    }

    pub fn has_data(&self) -> bool {
        self.available_len > 0
    }

    pub fn available_len(&self) -> usize {
        self.available_len
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}
