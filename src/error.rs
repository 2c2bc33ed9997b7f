use thiserror::Error;

/// Error kinds surfaced by the device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// A negative byte count was requested.
    #[error("invalid read length: {0}")]
    InvalidArgument(i64),

    /// The wait was aborted by a cancellation request addressed to the
    /// blocked task. The caller may restart the operation.
    #[error("wait interrupted by cancellation")]
    Interrupted,

    /// Copy-out to caller-provided storage failed. The buffered record is
    /// already consumed at this point and will not be redelivered.
    #[error("copy-out to caller storage failed: {0}")]
    Fault(#[source] std::io::Error),

    /// The device identifier pair is already mapped to an instance.
    #[error("device {major}:{minor} is already registered")]
    AlreadyRegistered { major: u32, minor: u32 },
}
