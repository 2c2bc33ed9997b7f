pub mod buffer;
pub mod config;
pub mod device;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod producer;
pub mod registry;
pub mod timer;
pub mod trace;

pub use buffer::{SharedBuffer, CAPACITY};
pub use config::{load_config, RuntimeConfig};
pub use device::StatusDevice;
pub use error::DeviceError;
pub use gate::{CancelToken, WaitGate};
pub use metrics::{DeviceMetrics, MetricsReport};
pub use registry::{DeviceId, DeviceRegistry};
pub use trace::TraceLog;
