// Runtime configuration for the device: identifier pair and reporting delay.

use serde::Deserialize;
use std::time::Duration;

use crate::registry::DeviceId;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub major: u32,
    pub minor: u32,
    pub delay_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            major: 60,
            minor: 0,
            delay_secs: 10,
        }
    }
}

impl RuntimeConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn device_id(&self) -> DeviceId {
        DeviceId {
            major: self.major,
            minor: self.minor,
        }
    }
}

/// Loads settings from a TOML file, falling back to defaults when the file
/// is missing or malformed.
pub fn load_config(path: &str) -> RuntimeConfig {
    match std::fs::read_to_string(path) {
        Ok(s) => toml::from_str::<RuntimeConfig>(&s).unwrap_or_default(),
        Err(_) => RuntimeConfig::default(),
    }
}
