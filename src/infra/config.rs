//! Agent configuration loaded from a JSON file
//!
//! The config file lives in the working directory (`config.json`); there
//! are no command line flags. Field names are PascalCase on the wire.
//! Missing fields resolve to zero/empty rather than erroring - validation
//! of required values happens at agent startup.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default config file path, relative to the working directory
pub const DEFAULT_PATH: &str = "config.json";

/// Configuration shared by both agents
///
/// `duration` is only meaningful for the light agent and must be nonzero
/// there; the motion agent ignores it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Config {
    /// Pulse hold time in seconds (light agent only)
    pub duration: u64,
    /// BCM GPIO pin number
    pub pin: u8,
    /// Broker address, e.g. "tcp://localhost:1883" or "localhost:1883"
    pub broker: String,
    /// MQTT topic to subscribe (light) or publish (motion)
    pub topic: String,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Validate the fields the light agent requires
    ///
    /// The light agent calls this right after loading, before any GPIO or
    /// broker work, so a zero hold time never touches the hardware.
    pub fn validate_light(&self) -> anyhow::Result<()> {
        if self.duration == 0 {
            bail!("duration cannot be zero");
        }
        Ok(())
    }
}
