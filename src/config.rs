//! Link and mixer configuration.
//!
//! Every value has a built-in default. A TOML file can override any subset:
//!
//! ```toml
//! [link]
//! port = 8082
//! backoff_ms = 3000
//!
//! [mixer]
//! base_throttle = 55
//! pitch_gain = 0.8
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default ground station port
pub const DEFAULT_PORT: u16 = 8082;

/// Default wait between reconnect attempts (milliseconds)
pub const DEFAULT_BACKOFF_MS: u64 = 3000;

/// Default limit on a single connect attempt (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub link: LinkConfig,
    pub mixer: MixerConfig,
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Ground station websocket port
    pub port: u16,

    /// Fixed wait after a failed or lost connection
    pub backoff_ms: u64,

    /// Upper bound on the websocket handshake
    pub connect_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backoff_ms: DEFAULT_BACKOFF_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl LinkConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Websocket URL of the ground station at `host`.
    pub fn endpoint(&self, host: &str) -> String {
        // Bare IPv6 literals need brackets in a URL authority
        if host.contains(':') && !host.starts_with('[') {
            format!("ws://[{}]:{}", host, self.port)
        } else {
            format!("ws://{}:{}", host, self.port)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("link.port must be non-zero".into()));
        }
        if self.backoff_ms == 0 {
            return Err(Error::Config("link.backoff_ms must be non-zero".into()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(Error::Config(
                "link.connect_timeout_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Mixer tuning constants
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Hover throttle every motor starts from, in percent [0, 100]
    pub base_throttle: u8,

    /// Front/back differential per unit pitch authority
    pub pitch_gain: f64,

    /// Left/right differential per unit roll authority
    pub roll_gain: f64,

    /// Reserved for yaw torque mixing
    pub yaw_gain: f64,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            base_throttle: 55,
            pitch_gain: 0.8,
            roll_gain: 0.8,
            yaw_gain: 0.5,
        }
    }
}

impl MixerConfig {
    pub fn new(base_throttle: u8, pitch_gain: f64, roll_gain: f64, yaw_gain: f64) -> Result<Self> {
        let config = Self {
            base_throttle,
            pitch_gain,
            roll_gain,
            yaw_gain,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_throttle > 100 {
            return Err(Error::Config(format!(
                "mixer.base_throttle must be in [0, 100], got {}",
                self.base_throttle
            )));
        }

        for (name, gain) in [
            ("pitch_gain", self.pitch_gain),
            ("roll_gain", self.roll_gain),
            ("yaw_gain", self.yaw_gain),
        ] {
            if !gain.is_finite() || gain < 0.0 {
                return Err(Error::Config(format!(
                    "mixer.{} must be finite and non-negative, got {}",
                    name, gain
                )));
            }
        }

        Ok(())
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.link.validate()?;
        self.mixer.validate()
    }
}
