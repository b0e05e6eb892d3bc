//! Application settings — defaults and TOML loading.
//!
//! The config file is read once at startup; the engine never writes settings
//! back (runtime changes live and die with the process).  A missing file
//! yields [`AppConfig::default`], so a fresh install works with zero setup.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::{InputSource, SessionConfig};

use super::AppPaths;

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for the audio session and the initial control state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Target hardware sample rate in Hz.
    pub sample_rate: u32,
    /// Target hardware buffer duration in milliseconds.
    pub buffer_ms: u64,
    /// Amplification applied on start; clamped into `[0.0, 2.0]`.
    pub amplification: f32,
    /// Preferred input device class.
    pub input_source: InputSource,
    /// Route playback to the speaker when nothing else is connected.
    pub default_to_speaker: bool,
    /// Allow Bluetooth devices on input and output.
    pub allow_bluetooth: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            buffer_ms: 5,
            amplification: 1.0,
            input_source: InputSource::Auto,
            default_to_speaker: true,
            allow_bluetooth: true,
        }
    }
}

impl AudioConfig {
    /// The session configuration these settings describe.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            sample_rate: self.sample_rate,
            buffer_duration: Duration::from_millis(self.buffer_ms),
            default_to_speaker: self.default_to_speaker,
            allow_bluetooth: self.allow_bluetooth,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Load from the platform-appropriate `config.toml`.
    ///
    /// A missing file is not an error — defaults are returned so first runs
    /// need no setup step.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().config_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
