//! Controller configuration.
//!
//! Loaded once at startup from a JSON file (camelCase keys). Every section
//! is optional and falls back to the defaults below.
//!
//! ```json
//! {
//!   "controlSettings": { "movingDurationMS": 100000, "coolDownDurationMS": 50000 },
//!   "controls": {
//!     "head":      { "upPin": 0, "downPin": 1 },
//!     "knee":      { "upPin": 2, "downPin": 3 },
//!     "elevation": { "upPin": 4, "downPin": 5 }
//!   },
//!   "gpio": { "enabled": true, "activeLow": true },
//!   "inputSettings": { "utteranceSource": "/run/sandman/utterances" },
//!   "soundSettings": { "clipDirectory": "/usr/share/sandman/audio", "player": "aplay" }
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::actuator::Timing;
use crate::command::Channel;
use crate::error::ConfigError;
use crate::pins;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sandman/sandman.conf";

/// Core controller configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SandmanConfig {
    pub control_settings: ControlSettings,
    pub controls: ChannelPins,
    pub gpio: GpioSettings,
    pub input_settings: InputSettings,
    pub sound_settings: SoundSettings,
}

/// Timing shared by every actuator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlSettings {
    /// Maximum travel time per movement (milliseconds).
    #[serde(rename = "movingDurationMS")]
    pub moving_duration_ms: u32,
    /// Idle time enforced after each movement (milliseconds).
    #[serde(rename = "coolDownDurationMS")]
    pub cool_down_duration_ms: u32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            moving_duration_ms: 100_000, // 100 s
            cool_down_duration_ms: 50_000, // 50 s
        }
    }
}

/// Extend/retract pin pair for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinPair {
    pub up_pin: u32,
    pub down_pin: u32,
}

/// Pin wiring for every channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPins {
    pub head: PinPair,
    pub knee: PinPair,
    pub elevation: PinPair,
}

impl Default for ChannelPins {
    fn default() -> Self {
        Self {
            head: PinPair {
                up_pin: pins::HEAD_UP_GPIO,
                down_pin: pins::HEAD_DOWN_GPIO,
            },
            knee: PinPair {
                up_pin: pins::KNEE_UP_GPIO,
                down_pin: pins::KNEE_DOWN_GPIO,
            },
            elevation: PinPair {
                up_pin: pins::ELEVATION_UP_GPIO,
                down_pin: pins::ELEVATION_DOWN_GPIO,
            },
        }
    }
}

impl ChannelPins {
    pub fn get(&self, channel: Channel) -> PinPair {
        match channel {
            Channel::Head => self.head,
            Channel::Knee => self.knee,
            Channel::Elevation => self.elevation,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GpioSettings {
    /// Drive real pins. When false, pin writes are only logged.
    pub enabled: bool,
    /// The relay board switches on with a low level.
    pub active_low: bool,
}

impl Default for GpioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            active_low: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputSettings {
    /// File or FIFO delivering one recognized utterance per line.
    pub utterance_source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundSettings {
    /// Directory holding `<clip>.wav` notification files.
    pub clip_directory: PathBuf,
    /// External player invoked as `<player> <file>`. Clips are only logged
    /// when unset.
    pub player: Option<String>,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            clip_directory: PathBuf::from("/usr/share/sandman/audio"),
            player: None,
        }
    }
}

impl SandmanConfig {
    /// Read, parse, and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound,
            kind => ConfigError::Unreadable(kind),
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate config JSON.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::Malformed {
            line: e.line(),
            column: e.column(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the controller unsafe or ambiguous.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_settings.moving_duration_ms == 0 {
            return Err(ConfigError::ValidationFailed("movingDurationMS must be > 0"));
        }
        if self.control_settings.cool_down_duration_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "coolDownDurationMS must be > 0",
            ));
        }

        let mut used: heapless::Vec<u32, { Channel::COUNT * 2 }> = heapless::Vec::new();
        for channel in Channel::ALL {
            let pair = self.controls.get(channel);
            for pin in [pair.up_pin, pair.down_pin] {
                if used.contains(&pin) {
                    return Err(ConfigError::ValidationFailed(
                        "each GPIO pin may drive only one output",
                    ));
                }
                let _ = used.push(pin);
            }
        }
        Ok(())
    }

    /// Actuator timing derived from the control settings.
    pub fn timing(&self) -> Timing {
        Timing::from_millis(
            self.control_settings.moving_duration_ms,
            self.control_settings.cool_down_duration_ms,
        )
    }
}
