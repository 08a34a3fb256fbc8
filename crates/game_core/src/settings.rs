use std::time::Duration;

use serde::Deserialize;
use shared::{domain::AdcChannel, error::ConfigError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    pub red_channel: u8,
    pub green_channel: u8,
    /// Raw reading that counts as a full-strength press.
    pub max_raw: i16,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            red_channel: 0,
            green_channel: 1,
            max_raw: 1354,
        }
    }
}

impl SensorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_raw <= 0 {
            return Err(ConfigError::Zero { name: "max_raw" });
        }
        if self.red_channel == self.green_channel {
            return Err(ConfigError::DuplicateChannel(self.red_channel));
        }
        Ok(())
    }

    pub fn red(&self) -> AdcChannel {
        AdcChannel(self.red_channel)
    }

    pub fn green(&self) -> AdcChannel {
        AdcChannel(self.green_channel)
    }
}

/// Logical positions of the bell striker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BellSettings {
    pub rest_angle: f32,
    pub strike_angle: f32,
}

impl Default for BellSettings {
    fn default() -> Self {
        Self {
            rest_angle: 30.0,
            strike_angle: 160.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub tick_interval_ms: u64,
    pub countdown_step_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            countdown_step_ms: 1000,
        }
    }
}

impl TimingSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Zero {
                name: "tick_interval_ms",
            });
        }
        if self.countdown_step_ms == 0 {
            return Err(ConfigError::Zero {
                name: "countdown_step_ms",
            });
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn countdown_step(&self) -> Duration {
        Duration::from_millis(self.countdown_step_ms)
    }
}

/// Everything the controller needs besides its devices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSettings {
    pub sensor: SensorSettings,
    pub bell: BellSettings,
    pub timing: TimingSettings,
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sensor.validate()?;
        self.timing.validate()
    }
}
