use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File};
use game_core::{BellSettings, GameSettings, SensorSettings, TimingSettings};
use hardware::{sim::DEFAULT_FULL_SCALE, ServoSettings};
use serde::Deserialize;
use shared::{domain::BusAddress, error::ConfigError};

pub const DEFAULT_CONFIG_FILE: &str = "forcegame";
pub const ENV_PREFIX: &str = "APP";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    pub name: String,
    pub servo_address: u16,
    pub converter_address: u16,
    pub converter_full_scale: i16,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            name: "I2C1".into(),
            servo_address: 0x40,
            converter_address: 0x48,
            converter_full_scale: DEFAULT_FULL_SCALE,
        }
    }
}

impl BusSettings {
    pub fn servo(&self) -> BusAddress {
        BusAddress(self.servo_address)
    }

    pub fn converter(&self) -> BusAddress {
        BusAddress(self.converter_address)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bus: BusSettings,
    pub servo: ServoSettings,
    pub sensor: SensorSettings,
    pub bell: BellSettings,
    pub timing: TimingSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.servo_address == self.bus.converter_address {
            return Err(ConfigError::DuplicateAddress(self.bus.servo_address));
        }
        if self.bus.converter_full_scale <= 0 {
            return Err(ConfigError::Zero {
                name: "converter_full_scale",
            });
        }
        self.servo.validate()?;
        self.servo
            .ensure_within_software_range("bell rest angle", self.bell.rest_angle)?;
        self.servo
            .ensure_within_software_range("bell strike angle", self.bell.strike_angle)?;
        self.game().validate()
    }

    pub fn game(&self) -> GameSettings {
        GameSettings {
            sensor: self.sensor.clone(),
            bell: self.bell.clone(),
            timing: self.timing.clone(),
        }
    }
}

/// Defaults, then `forcegame.toml` (or `path`), then `APP__SECTION__KEY` variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    build_settings(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn build_settings(path: Option<&Path>, env: Environment) -> anyhow::Result<Settings> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings: Settings = Config::builder()
        .add_source(file)
        .add_source(env)
        .build()
        .context("failed to read configuration")?
        .try_deserialize()
        .context("failed to parse configuration")?;

    settings
        .validate()
        .context("configuration is inconsistent")?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
