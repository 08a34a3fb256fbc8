use serde::Deserialize;
use shared::{domain::PwmChannel, error::ConfigError};
use tracing::{debug, info};

use crate::{Actuator, PulseDriver, Result};

/// Mechanical limits of a hobby servo and how its pulse maps to an angle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServoSettings {
    pub channel: u8,
    pub frequency_hz: f32,
    pub min_pulse_ms: f32,
    pub max_pulse_ms: f32,
    pub software_min_angle: f32,
    pub software_max_angle: f32,
    pub physical_min_angle: f32,
    pub physical_max_angle: f32,
}

impl Default for ServoSettings {
    fn default() -> Self {
        Self {
            channel: 0,
            frequency_hz: 50.0,
            min_pulse_ms: 0.5,
            max_pulse_ms: 2.5,
            software_min_angle: 0.0,
            software_max_angle: 180.0,
            physical_min_angle: 20.0,
            physical_max_angle: 160.0,
        }
    }
}

impl ServoSettings {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.frequency_hz <= 0.0 {
            return Err(ConfigError::Zero {
                name: "servo frequency",
            });
        }
        ensure_ordered("pulse", self.min_pulse_ms, self.max_pulse_ms)?;
        ensure_ordered(
            "software angle",
            self.software_min_angle,
            self.software_max_angle,
        )?;
        ensure_ordered(
            "physical angle",
            self.physical_min_angle,
            self.physical_max_angle,
        )?;
        self.ensure_within_software_range("physical min angle", self.physical_min_angle)?;
        self.ensure_within_software_range("physical max angle", self.physical_max_angle)
    }

    pub fn ensure_within_software_range(
        &self,
        name: &'static str,
        angle: f32,
    ) -> std::result::Result<(), ConfigError> {
        if angle < self.software_min_angle || angle > self.software_max_angle {
            return Err(ConfigError::OutOfRange {
                name,
                value: angle,
                min: self.software_min_angle,
                max: self.software_max_angle,
            });
        }
        Ok(())
    }

    /// Limits a requested angle to the range the linkage can physically reach.
    pub fn clamp_angle(&self, angle: f32) -> f32 {
        if angle.is_nan() {
            return self.physical_min_angle;
        }
        angle.clamp(self.physical_min_angle, self.physical_max_angle)
    }

    /// Linear map from the software angle range onto the pulse range.
    pub fn pulse_width_ms(&self, angle: f32) -> f32 {
        let range = self.software_max_angle - self.software_min_angle;
        debug_assert!(range > 0.0, "software angle range must be validated");
        let percent_of_range = (angle - self.software_min_angle) / range;
        self.min_pulse_ms + (self.max_pulse_ms - self.min_pulse_ms) * percent_of_range
    }

    pub fn pwm_channel(&self) -> PwmChannel {
        PwmChannel(self.channel)
    }
}

fn ensure_ordered(name: &'static str, min: f32, max: f32) -> std::result::Result<(), ConfigError> {
    if min.is_nan() || max.is_nan() || max <= min {
        return Err(ConfigError::InvalidRange { name, min, max });
    }
    Ok(())
}

/// A servo on one channel of a [`PulseDriver`].
pub struct Servo<P> {
    driver: P,
    settings: ServoSettings,
    angle: Option<f32>,
}

impl<P: PulseDriver> Servo<P> {
    /// Validates the settings and establishes the driver frequency.
    pub fn attach(mut driver: P, settings: ServoSettings) -> Result<Self> {
        settings.validate()?;
        driver.set_frequency(settings.frequency_hz)?;
        info!(
            channel = settings.channel,
            frequency_hz = settings.frequency_hz,
            "servo attached"
        );
        Ok(Self {
            driver,
            settings,
            angle: None,
        })
    }

    /// Last commanded angle, after clamping.
    pub fn angle(&self) -> Option<f32> {
        self.angle
    }
}

impl<P: PulseDriver> Actuator for Servo<P> {
    fn move_to(&mut self, angle_degrees: f32) -> Result<f32> {
        let angle = self.settings.clamp_angle(angle_degrees);
        let pulse_us = self.settings.pulse_width_ms(angle) * 1000.0;
        self.driver
            .set_pulse_width_us(self.settings.pwm_channel(), pulse_us)?;
        debug!(
            requested = angle_degrees,
            angle, pulse_us, "servo moved"
        );
        self.angle = Some(angle);
        Ok(angle)
    }

    fn turn_off(&mut self) -> Result<()> {
        self.driver.full_off(self.settings.pwm_channel())?;
        self.angle = None;
        info!(channel = self.settings.channel, "servo turned off");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/servo_tests.rs"]
mod tests;
