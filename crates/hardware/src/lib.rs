//! Peripheral seams for the force game: the analog converter the pressure
//! pads are wired to, the pulse generator driving the bell servo, and the bus
//! that hands both out.
//!
//! Register-level chip protocols live behind [`AnalogSensor`] and
//! [`PulseDriver`]; the game only ever reads a channel or sets a pulse width.

use shared::{
    domain::{AdcChannel, BusAddress, PwmChannel},
    error::ConfigError,
};
use thiserror::Error;

mod servo;
pub mod sim;

pub use servo::{Servo, ServoSettings};

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("bus '{bus}' is not available")]
    UnknownBus { bus: String },
    #[error("failed to open device 0x{address:02x} on bus '{bus}': {reason}")]
    Open {
        bus: String,
        address: u16,
        reason: String,
    },
    #[error("failed to read converter channel {channel}: {reason}")]
    Read { channel: u8, reason: String },
    #[error("failed to write pulse generator channel {channel}: {reason}")]
    Write { channel: u8, reason: String },
    #[error("device 0x{address:02x} is closed")]
    DeviceClosed { address: u16 },
    #[error("channel {channel} is out of range (device has {available})")]
    InvalidChannel { channel: u8, available: u8 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, HardwareError>;

/// Analog-to-digital converter reporting pad pressure.
pub trait AnalogSensor: Send {
    /// Reads one raw conversion. Must not block indefinitely.
    fn read_raw(&mut self, channel: AdcChannel) -> Result<i16>;

    /// Raw value the converter reports at full input voltage.
    fn full_scale(&self) -> i16;

    fn read_normalized(&mut self, channel: AdcChannel) -> Result<f32> {
        let raw = self.read_raw(channel)?;
        Ok((f32::from(raw) / f32::from(self.full_scale())).clamp(0.0, 1.0))
    }
}

/// Pulse generator with independently addressable output channels.
pub trait PulseDriver: Send {
    fn set_frequency(&mut self, hz: f32) -> Result<()>;

    fn set_pulse_width_us(&mut self, channel: PwmChannel, micros: f32) -> Result<()>;

    /// Drives the channel fully off so the attached servo stops holding position.
    fn full_off(&mut self, channel: PwmChannel) -> Result<()>;
}

/// A positional actuator commanded in degrees.
pub trait Actuator: Send {
    /// Moves to `angle_degrees` after safety clamping and returns the angle
    /// actually commanded.
    fn move_to(&mut self, angle_degrees: f32) -> Result<f32>;

    fn turn_off(&mut self) -> Result<()>;
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn move_to(&mut self, angle_degrees: f32) -> Result<f32> {
        (**self).move_to(angle_degrees)
    }

    fn turn_off(&mut self) -> Result<()> {
        (**self).turn_off()
    }
}

impl<S: AnalogSensor + ?Sized> AnalogSensor for Box<S> {
    fn read_raw(&mut self, channel: AdcChannel) -> Result<i16> {
        (**self).read_raw(channel)
    }

    fn full_scale(&self) -> i16 {
        (**self).full_scale()
    }
}

/// Opens and closes the addressed devices on a peripheral bus.
pub trait BusProvider {
    type Converter: AnalogSensor;
    type PulseDriver: PulseDriver;

    fn bus_names(&self) -> Vec<String>;

    fn open_converter(&mut self, bus: &str, address: BusAddress) -> Result<Self::Converter>;

    fn open_pulse_driver(&mut self, bus: &str, address: BusAddress)
        -> Result<Self::PulseDriver>;

    /// Releases a device; later use of its handle fails with
    /// [`HardwareError::DeviceClosed`].
    fn close(&mut self, address: BusAddress) -> Result<()>;
}
