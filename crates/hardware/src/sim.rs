//! In-memory bus and devices for running the game without hardware.
//!
//! Handles are cheap clones over shared state, so the side that drives the
//! simulation (a terminal, a test) keeps a handle while the game owns another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::domain::{AdcChannel, BusAddress, PwmChannel};
use tracing::{debug, info};

use crate::{AnalogSensor, BusProvider, HardwareError, PulseDriver, Result};

/// Channels on the simulated converter.
pub const CONVERTER_CHANNELS: u8 = 4;
/// Channels on the simulated pulse generator.
pub const PULSE_CHANNELS: u8 = 16;
/// Full-scale reading of a 12-bit signed converter.
pub const DEFAULT_FULL_SCALE: i16 = 2047;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct ConverterState {
    address: Option<BusAddress>,
    closed: bool,
    full_scale: i16,
    readings: [i16; CONVERTER_CHANNELS as usize],
    failure: Option<String>,
    reads: usize,
}

#[derive(Debug, Clone)]
pub struct SimulatedConverter {
    inner: Arc<Mutex<ConverterState>>,
}

impl Default for SimulatedConverter {
    fn default() -> Self {
        Self::with_full_scale(DEFAULT_FULL_SCALE)
    }
}

impl SimulatedConverter {
    pub fn with_full_scale(full_scale: i16) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ConverterState {
                address: None,
                closed: false,
                full_scale,
                readings: [0; CONVERTER_CHANNELS as usize],
                failure: None,
                reads: 0,
            })),
        }
    }

    pub fn set_reading(&self, channel: AdcChannel, raw: i16) -> Result<()> {
        let index = converter_index(channel)?;
        lock(&self.inner).readings[index] = raw;
        Ok(())
    }

    /// Makes every read fail with `reason` until [`Self::clear_failure`].
    pub fn fail_reads(&self, reason: impl Into<String>) {
        lock(&self.inner).failure = Some(reason.into());
    }

    pub fn clear_failure(&self) {
        lock(&self.inner).failure = None;
    }

    pub fn read_count(&self) -> usize {
        lock(&self.inner).reads
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }
}

fn converter_index(channel: AdcChannel) -> Result<usize> {
    if channel.0 >= CONVERTER_CHANNELS {
        return Err(HardwareError::InvalidChannel {
            channel: channel.0,
            available: CONVERTER_CHANNELS,
        });
    }
    Ok(usize::from(channel.0))
}

impl AnalogSensor for SimulatedConverter {
    fn read_raw(&mut self, channel: AdcChannel) -> Result<i16> {
        let index = converter_index(channel)?;
        let mut state = lock(&self.inner);
        if state.closed {
            return Err(HardwareError::DeviceClosed {
                address: state.address.map_or(0, |address| address.0),
            });
        }
        if let Some(reason) = &state.failure {
            return Err(HardwareError::Read {
                channel: channel.0,
                reason: reason.clone(),
            });
        }
        state.reads += 1;
        Ok(state.readings[index])
    }

    fn full_scale(&self) -> i16 {
        lock(&self.inner).full_scale
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PulseCommand {
    Frequency(f32),
    PulseWidth { channel: PwmChannel, micros: f32 },
    FullOff { channel: PwmChannel },
}

#[derive(Debug, Default)]
struct PulseState {
    address: Option<BusAddress>,
    closed: bool,
    commands: Vec<PulseCommand>,
    failure: Option<String>,
}

/// Pulse generator that records every command it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingPulseDriver {
    inner: Arc<Mutex<PulseState>>,
}

impl RecordingPulseDriver {
    pub fn commands(&self) -> Vec<PulseCommand> {
        lock(&self.inner).commands.clone()
    }

    pub fn pulse_widths(&self, channel: PwmChannel) -> Vec<f32> {
        lock(&self.inner)
            .commands
            .iter()
            .filter_map(|command| match command {
                PulseCommand::PulseWidth { channel: c, micros } if *c == channel => Some(*micros),
                _ => None,
            })
            .collect()
    }

    pub fn fail_writes(&self, reason: impl Into<String>) {
        lock(&self.inner).failure = Some(reason.into());
    }

    pub fn clear_failure(&self) {
        lock(&self.inner).failure = None;
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }

    fn record(&self, channel: u8, command: PulseCommand) -> Result<()> {
        let mut state = lock(&self.inner);
        if state.closed {
            return Err(HardwareError::DeviceClosed {
                address: state.address.map_or(0, |address| address.0),
            });
        }
        if let Some(reason) = &state.failure {
            return Err(HardwareError::Write {
                channel,
                reason: reason.clone(),
            });
        }
        debug!(?command, "pulse driver command");
        state.commands.push(command);
        Ok(())
    }
}

fn pulse_channel(channel: PwmChannel) -> Result<()> {
    if channel.0 >= PULSE_CHANNELS {
        return Err(HardwareError::InvalidChannel {
            channel: channel.0,
            available: PULSE_CHANNELS,
        });
    }
    Ok(())
}

impl PulseDriver for RecordingPulseDriver {
    fn set_frequency(&mut self, hz: f32) -> Result<()> {
        self.record(0, PulseCommand::Frequency(hz))
    }

    fn set_pulse_width_us(&mut self, channel: PwmChannel, micros: f32) -> Result<()> {
        pulse_channel(channel)?;
        self.record(channel.0, PulseCommand::PulseWidth { channel, micros })
    }

    fn full_off(&mut self, channel: PwmChannel) -> Result<()> {
        pulse_channel(channel)?;
        self.record(channel.0, PulseCommand::FullOff { channel })
    }
}

/// A single named bus carrying one converter and one pulse generator.
#[derive(Debug, Clone)]
pub struct SimulatedBus {
    bus_name: String,
    converter: SimulatedConverter,
    pulse_driver: RecordingPulseDriver,
}

impl SimulatedBus {
    pub fn new(bus_name: impl Into<String>) -> Self {
        Self::with_converter(bus_name, SimulatedConverter::default())
    }

    pub fn with_converter(bus_name: impl Into<String>, converter: SimulatedConverter) -> Self {
        Self {
            bus_name: bus_name.into(),
            converter,
            pulse_driver: RecordingPulseDriver::default(),
        }
    }

    /// Handle for steering converter readings from outside the game.
    pub fn converter(&self) -> SimulatedConverter {
        self.converter.clone()
    }

    /// Handle for inspecting what the game sent to the pulse generator.
    pub fn pulse_driver(&self) -> RecordingPulseDriver {
        self.pulse_driver.clone()
    }

    fn ensure_bus(&self, bus: &str) -> Result<()> {
        if bus != self.bus_name {
            return Err(HardwareError::UnknownBus {
                bus: bus.to_string(),
            });
        }
        Ok(())
    }
}

impl BusProvider for SimulatedBus {
    type Converter = SimulatedConverter;
    type PulseDriver = RecordingPulseDriver;

    fn bus_names(&self) -> Vec<String> {
        vec![self.bus_name.clone()]
    }

    fn open_converter(&mut self, bus: &str, address: BusAddress) -> Result<SimulatedConverter> {
        self.ensure_bus(bus)?;
        {
            let mut state = lock(&self.converter.inner);
            state.address = Some(address);
            state.closed = false;
        }
        info!(bus, address = address.0, "opened converter");
        Ok(self.converter.clone())
    }

    fn open_pulse_driver(&mut self, bus: &str, address: BusAddress) -> Result<RecordingPulseDriver> {
        self.ensure_bus(bus)?;
        {
            let mut state = lock(&self.pulse_driver.inner);
            state.address = Some(address);
            state.closed = false;
        }
        info!(bus, address = address.0, "opened pulse driver");
        Ok(self.pulse_driver.clone())
    }

    fn close(&mut self, address: BusAddress) -> Result<()> {
        let mut converter = lock(&self.converter.inner);
        if converter.address == Some(address) && !converter.closed {
            converter.closed = true;
            info!(address = address.0, "closed converter");
            return Ok(());
        }
        drop(converter);

        let mut pulse = lock(&self.pulse_driver.inner);
        if pulse.address == Some(address) && !pulse.closed {
            pulse.closed = true;
            info!(address = address.0, "closed pulse driver");
            return Ok(());
        }

        Err(HardwareError::DeviceClosed { address: address.0 })
    }
}

#[cfg(test)]
#[path = "tests/sim_tests.rs"]
mod tests;
