//! Relay and indicator outputs.
//!
//! The application layer speaks *logical* levels ("actuator on");
//! electrical polarity is handled here, so an active-low relay board
//! is a config flag instead of inverted logic scattered through the
//! core.  Pins come in through `embedded_hal::digital::OutputPin`, so
//! the same wiring drives `PinDriver` on hardware and [`SimPin`] in
//! tests.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::OutputPort;

/// One output pin plus its polarity.
pub struct PolarityPin<P: OutputPin> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> PolarityPin<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Drive the pin to the electrical level matching logical `on`.
    fn drive(&mut self, on: bool, label: &str) {
        let high = on != self.active_low;
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            warn!("outputs: failed to drive {label} pin");
        }
    }
}

/// The device's two outputs behind the [`OutputPort`] seam.
pub struct RelayOutputs<A: OutputPin, I: OutputPin> {
    actuator: PolarityPin<A>,
    indicator: PolarityPin<I>,
}

impl<A: OutputPin, I: OutputPin> RelayOutputs<A, I> {
    pub fn new(actuator: PolarityPin<A>, indicator: PolarityPin<I>) -> Self {
        Self {
            actuator,
            indicator,
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl RelayOutputs<SimPin, SimPin> {
    /// Electrical levels of (actuator, indicator), true = high.
    pub fn levels(&self) -> (bool, bool) {
        (self.actuator.pin.level(), self.indicator.pin.level())
    }
}

impl<A: OutputPin, I: OutputPin> OutputPort for RelayOutputs<A, I> {
    fn set_actuator(&mut self, on: bool) {
        self.actuator.drive(on, "actuator");
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator.drive(on, "indicator");
    }
}

// ─── host pin ──────────────────────────────────────────────────────

/// Infallible in-memory pin recording its electrical level.
#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
pub struct SimPin {
    high: bool,
}

#[cfg(not(target_os = "espidf"))]
impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current electrical level (true = high).
    pub fn level(&self) -> bool {
        self.high
    }
}

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

#[cfg(not(target_os = "espidf"))]
impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}
