//! GPIO pin acquisition and digital line access
//!
//! Each agent configures exactly one pin at startup: output for light
//! (driven low immediately so the lamp starts off), input for motion.
//! rppal pins restore their original mode on drop, so releasing the
//! hardware on shutdown is the drop of the pin and `Gpio` handle when the
//! control loop returns.

use anyhow::Context;

/// A digital input line sampled by the motion monitor
pub trait InputLine {
    /// Current level: true when the line is high
    fn level(&mut self) -> bool;
}

/// A digital output line driven by the light controller
pub trait OutputLine {
    /// Drive the line high (true) or low (false)
    fn set_level(&mut self, high: bool);
}

impl InputLine for rppal::gpio::InputPin {
    fn level(&mut self) -> bool {
        self.is_high()
    }
}

impl OutputLine for rppal::gpio::OutputPin {
    fn set_level(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Handle to the GPIO subsystem, acquired once at startup
pub struct Gpio {
    inner: rppal::gpio::Gpio,
}

impl Gpio {
    /// Acquire access to the GPIO subsystem
    pub fn open() -> anyhow::Result<Self> {
        let inner = rppal::gpio::Gpio::new().context("failed to open GPIO")?;
        Ok(Self { inner })
    }

    /// Configure a pin as output, driven low
    pub fn output(&self, pin: u8) -> anyhow::Result<rppal::gpio::OutputPin> {
        let pin = self
            .inner
            .get(pin)
            .with_context(|| format!("failed to acquire GPIO pin {pin}"))?;
        Ok(pin.into_output_low())
    }

    /// Configure a pin as input
    pub fn input(&self, pin: u8) -> anyhow::Result<rppal::gpio::InputPin> {
        let pin = self
            .inner
            .get(pin)
            .with_context(|| format!("failed to acquire GPIO pin {pin}"))?;
        Ok(pin.into_input())
    }
}
