//! Trigger pulse generator.

use embedded_hal::{delay::DelayNs, digital::OutputPin};

/// Drives the sensor's trigger line. One pulse starts one measurement cycle.
///
/// Firing again before the echo of the previous pulse has completed makes the
/// sensor's edges overlap and costs one cycle of garbage. Nothing here guards
/// against that; [`crate::Ultrasonic`] only fires after a cycle has completed or
/// timed out.
pub struct TriggerPulse<PIN> {
    pin: PIN,
    pulse_us: u32,
}

impl<PIN: OutputPin> TriggerPulse<PIN> {
    /// Take the trigger pin and drive it low, so every pulse starts from a known
    /// level.
    pub fn new(mut pin: PIN, pulse_us: u32) -> Result<Self, PIN::Error> {
        pin.set_low()?;
        Ok(Self { pin, pulse_us })
    }

    pub fn pulse_us(&self) -> u32 {
        self.pulse_us
    }

    /// High for the configured pulse length, then low again. Blocking.
    pub fn fire<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PIN::Error> {
        self.pin.set_high()?;
        delay.delay_us(self.pulse_us);
        self.pin.set_low()
    }

    /// Like [`fire`](Self::fire), but yields to the executor during the pulse.
    ///
    /// Async delays add a few microseconds of scheduling jitter, which is why
    /// the `blocking_trigger` feature keeps the pulse on the blocking path.
    #[cfg(not(feature = "blocking_trigger"))]
    pub async fn fire_async<D: embedded_hal_async::delay::DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), PIN::Error> {
        self.pin.set_high()?;
        delay.delay_us(self.pulse_us).await;
        self.pin.set_low()
    }

    /// Give back the trigger pin.
    pub fn free(self) -> PIN {
        self.pin
    }
}
