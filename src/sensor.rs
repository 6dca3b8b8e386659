//! Measurement orchestration: trigger, wait for the echo, convert.

use embedded_hal::{delay::DelayNs, digital::OutputPin};
use embedded_hal_async::delay::DelayNs as DelayNsAsync;
use futures::{select_biased, FutureExt};

use crate::capture::{CaptureDriver, CaptureUnit};
use crate::config::{CaptureConfig, SensorConfig};
use crate::distance::{compute_distance, Distance, TickPeriod};
use crate::echo::{EchoLatch, EchoStateMachine, Sample};
use crate::error::Error;
use crate::trigger::TriggerPulse;

/// Set up a sensor.
///
/// Validates `config`, drives the trigger pin low, arms `unit` for the first
/// rising edge and registers the echo state machine as its edge handler.
///
/// Returns the capture driver, which the capture interrupt must call
/// [`CaptureDriver::on_interrupt`] on, and the [`Ultrasonic`] handle for the
/// measurement loop. Both share `latch`.
#[allow(clippy::type_complexity)]
pub fn init<'a, U, TRIG, DELAY>(
    unit: U,
    trigger: TRIG,
    delay: DELAY,
    capture: CaptureConfig,
    config: SensorConfig,
    latch: &'a EchoLatch,
) -> Result<(CaptureDriver<U, EchoStateMachine<'a>>, Ultrasonic<'a, TRIG, DELAY>), Error<TRIG::Error>>
where
    U: CaptureUnit,
    TRIG: OutputPin,
{
    config.validate()?;
    let trigger = TriggerPulse::new(trigger, config.trigger_pulse_us).map_err(Error::Trigger)?;

    let mut driver = CaptureDriver::new(unit);
    driver.configure(&capture);
    driver.register_callback(EchoStateMachine::new(latch));

    let period = capture.tick_period();
    debug!(
        "ultrasonic ready: {} ns/tick, timeout {} us, max {} cm",
        period.nanos(),
        config.echo_timeout_us,
        config.max_range_cm
    );

    let sensor = Ultrasonic {
        trigger,
        delay,
        latch,
        period,
        config,
    };
    Ok((driver, sensor))
}

/// The measurement side of the sensor, used from the main loop.
pub struct Ultrasonic<'a, TRIG, DELAY> {
    trigger: TriggerPulse<TRIG>,
    delay: DELAY,
    latch: &'a EchoLatch,
    period: TickPeriod,
    config: SensorConfig,
}

impl<TRIG, DELAY> Ultrasonic<'_, TRIG, DELAY>
where
    TRIG: OutputPin,
{
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn tick_period(&self) -> TickPeriod {
        self.period
    }

    /// Turn a freshly latched sample into a distance, rejecting wrapped and
    /// too long intervals. A wrapped counter is only known from the unit's
    /// overflow flag; its value alone can look like a close target.
    fn evaluate(&self, sample: Sample) -> Result<Distance, Error<TRIG::Error>> {
        if sample.overflowed {
            warn!("echo overflowed the capture counter");
            return Err(Error::Overflow);
        }
        let cm = compute_distance(sample.interval, self.period);
        if cm > self.config.max_range_cm as u32 {
            warn!("echo of {} ticks is out of range ({} cm)", sample.interval, cm);
            return Err(Error::OutOfRange(cm));
        }
        trace!("echo of {} ticks: {} cm", sample.interval, cm);
        Ok(Distance::from_centimeters(cm as u16))
    }

    /// Give back the trigger pin and the delay.
    pub fn free(self) -> (TRIG, DELAY) {
        (self.trigger.free(), self.delay)
    }
}

impl<TRIG, DELAY> Ultrasonic<'_, TRIG, DELAY>
where
    TRIG: OutputPin,
    DELAY: DelayNs,
{
    /// Take one measurement.
    ///
    /// Fires the trigger, then polls the latch every `poll_interval_us` until
    /// the echo state machine has completed a rising/falling pair or
    /// `echo_timeout_us` has passed. A pulse whose rising edge came before the
    /// trigger is left over from an earlier cycle and is not accepted.
    pub fn measure(&mut self) -> Result<Distance, Error<TRIG::Error>> {
        let since = self.latch.mark();
        self.trigger
            .fire(&mut self.delay)
            .map_err(Error::Trigger)?;

        let mut waited_us: u32 = 0;
        let sample = loop {
            if let Some(sample) = self.latch.fresh_since(since) {
                break sample;
            }
            if waited_us >= self.config.echo_timeout_us {
                warn!("no echo within {} us", self.config.echo_timeout_us);
                return Err(Error::NoEcho);
            }
            DelayNs::delay_us(&mut self.delay, self.config.poll_interval_us);
            waited_us = waited_us.saturating_add(self.config.poll_interval_us);
        };
        self.evaluate(sample)
    }

    /// Take one measurement, reporting failures as sentinel distances.
    ///
    /// Returns [`Distance::NO_ECHO`] if nothing came back in time and
    /// [`Distance::OUT_OF_RANGE`] for echoes too long to measure. Safe to call
    /// back to back from a poll loop.
    pub fn read_distance(&mut self) -> Distance {
        self.measure().unwrap_or_else(|e| e.sentinel())
    }
}

impl<TRIG, DELAY> Ultrasonic<'_, TRIG, DELAY>
where
    TRIG: OutputPin,
    DELAY: DelayNs + DelayNsAsync,
{
    /// Take one measurement without busy-waiting for the echo.
    ///
    /// The trigger pulse itself blocks unless the `blocking_trigger` feature is
    /// disabled.
    pub async fn measure_async(&mut self) -> Result<Distance, Error<TRIG::Error>> {
        let since = self.latch.mark();

        #[cfg(feature = "blocking_trigger")]
        self.trigger
            .fire(&mut self.delay)
            .map_err(Error::Trigger)?;
        #[cfg(not(feature = "blocking_trigger"))]
        self.trigger
            .fire_async(&mut self.delay)
            .await
            .map_err(Error::Trigger)?;

        let sample = select_biased! {
            sample = self.latch.wait_since(since).fuse() => sample,
            _ = DelayNsAsync::delay_us(&mut self.delay, self.config.echo_timeout_us).fuse() => {
                warn!("no echo within {} us", self.config.echo_timeout_us);
                return Err(Error::NoEcho);
            }
        };
        self.evaluate(sample)
    }

    /// Async counterpart of [`read_distance`](Self::read_distance).
    pub async fn read_distance_async(&mut self) -> Distance {
        self.measure_async().await.unwrap_or_else(|e| e.sentinel())
    }
}
