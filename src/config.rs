//! Configuration of the capture hardware and of the measurement cycle.

use core::num::NonZeroU32;

use crate::distance::{round_trip_us, Distance, TickPeriod};

/// The minimum trigger pulse the HC-SR04 reacts to.
pub const MIN_TRIGGER_PULSE_US: u32 = 10;

/// Time between the end of the trigger pulse and the rising edge of the echo:
/// the sensor first sends its 8 cycle 40 kHz burst.
pub const SENSOR_START_DELAY_US: u32 = 200;

const DEFAULT_CLOCK_HZ: NonZeroU32 = match NonZeroU32::new(16_000_000) {
    Some(hz) => hz,
    None => panic!("clock frequency must not be zero"),
};

/// Which signal transition fires the capture callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

/// Prescaler between the core clock and the capture counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockDivisor {
    Div1,
    Div8,
    Div64,
    Div256,
    Div1024,
}

impl ClockDivisor {
    pub const fn value(self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div8 => 8,
            Self::Div64 => 64,
            Self::Div256 => 256,
            Self::Div1024 => 1024,
        }
    }
}

/// Configuration of the timing capture unit. Fixed after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureConfig {
    /// Frequency of the clock feeding the prescaler.
    pub clock_hz: NonZeroU32,
    pub divisor: ClockDivisor,
    /// Edge armed when the unit is configured.
    pub initial_edge: Edge,
}

impl CaptureConfig {
    /// Duration of one counter tick.
    pub fn tick_period(&self) -> TickPeriod {
        TickPeriod::new(self.clock_hz, self.divisor)
    }
}

impl Default for CaptureConfig {
    /// 16 MHz core clock divided by 8: one tick every 0.5 µs, 117.6 ticks per cm.
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            divisor: ClockDivisor::Div8,
            initial_edge: Edge::Rising,
        }
    }
}

/// Timing of a single measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// How long the trigger line is held high.
    pub trigger_pulse_us: u32,
    /// Upper bound on the wait for a completed echo, counted from the trigger.
    /// Must cover the echo of a target at `max_range_cm`.
    pub echo_timeout_us: u32,
    /// Pause between two looks at the latch while waiting.
    pub poll_interval_us: u32,
    /// Farthest distance reported as a valid reading.
    pub max_range_cm: u16,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            trigger_pulse_us: 15,
            echo_timeout_us: 60_000,
            poll_interval_us: 10,
            max_range_cm: 400,
        }
    }
}

impl SensorConfig {
    /// Check the values for consistency. Called once by [`crate::init`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger_pulse_us < MIN_TRIGGER_PULSE_US {
            return Err(ConfigError::TriggerPulseTooShort);
        }
        if self.echo_timeout_us == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.poll_interval_us == 0 || self.poll_interval_us > self.echo_timeout_us {
            return Err(ConfigError::PollInterval);
        }
        if self.max_range_cm == 0 || self.max_range_cm >= Distance::OUT_OF_RANGE.centimeters() {
            return Err(ConfigError::MaxRange);
        }
        if self.echo_timeout_us < SENSOR_START_DELAY_US + round_trip_us(self.max_range_cm) {
            return Err(ConfigError::TimeoutShorterThanRange);
        }
        Ok(())
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The trigger pulse is shorter than [`MIN_TRIGGER_PULSE_US`].
    TriggerPulseTooShort,
    ZeroTimeout,
    /// The poll interval is zero or longer than the echo timeout.
    PollInterval,
    /// The maximum range is zero or collides with the sentinel values.
    MaxRange,
    /// The echo timeout expires before the echo of a target at the maximum
    /// range has ended.
    TimeoutShorterThanRange,
}
