//! Conversion of captured tick counts into centimeters.

use core::fmt;
use core::num::NonZeroU32;

use crate::config::ClockDivisor;

/// Round-trip travel time of sound per centimeter of distance, in tenths of a
/// microsecond (58.8 µs/cm at 343 m/s).
const ROUND_TRIP_US_PER_CM_X10: u64 = 588;

/// Duration of one capture counter tick, kept as the exact ratio
/// `divisor / clock_hz` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickPeriod {
    clock_hz: NonZeroU32,
    divisor: u32,
}

impl TickPeriod {
    pub fn new(clock_hz: NonZeroU32, divisor: ClockDivisor) -> Self {
        Self {
            clock_hz,
            divisor: divisor.value(),
        }
    }

    /// Length of one tick in whole nanoseconds, truncated.
    pub fn nanos(&self) -> u64 {
        self.divisor as u64 * 1_000_000_000 / self.clock_hz.get() as u64
    }

    /// Length of `ticks` counter ticks in whole microseconds, truncated.
    pub fn micros(&self, ticks: u16) -> u64 {
        ticks as u64 * self.divisor as u64 * 1_000_000 / self.clock_hz.get() as u64
    }
}

/// Echo width of a target `cm` away, in whole microseconds, rounded up.
pub fn round_trip_us(cm: u16) -> u32 {
    (cm as u32 * ROUND_TRIP_US_PER_CM_X10 as u32).div_ceil(10)
}

/// Convert a captured echo width into centimeters, truncating.
///
/// `distance = ticks * tick_period / 58.8 µs`. The whole calculation is done in
/// integers, so the divisor of the configured clock flows straight into the
/// result instead of a precomputed ticks-per-centimeter constant.
pub fn compute_distance(interval_ticks: u16, period: TickPeriod) -> u32 {
    // ticks * (divisor / clock_hz) s * 1e6 µs/s * 10 / 588 (µs/cm * 10)
    let numerator = interval_ticks as u64 * period.divisor as u64 * 10_000_000;
    let denominator = period.clock_hz.get() as u64 * ROUND_TRIP_US_PER_CM_X10;
    u32::try_from(numerator / denominator).unwrap_or(u32::MAX)
}

/// A distance in centimeters, or one of the two sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Distance(u16);

impl Distance {
    /// No completed echo was seen within the timeout.
    pub const NO_ECHO: Distance = Distance(u16::MAX);
    /// An echo was seen, but it was too long to be a valid reading.
    pub const OUT_OF_RANGE: Distance = Distance(u16::MAX - 1);

    pub const fn from_centimeters(cm: u16) -> Self {
        Self(cm)
    }

    pub const fn centimeters(self) -> u16 {
        self.0
    }

    /// Whether this is an actual reading and not a sentinel.
    pub fn is_valid(self) -> bool {
        self != Self::NO_ECHO && self != Self::OUT_OF_RANGE
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NO_ECHO => write!(f, "no echo"),
            Self::OUT_OF_RANGE => write!(f, "out of range"),
            Self(cm) => write!(f, "{} cm", cm),
        }
    }
}
