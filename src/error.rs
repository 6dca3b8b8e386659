//! Errors of a measurement.

use crate::config::ConfigError;
use crate::distance::Distance;

/// Why a measurement did not produce a distance.
///
/// `E` is the error type of the trigger pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Driving the trigger pin failed.
    Trigger(E),
    /// No completed echo within the timeout: nothing in range, sensor
    /// disconnected or a wiring fault.
    NoEcho,
    /// The capture counter wrapped while the echo was high.
    Overflow,
    /// The echo was longer than the configured maximum range, in cm.
    OutOfRange(u32),
    /// The sensor configuration was rejected at init.
    Config(ConfigError),
}

impl<E> Error<E> {
    /// The sentinel [`crate::Ultrasonic::read_distance`] reports for this error.
    pub fn sentinel(&self) -> Distance {
        match self {
            Self::Trigger(_) | Self::NoEcho | Self::Config(_) => Distance::NO_ECHO,
            Self::Overflow | Self::OutOfRange(_) => Distance::OUT_OF_RANGE,
        }
    }
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        assert_eq!(Error::<()>::NoEcho.sentinel(), Distance::NO_ECHO);
        assert_eq!(Error::Trigger(()).sentinel(), Distance::NO_ECHO);
        assert_eq!(Error::<()>::Overflow.sentinel(), Distance::OUT_OF_RANGE);
        assert_eq!(Error::<()>::OutOfRange(500).sentinel(), Distance::OUT_OF_RANGE);
    }
}
