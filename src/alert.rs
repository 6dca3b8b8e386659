//! Graduated proximity alerts derived from a distance reading.
//!
//! The outputs themselves (LED bar, buzzer, display) belong to the board; this
//! only decides what they should show.

use crate::distance::Distance;

/// Upper bounds (inclusive, in cm) of each alert band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertThresholds {
    pub stop_cm: u16,
    pub danger_cm: u16,
    pub warning_cm: u16,
    pub caution_cm: u16,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            stop_cm: 5,
            danger_cm: 10,
            warning_cm: 15,
            caution_cm: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertLevel {
    /// Nothing close, or no reading at all.
    Clear,
    Caution,
    Warning,
    Danger,
    /// Obstacle right in front: blink everything and sound the buzzer.
    Stop,
}

impl AlertLevel {
    /// Pick the band `distance` falls into. Sentinels count as [`Clear`](Self::Clear).
    pub fn classify(distance: Distance, thresholds: &AlertThresholds) -> Self {
        if !distance.is_valid() {
            return Self::Clear;
        }
        match distance.centimeters() {
            cm if cm <= thresholds.stop_cm => Self::Stop,
            cm if cm <= thresholds.danger_cm => Self::Danger,
            cm if cm <= thresholds.warning_cm => Self::Warning,
            cm if cm <= thresholds.caution_cm => Self::Caution,
            _ => Self::Clear,
        }
    }

    /// Number of LEDs of the three-LED bar that are lit.
    pub fn leds_lit(self) -> usize {
        match self {
            Self::Clear => 0,
            Self::Caution => 1,
            Self::Warning => 2,
            Self::Danger | Self::Stop => 3,
        }
    }

    /// The LED bar blinks instead of staying lit.
    pub fn blinks(self) -> bool {
        self == Self::Stop
    }

    pub fn buzzer(self) -> bool {
        self == Self::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, AlertLevel::Stop)]
    #[case(5, AlertLevel::Stop)]
    #[case(6, AlertLevel::Danger)]
    #[case(10, AlertLevel::Danger)]
    #[case(11, AlertLevel::Warning)]
    #[case(15, AlertLevel::Warning)]
    #[case(16, AlertLevel::Caution)]
    #[case(20, AlertLevel::Caution)]
    #[case(21, AlertLevel::Clear)]
    #[case(400, AlertLevel::Clear)]
    fn default_bands(#[case] cm: u16, #[case] expected: AlertLevel) {
        let level = AlertLevel::classify(Distance::from_centimeters(cm), &AlertThresholds::default());
        assert_eq!(level, expected);
    }

    #[test]
    fn sentinels_are_clear() {
        let thresholds = AlertThresholds::default();
        assert_eq!(AlertLevel::classify(Distance::NO_ECHO, &thresholds), AlertLevel::Clear);
        assert_eq!(
            AlertLevel::classify(Distance::OUT_OF_RANGE, &thresholds),
            AlertLevel::Clear
        );
    }

    #[test]
    fn outputs_per_level() {
        assert_eq!(AlertLevel::Clear.leds_lit(), 0);
        assert_eq!(AlertLevel::Caution.leds_lit(), 1);
        assert_eq!(AlertLevel::Warning.leds_lit(), 2);
        assert_eq!(AlertLevel::Danger.leds_lit(), 3);
        assert!(AlertLevel::Stop.blinks() && AlertLevel::Stop.buzzer());
        assert!(!AlertLevel::Danger.blinks() && !AlertLevel::Danger.buzzer());
    }

    #[test]
    fn custom_thresholds() {
        let thresholds = AlertThresholds {
            stop_cm: 20,
            danger_cm: 40,
            warning_cm: 60,
            caution_cm: 100,
        };
        assert_eq!(
            AlertLevel::classify(Distance::from_centimeters(50), &thresholds),
            AlertLevel::Warning
        );
    }
}
